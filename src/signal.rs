//! Cooperative cancellation for in-flight requests
//!
//! An [`AbortSignal`] is handed to a request through
//! [`RequestOptions::signal`](crate::client::RequestOptions::signal). When it
//! fires, the request is dropped and surfaces as a network error whose
//! `is_timeout` flag tells a deadline apart from an explicit cancel.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a signal fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    /// The application cancelled the request (navigation, unmount, ...).
    Cancelled,
    /// The request ran past its deadline.
    Timeout,
}

/// Clonable abort handle; all clones observe the same state.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    state: Arc<watch::Sender<Option<AbortReason>>>,
    deadline: Option<Instant>,
}

impl Default for AbortSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            state: Arc::new(state),
            deadline: None,
        }
    }

    /// Signal that fires with [`AbortReason::Timeout`] once `after` has elapsed.
    pub fn timeout(after: Duration) -> Self {
        Self {
            deadline: Some(Instant::now() + after),
            ..Self::new()
        }
    }

    /// Abort with [`AbortReason::Cancelled`].
    pub fn abort(&self) {
        self.abort_with(AbortReason::Cancelled);
    }

    /// Abort with an explicit reason. Only the first reason sticks.
    pub fn abort_with(&self, reason: AbortReason) {
        self.state.send_if_modified(|current| {
            if current.is_none() {
                *current = Some(reason);
                true
            } else {
                false
            }
        });
    }

    /// The reason this signal fired, if it has.
    pub fn reason(&self) -> Option<AbortReason> {
        if let Some(reason) = *self.state.borrow() {
            return Some(reason);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(AbortReason::Timeout),
            _ => None,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.reason().is_some()
    }

    /// Resolve once the signal fires.
    pub async fn aborted(&self) -> AbortReason {
        let mut receiver = self.state.subscribe();
        let explicit = async {
            loop {
                if let Some(reason) = *receiver.borrow_and_update() {
                    return reason;
                }
                if receiver.changed().await.is_err() {
                    // The sender lives as long as `self`; this branch is unreachable in practice.
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                reason = explicit => reason,
                _ = tokio::time::sleep_until(deadline) => AbortReason::Timeout,
            },
            None => explicit.await,
        }
    }
}
