//! Bearer-token injection
//!
//! The client never owns credentials. It asks a [`TokenProvider`] for a token
//! on every request and sends it as `Authorization: Bearer <token>`.

use async_trait::async_trait;

/// Supplies the bearer token for outgoing requests.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current access token, or `None` to send the request unauthenticated.
    async fn token(&self) -> Option<String>;
}

/// Sends every request without an `Authorization` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuth;

#[async_trait]
impl TokenProvider for NoAuth {
    async fn token(&self) -> Option<String> {
        None
    }
}

/// A fixed token, for service accounts and tests.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(<redacted>)")
    }
}

#[async_trait]
impl TokenProvider for StaticToken {
    async fn token(&self) -> Option<String> {
        Some(self.0.clone())
    }
}
