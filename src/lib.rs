//! # timetable-client
//!
//! Typed HTTP client and error pipeline for the school timetabling
//! administration API.
//!
//! ## Key Features
//!
//! - **Request executor**: one JSON request per call, default headers,
//!   injected bearer token, cooperative cancellation
//! - **Closed error taxonomy**: every failure is one [`ApiError`] variant
//! - **Retry guidance**: retryability verdicts and `Retry-After` parsing,
//!   with the retry loop left to the caller
//! - **Validation gate**: schemas run before any mutation is sent
//! - **User messages**: titles and sentences for notification layers
//!
//! ## Example
//!
//! ```rust,no_run
//! use timetable_client::{ApiClient, ClientConfig, RetryPolicy};
//! use serde_json::Value;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = ApiClient::new(ClientConfig::new("https://timetable.example.com/api"))?;
//! let policy = RetryPolicy::default();
//!
//! let mut attempt = 0;
//! let rooms: Value = loop {
//!     attempt += 1;
//!     match client.get::<Value>("/rooms").await {
//!         Ok(rooms) => break rooms,
//!         Err(err) if policy.should_retry(attempt, &err) => {
//!             tokio::time::sleep(policy.delay_for(attempt, &err)).await;
//!         }
//!         Err(err) => {
//!             eprintln!("{}: {}", err.title(), err.user_message());
//!             return Err(err.into());
//!         }
//!     }
//! };
//! # let _ = rooms;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod messages;
pub mod retry;
pub mod signal;
pub mod validation;

#[cfg(test)]
pub mod tests;

pub use auth::{NoAuth, StaticToken, TokenProvider};
pub use client::{ApiClient, ApiClientBuilder, RequestOptions};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ApiResult, ErrorCategory, ErrorKind, ErrorSeverity};
pub use messages::{message_for, message_for_value, title_for, title_for_value, Notification};
pub use retry::{is_retryable, parse_retry_delay, RetryPolicy};
pub use signal::{AbortReason, AbortSignal};
pub use validation::{validate, with_validation, Issue, Schema, Validated};
