//! Error taxonomy for timetable API operations.
//!
//! Every failure that leaves this crate is an [`ApiError`]. The enum is closed:
//! each HTTP outcome, transport failure, redirect signal and local validation
//! failure maps to exactly one variant, and every variant carries only the
//! fields that make sense for it.
//!
//! # Error Handling Example
//!
//! ```rust,no_run
//! use timetable_client::{ApiError, ApiResult};
//!
//! fn handle_error(err: &ApiError) {
//!     if err.is_retryable() {
//!         println!("Transient failure, the caller may retry: {err}");
//!     }
//!
//!     if err.is_not_found() {
//!         println!("Resource is gone");
//!     }
//!
//!     println!("{}: {}", err.title(), err.user_message());
//! }
//! ```
//!
//! # Result Type
//!
//! Use [`ApiResult<T>`] as a convenient alias for `Result<T, ApiError>`:
//!
//! ```rust
//! use timetable_client::ApiResult;
//!
//! fn my_function() -> ApiResult<String> {
//!     Ok("Success".to_string())
//! }
//! ```

use crate::logging::{log_error, log_info, log_warn};
use crate::retry::parse_retry_delay;
use serde_json::Value;
use thiserror::Error;

/// Message used when a schema rejects input without reporting any issue.
pub(crate) const INVALID_INPUT_MESSAGE: &str = "Invalid input";

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization of errors for routing and handling decisions.
///
/// Use [`ApiError::category()`] to get the category for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Expected control flow rather than a failure (a moved resource).
    BusinessLogic,

    /// The server or something between us and the server failed.
    External,

    /// The request itself is wrong: bad input, missing auth, unknown resource.
    ///
    /// Re-sending the same request will not help.
    Client,

    /// Temporary failures that may succeed on retry.
    ///
    /// Rate limits and transport failures.
    Transient,
}

/// Severity level for logging and alerting decisions.
///
/// Use [`ApiError::severity()`] to get the severity for any error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Action failed and someone should look at it.
    Error,

    /// Unexpected but recoverable situation.
    Warning,

    /// Expected failure (e.g., not found, validation error).
    Info,
}

/// Fieldless tag naming the variant of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Api,
    Network,
    Server,
    Client,
    RateLimit,
    Redirect,
    Validation,
}

// ============================================================================
// API error type
// ============================================================================

/// Convenient result type for timetable API operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors produced by the request pipeline and the validation gate.
///
/// | Variant | Category | Retryable |
/// |---------|----------|-----------|
/// | `Api` | External | only when `status >= 500` |
/// | `Network` | Transient | Yes |
/// | `Server` | External | Yes |
/// | `Client` | Client | No |
/// | `RateLimit` | Transient | Yes |
/// | `Redirect` | BusinessLogic | No |
/// | `Validation` | Client | No |
///
/// Prefer the constructor methods over building variants by hand; they log
/// the error once, at the point where it is created.
#[derive(Error, Debug)]
pub enum ApiError {
    /// A non-2xx response that is not a client, server or rate-limit error.
    #[error("{message}")]
    Api {
        message: String,
        /// Exact status code returned by the server.
        status: u16,
        /// Parsed JSON error body, when the body was JSON.
        details: Option<Value>,
    },

    /// The request never produced an HTTP response.
    ///
    /// Connection failures, DNS errors, aborts and timeouts all land here.
    #[error("{message}")]
    Network {
        message: String,
        /// Whether the failure was a timeout rather than a connection problem.
        is_timeout: bool,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The server returned a 5xx status.
    #[error("{message}")]
    Server {
        message: String,
        status: u16,
        details: Option<Value>,
    },

    /// The server rejected the request with a 4xx status other than 429.
    #[error("{message}")]
    Client {
        message: String,
        status: u16,
        details: Option<Value>,
    },

    /// The server returned 429 Too Many Requests.
    #[error("{message}")]
    RateLimit {
        message: String,
        details: Option<Value>,
        /// Server-suggested wait before retrying, in milliseconds.
        retry_after_ms: Option<u64>,
    },

    /// The requested resource moved to a new identifier.
    ///
    /// This is a control-flow signal, not a failure: the caller should
    /// navigate to the new location instead of retrying.
    #[error("{message}")]
    Redirect {
        message: String,
        new_slug: String,
        redirect_url: String,
    },

    /// Local input failed schema validation before any request was sent.
    #[error("{}", errors.join(". "))]
    Validation {
        /// Issue messages in the order the schema reported them. Never empty.
        errors: Vec<String>,
    },
}

impl ApiError {
    /// Classify a non-success HTTP status into the matching variant.
    ///
    /// `retry_after` is the raw `Retry-After` header value and is only
    /// consulted for 429 responses.
    pub fn from_status(
        status: u16,
        message: impl Into<String>,
        details: Option<Value>,
        retry_after: Option<&str>,
    ) -> Self {
        match status {
            429 => Self::rate_limited(message, parse_retry_delay(retry_after), details),
            500..=599 => Self::server(message, status, details),
            400..=499 => Self::client(message, status, details),
            _ => Self::api(message, status, details),
        }
    }

    /// Tag naming this error's variant.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Api,
            Self::Network { .. } => ErrorKind::Network,
            Self::Server { .. } => ErrorKind::Server,
            Self::Client { .. } => ErrorKind::Client,
            Self::RateLimit { .. } => ErrorKind::RateLimit,
            Self::Redirect { .. } => ErrorKind::Redirect,
            Self::Validation { .. } => ErrorKind::Validation,
        }
    }

    /// HTTP status of an HTTP-originated error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Server { status, .. } | Self::Client { status, .. } => {
                Some(*status)
            }
            Self::RateLimit { .. } => Some(429),
            Self::Network { .. } | Self::Redirect { .. } | Self::Validation { .. } => None,
        }
    }

    /// Parsed response body attached to an HTTP-originated error.
    pub fn details(&self) -> Option<&Value> {
        match self {
            Self::Api { details, .. }
            | Self::Server { details, .. }
            | Self::Client { details, .. }
            | Self::RateLimit { details, .. } => details.as_ref(),
            Self::Network { .. } | Self::Redirect { .. } | Self::Validation { .. } => None,
        }
    }

    /// Raw message carried by the error, before any user-facing formatting.
    pub fn message(&self) -> String {
        match self {
            Self::Api { message, .. }
            | Self::Network { message, .. }
            | Self::Server { message, .. }
            | Self::Client { message, .. }
            | Self::RateLimit { message, .. }
            | Self::Redirect { message, .. } => message.clone(),
            Self::Validation { errors } => errors.join(". "),
        }
    }

    fn client_status(&self) -> Option<u16> {
        match self {
            Self::Client { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// 404 from the server.
    pub fn is_not_found(&self) -> bool {
        self.client_status() == Some(404)
    }

    /// 401 from the server.
    pub fn is_unauthorized(&self) -> bool {
        self.client_status() == Some(401)
    }

    /// 403 from the server.
    pub fn is_forbidden(&self) -> bool {
        self.client_status() == Some(403)
    }

    /// 400 or 422 from the server: the backend rejected the payload.
    pub fn is_validation_error(&self) -> bool {
        matches!(self.client_status(), Some(400 | 422))
    }

    /// Network failure caused by a timeout or a timeout-driven abort.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network { is_timeout: true, .. })
    }

    /// Rate-limit delay in milliseconds, for callers that show a countdown.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::RateLimit { retry_after_ms, .. } => *retry_after_ms,
            _ => None,
        }
    }

    /// Get the error category for routing and handling decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Api { .. } => ErrorCategory::External,
            Self::Network { .. } => ErrorCategory::Transient,
            Self::Server { .. } => ErrorCategory::External,
            Self::Client { .. } => ErrorCategory::Client,
            Self::RateLimit { .. } => ErrorCategory::Transient,
            Self::Redirect { .. } => ErrorCategory::BusinessLogic,
            Self::Validation { .. } => ErrorCategory::Client,
        }
    }

    /// Get the error severity for logging and alerting.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Api { .. } => ErrorSeverity::Error,
            Self::Network { .. } => ErrorSeverity::Warning,
            Self::Server { .. } => ErrorSeverity::Error,
            Self::Client { status: 404, .. } => ErrorSeverity::Info,
            Self::Client { .. } => ErrorSeverity::Warning,
            Self::RateLimit { .. } => ErrorSeverity::Warning,
            Self::Redirect { .. } => ErrorSeverity::Info,
            Self::Validation { .. } => ErrorSeverity::Info,
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    /// Create an unclassified HTTP error.
    pub fn api(message: impl Into<String>, status: u16, details: Option<Value>) -> Self {
        Self::Api {
            message: message.into(),
            status,
            details,
        }
        .logged()
    }

    /// Create a 5xx error.
    ///
    /// Any other status is classified through [`ApiError::from_status`].
    pub fn server(message: impl Into<String>, status: u16, details: Option<Value>) -> Self {
        if !(500..=599).contains(&status) {
            return Self::from_status(status, message, details, None);
        }
        Self::Server {
            message: message.into(),
            status,
            details,
        }
        .logged()
    }

    /// Create a 4xx error other than 429.
    ///
    /// Any other status is classified through [`ApiError::from_status`].
    pub fn client(message: impl Into<String>, status: u16, details: Option<Value>) -> Self {
        if !(400..=499).contains(&status) || status == 429 {
            return Self::from_status(status, message, details, None);
        }
        Self::Client {
            message: message.into(),
            status,
            details,
        }
        .logged()
    }

    pub fn rate_limited(
        message: impl Into<String>,
        retry_after_ms: Option<u64>,
        details: Option<Value>,
    ) -> Self {
        Self::RateLimit {
            message: message.into(),
            details,
            retry_after_ms,
        }
        .logged()
    }

    /// Create a connection-level failure.
    pub fn network(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            is_timeout: false,
            source,
        }
        .logged()
    }

    pub fn timeout(
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            message: message.into(),
            is_timeout: true,
            source,
        }
        .logged()
    }

    pub fn redirect(new_slug: impl Into<String>, redirect_url: impl Into<String>) -> Self {
        let new_slug = new_slug.into();
        Self::Redirect {
            message: format!("Resource moved to {new_slug}"),
            new_slug,
            redirect_url: redirect_url.into(),
        }
        .logged()
    }

    /// Create a local validation failure.
    ///
    /// An empty issue list is replaced by a single generic message so that
    /// `errors` is never empty.
    pub fn validation(errors: Vec<String>) -> Self {
        let errors = if errors.is_empty() {
            vec![INVALID_INPUT_MESSAGE.to_string()]
        } else {
            errors
        };
        Self::Validation { errors }.logged()
    }

    /// Log the new error once, at the level its severity calls for.
    fn logged(self) -> Self {
        let kind = self.kind();
        let status = self.status();
        let retry_after_ms = self.retry_after_ms();
        let message = self.message();
        match self.severity() {
            ErrorSeverity::Error => log_error!(
                error_kind = ?kind,
                status = ?status,
                message = %message,
                "Timetable API request failed"
            ),
            ErrorSeverity::Warning => log_warn!(
                error_kind = ?kind,
                status = ?status,
                retry_after_ms = ?retry_after_ms,
                timeout = self.is_timeout(),
                message = %message,
                "Timetable API request failed"
            ),
            ErrorSeverity::Info => log_info!(
                error_kind = ?kind,
                status = ?status,
                message = %message,
                "Timetable API request did not complete"
            ),
        }
        self
    }
}
