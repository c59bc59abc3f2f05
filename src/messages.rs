//! User-facing titles and messages for errors
//!
//! Notification layers should build their text from here instead of
//! formatting error strings themselves. Every function is total: any error,
//! or any value at all, produces a non-empty title and message.

use crate::error::ApiError;
use std::any::Any;

pub const FALLBACK_MESSAGE: &str = "An unexpected error occurred. Please try again.";
pub const TIMEOUT_MESSAGE: &str =
    "The request timed out. Please check your connection and try again.";
pub const CONNECTION_MESSAGE: &str =
    "Unable to connect to the server. Please check your internet connection.";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please wait a moment and try again.";

const GENERIC_TITLE: &str = "Error";

impl ApiError {
    /// Message suitable for display to an end user.
    ///
    /// ```rust
    /// use timetable_client::ApiError;
    ///
    /// let err = ApiError::server("Database down", 500, None);
    /// assert_eq!(err.user_message(), "Server error (500): Database down");
    /// ```
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Validation { errors } => non_empty(errors.join(". ")),
            ApiError::Network { is_timeout: true, .. } => TIMEOUT_MESSAGE.to_string(),
            ApiError::Network { .. } => CONNECTION_MESSAGE.to_string(),
            ApiError::RateLimit { .. } => RATE_LIMIT_MESSAGE.to_string(),
            ApiError::Server {
                status, message, ..
            } => format!("Server error ({status}): {message}"),
            ApiError::Client {
                status, message, ..
            } => {
                if self.is_not_found() {
                    format!("Not found ({status}): {message}")
                } else if self.is_unauthorized() {
                    format!("Unauthorized ({status}): {message}")
                } else if self.is_forbidden() {
                    format!("Forbidden ({status}): {message}")
                } else if self.is_validation_error() {
                    format!("Validation failed ({status}): {message}")
                } else {
                    format!("Error ({status}): {message}")
                }
            }
            ApiError::Api {
                status, message, ..
            } => format!("Error ({status}): {message}"),
            ApiError::Redirect { message, .. } => non_empty(message.clone()),
        }
    }

    /// Short label for a notification heading.
    pub fn title(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "Validation Error",
            ApiError::Network { is_timeout: true, .. } => "Request Timeout",
            ApiError::Network { .. } => "Connection Error",
            ApiError::RateLimit { .. } => "Rate Limited",
            ApiError::Server { .. } => "Server Error",
            ApiError::Client { .. } => {
                if self.is_not_found() {
                    "Not Found"
                } else if self.is_unauthorized() {
                    "Unauthorized"
                } else if self.is_forbidden() {
                    "Forbidden"
                } else if self.is_validation_error() {
                    "Validation Error"
                } else {
                    "Request Failed"
                }
            }
            ApiError::Api { .. } => "Request Failed",
            ApiError::Redirect { .. } => GENERIC_TITLE,
        }
    }
}

fn non_empty(message: String) -> String {
    if message.trim().is_empty() {
        FALLBACK_MESSAGE.to_string()
    } else {
        message
    }
}

/// User-facing message for any error.
pub fn message_for(error: &(dyn std::error::Error + 'static)) -> String {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) => api_error.user_message(),
        None => non_empty(error.to_string()),
    }
}

/// Notification title for any error.
pub fn title_for(error: &(dyn std::error::Error + 'static)) -> &'static str {
    match error.downcast_ref::<ApiError>() {
        Some(api_error) => api_error.title(),
        None => GENERIC_TITLE,
    }
}

/// User-facing message for an arbitrary value, such as a task panic payload.
///
/// Recognizes an [`ApiError`] and boxed errors; everything else maps to
/// [`FALLBACK_MESSAGE`].
pub fn message_for_value(value: &(dyn Any + Send)) -> String {
    if let Some(api_error) = value.downcast_ref::<ApiError>() {
        return api_error.user_message();
    }
    if let Some(error) = value.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        return message_for(&**error);
    }
    FALLBACK_MESSAGE.to_string()
}

/// Notification title for an arbitrary value.
pub fn title_for_value(value: &(dyn Any + Send)) -> &'static str {
    if let Some(api_error) = value.downcast_ref::<ApiError>() {
        return api_error.title();
    }
    if let Some(error) = value.downcast_ref::<Box<dyn std::error::Error + Send + Sync>>() {
        return title_for(&**error);
    }
    GENERIC_TITLE
}

/// Title and message bundled for a toast or notification collaborator.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    /// Countdown hint for rate-limited requests.
    pub retry_after_ms: Option<u64>,
}

impl Notification {
    pub fn from_error(error: &(dyn std::error::Error + 'static)) -> Self {
        Self {
            title: title_for(error).to_string(),
            message: message_for(error),
            retry_after_ms: error
                .downcast_ref::<ApiError>()
                .and_then(ApiError::retry_after_ms),
        }
    }
}
