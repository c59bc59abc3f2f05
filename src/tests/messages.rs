// Unit Tests for User-Facing Error Messages
//
// UNIT UNDER TEST: ApiError::user_message / ApiError::title and the free mappers
//
// BUSINESS RESPONSIBILITY:
//   - Produces the text shown in notifications for every failure
//   - Never returns an empty string and never panics, whatever it is given
//   - Keeps rate-limit delays out of the sentence and exposes them separately
//
// TEST COVERAGE:
//   - Documented message/title pairs for each kind
//   - Client error branches for 404/401/403/400/422 and the generic case
//   - Foreign errors and non-error values

use crate::error::ApiError;
use crate::messages::{
    message_for, message_for_value, title_for, title_for_value, Notification, CONNECTION_MESSAGE,
    FALLBACK_MESSAGE, RATE_LIMIT_MESSAGE, TIMEOUT_MESSAGE,
};
use std::any::Any;

#[cfg(test)]
mod api_error_message_tests {
    use super::*;

    #[test]
    fn test_server_error_message_and_title() {
        let error = ApiError::server("Database down", 500, None);

        assert_eq!(error.user_message(), "Server error (500): Database down");
        assert_eq!(error.title(), "Server Error");
        assert!(error.is_retryable());
    }

    #[test]
    fn test_not_found_message_and_title() {
        let error = ApiError::client("Not found", 404, None);

        assert_eq!(error.user_message(), "Not found (404): Not found");
        assert_eq!(error.title(), "Not Found");
        assert!(!error.is_retryable());
    }

    #[test]
    fn test_rate_limit_message_does_not_include_delay() {
        let error = ApiError::rate_limited("Too many", Some(5000), None);

        assert_eq!(error.title(), "Rate Limited");
        assert_eq!(error.user_message(), RATE_LIMIT_MESSAGE);
        assert!(error.is_retryable());
    }

    #[test]
    fn test_client_error_branches() {
        let cases = [
            (401, "Unauthorized (401): Token expired", "Unauthorized"),
            (403, "Forbidden (403): Token expired", "Forbidden"),
            (400, "Validation failed (400): Token expired", "Validation Error"),
            (422, "Validation failed (422): Token expired", "Validation Error"),
            (409, "Error (409): Token expired", "Request Failed"),
        ];

        for (status, message, title) in cases {
            let error = ApiError::client("Token expired", status, None);
            assert_eq!(error.user_message(), message, "status {status}");
            assert_eq!(error.title(), title, "status {status}");
        }
    }

    #[test]
    fn test_network_messages_distinguish_timeouts() {
        let timeout = ApiError::timeout("deadline", None);
        let refused = ApiError::network("refused", None);

        assert_eq!(timeout.user_message(), TIMEOUT_MESSAGE);
        assert_eq!(timeout.title(), "Request Timeout");
        assert_eq!(refused.user_message(), CONNECTION_MESSAGE);
        assert_eq!(refused.title(), "Connection Error");
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let error = ApiError::validation(vec![
            "name: Required".into(),
            "capacity: Must be positive".into(),
        ]);

        assert_eq!(
            error.user_message(),
            "name: Required. capacity: Must be positive"
        );
        assert_eq!(error.title(), "Validation Error");
    }

    #[test]
    fn test_generic_api_error_message() {
        let error = ApiError::api("Moved", 302, None);

        assert_eq!(error.user_message(), "Error (302): Moved");
        assert_eq!(error.title(), "Request Failed");
    }

    #[test]
    fn test_redirect_uses_its_own_message() {
        let error = ApiError::redirect("year-8", "/classes/year-8");

        assert_eq!(error.user_message(), "Resource moved to year-8");
        assert_eq!(error.title(), "Error");
    }

    #[test]
    fn test_messages_never_empty_even_for_hand_built_variants() {
        let empty_validation = ApiError::Validation { errors: Vec::new() };

        assert_eq!(empty_validation.user_message(), FALLBACK_MESSAGE);
    }
}

#[cfg(test)]
mod free_function_tests {
    use super::*;

    #[derive(Debug)]
    struct Silent;

    impl std::fmt::Display for Silent {
        fn fmt(&self, _: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            Ok(())
        }
    }

    impl std::error::Error for Silent {}

    #[test]
    fn test_api_errors_dispatch_through_dyn_error() {
        let error = ApiError::server("Database down", 503, None);

        assert_eq!(message_for(&error), "Server error (503): Database down");
        assert_eq!(title_for(&error), "Server Error");
    }

    #[test]
    fn test_foreign_errors_use_their_display_text() {
        let error = std::io::Error::new(std::io::ErrorKind::Other, "disk full");

        assert_eq!(message_for(&error), "disk full");
        assert_eq!(title_for(&error), "Error");
    }

    #[test]
    fn test_foreign_error_with_empty_text_falls_back() {
        assert_eq!(message_for(&Silent), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_non_error_values_map_to_fallback() {
        let payload: Box<dyn Any + Send> = Box::new(42_u32);

        assert_eq!(message_for_value(payload.as_ref()), FALLBACK_MESSAGE);
        assert_eq!(title_for_value(payload.as_ref()), "Error");
    }

    #[test]
    fn test_values_holding_errors_are_recognized() {
        let api: Box<dyn Any + Send> = Box::new(ApiError::client("gone", 404, None));
        let boxed: Box<dyn Any + Send> = Box::new(Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "pipe closed",
        )) as Box<dyn std::error::Error + Send + Sync>);

        assert_eq!(title_for_value(api.as_ref()), "Not Found");
        assert_eq!(message_for_value(boxed.as_ref()), "pipe closed");
    }

    #[test]
    fn test_notification_carries_rate_limit_countdown() {
        let error = ApiError::rate_limited("Too many", Some(5000), None);

        let notification = Notification::from_error(&error);

        assert_eq!(notification.title, "Rate Limited");
        assert_eq!(notification.message, RATE_LIMIT_MESSAGE);
        assert_eq!(notification.retry_after_ms, Some(5000));
    }
}
