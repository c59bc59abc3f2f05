// Unit Tests for the Validation Gate
//
// UNIT UNDER TEST: validate / with_validation / Rules / TypedSchema
//
// BUSINESS RESPONSIBILITY:
//   - Stops invalid form data before any network mutation is attempted
//   - Reports every schema issue, in schema order, rather than the first one
//   - Never panics on bad input
//
// TEST COVERAGE:
//   - Issue count and order for failing input
//   - Wrapped operation is never invoked on invalid input
//   - Deserialization failures and rule failures
//   - Closure schemas and empty issue lists

use crate::error::{ApiError, ApiResult};
use crate::validation::{validate, with_validation, Issue, Rules, Schema, TypedSchema, Validated};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Lesson {
    subject: String,
    periods: u32,
    room: Option<String>,
}

fn lesson_schema() -> TypedSchema<Lesson> {
    TypedSchema::with_rules(
        Rules::new()
            .rule("subject", "Subject is required", |l: &Lesson| {
                !l.subject.trim().is_empty()
            })
            .rule("periods", "Periods must be between 1 and 10", |l: &Lesson| {
                (1..=10).contains(&l.periods)
            })
            .rule("room", "Room cannot be blank", |l: &Lesson| {
                l.room.as_deref().map_or(true, |r| !r.trim().is_empty())
            }),
    )
}

#[cfg(test)]
mod validate_tests {
    use super::*;

    #[test]
    fn test_valid_input_returns_typed_data() {
        // Arrange
        let input = json!({ "subject": "Maths", "periods": 4, "room": "B12" });

        // Act
        let result = validate(&lesson_schema(), &input);

        // Assert
        assert_eq!(
            result,
            Validated::Valid(Lesson {
                subject: "Maths".to_string(),
                periods: 4,
                room: Some("B12".to_string()),
            })
        );
    }

    #[test]
    fn test_all_rule_failures_are_collected_in_order() {
        // Arrange
        let input = json!({ "subject": " ", "periods": 0, "room": "" });

        // Act
        let result = validate(&lesson_schema(), &input);

        // Assert
        assert_eq!(
            result,
            Validated::Invalid(vec![
                "subject: Subject is required".to_string(),
                "periods: Periods must be between 1 and 10".to_string(),
                "room: Room cannot be blank".to_string(),
            ])
        );
    }

    #[test]
    fn test_deserialization_failure_is_a_single_issue() {
        let input = json!({ "subject": "Art" });

        match validate(&lesson_schema(), &input) {
            Validated::Invalid(errors) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].contains("periods"), "got: {}", errors[0]);
            }
            other => panic!("Expected Invalid, got: {other:?}"),
        }
    }

    #[test]
    fn test_closure_schema_issue_count_matches() {
        let schema = |_value: &Value| -> Result<Value, Vec<Issue>> {
            Err(vec![
                Issue::new("Form is incomplete"),
                Issue::at("teacher.email", "Invalid email"),
            ])
        };

        let result = validate(&schema, &json!({}));

        assert_eq!(
            result,
            Validated::Invalid(vec![
                "Form is incomplete".to_string(),
                "teacher.email: Invalid email".to_string(),
            ])
        );
        assert!(!result.is_valid());
    }

    #[test]
    fn test_schema_reporting_no_issues_still_yields_a_message() {
        let schema = |_: &str| -> Result<(), Vec<Issue>> { Err(Vec::new()) };

        assert_eq!(
            validate(&schema, "anything"),
            Validated::Invalid(vec!["Invalid input".to_string()])
        );
    }

    #[test]
    fn test_rules_work_as_a_schema_on_typed_values() {
        let rules = Rules::new().rule("", "Must be even", |n: &u32| n % 2 == 0);

        assert_eq!(rules.safe_parse(&4), Ok(4));
        assert_eq!(rules.safe_parse(&3), Err(vec![Issue::new("Must be even")]));
    }
}

#[cfg(test)]
mod with_validation_tests {
    use super::*;

    #[tokio::test]
    async fn test_operation_runs_with_validated_data() {
        let input = json!({ "subject": "History", "periods": 2 });

        let result: ApiResult<String> = with_validation(&lesson_schema(), &input, |lesson| async move {
            Ok(format!("{} x{}", lesson.subject, lesson.periods))
        })
        .await;

        assert_eq!(result.unwrap(), "History x2");
    }

    #[tokio::test]
    async fn test_operation_never_sees_invalid_input() {
        // Arrange
        let calls = AtomicU32::new(0);
        let input = json!({ "subject": "", "periods": 99 });

        // Act
        let result: ApiResult<()> = with_validation(&lesson_schema(), &input, |_lesson| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(()) }
        })
        .await;

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 0, "operation must not run");
        match result {
            Err(ApiError::Validation { errors }) => assert_eq!(errors.len(), 2),
            other => panic!("Expected Validation error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_operation_errors_pass_through() {
        let input = json!({ "subject": "PE", "periods": 1 });

        let result: ApiResult<()> = with_validation(&lesson_schema(), &input, |_| async {
            Err(ApiError::server("Solver crashed", 500, None))
        })
        .await;

        assert!(matches!(result, Err(ApiError::Server { status: 500, .. })));
    }
}
