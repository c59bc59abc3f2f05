//! Validation gate between user input and network mutations
//!
//! A [`Schema`] checks input and reports every problem it finds, in order.
//! [`validate`] turns that report into a [`Validated`] value and never fails;
//! [`with_validation`] refuses to run an operation on invalid input and
//! returns [`ApiError::Validation`] instead.
//!
//! ```rust
//! use serde::Deserialize;
//! use timetable_client::validation::{validate, Rules, TypedSchema, Validated};
//!
//! #[derive(Debug, Clone, Deserialize)]
//! struct Room {
//!     name: String,
//!     capacity: u32,
//! }
//!
//! let schema = TypedSchema::<Room>::with_rules(
//!     Rules::new()
//!         .rule("name", "Name is required", |room: &Room| !room.name.is_empty())
//!         .rule("capacity", "Capacity must be positive", |room: &Room| room.capacity > 0),
//! );
//!
//! let input = serde_json::json!({ "name": "", "capacity": 0 });
//! match validate(&schema, &input) {
//!     Validated::Valid(room) => println!("ok: {room:?}"),
//!     Validated::Invalid(errors) => assert_eq!(errors.len(), 2),
//! }
//! ```

use crate::error::{ApiError, ApiResult, INVALID_INPUT_MESSAGE};
use crate::logging::log_debug;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

/// One problem reported by a schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Location of the offending field, outermost first. Empty for the input as a whole.
    pub path: Vec<String>,
    pub message: String,
}

impl Issue {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Issue attached to a dotted field path such as `"teacher.email"`.
    pub fn at(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: split_path(path),
            message: message.into(),
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path.join("."), self.message)
        }
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// A declarative check over input of type `I`.
///
/// Implementations must report all issues they find rather than stopping at
/// the first one, in a stable order.
pub trait Schema<I: ?Sized> {
    type Output;

    fn safe_parse(&self, input: &I) -> Result<Self::Output, Vec<Issue>>;
}

impl<I, O, F> Schema<I> for F
where
    I: ?Sized,
    F: Fn(&I) -> Result<O, Vec<Issue>>,
{
    type Output = O;

    fn safe_parse(&self, input: &I) -> Result<O, Vec<Issue>> {
        self(input)
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid(T),
    /// Rendered issue messages in schema order. Never empty.
    Invalid(Vec<String>),
}

impl<T> Validated<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validated::Valid(_))
    }

    pub fn into_result(self) -> ApiResult<T> {
        match self {
            Validated::Valid(data) => Ok(data),
            Validated::Invalid(errors) => Err(ApiError::validation(errors)),
        }
    }
}

/// Run `schema` against `input`, collecting every issue.
pub fn validate<I, S>(schema: &S, input: &I) -> Validated<S::Output>
where
    I: ?Sized,
    S: Schema<I>,
{
    match schema.safe_parse(input) {
        Ok(data) => Validated::Valid(data),
        Err(issues) => {
            let mut errors: Vec<String> = issues.iter().map(Issue::to_string).collect();
            if errors.is_empty() {
                errors.push(INVALID_INPUT_MESSAGE.to_string());
            }
            log_debug!(issue_count = errors.len(), "Schema rejected input");
            Validated::Invalid(errors)
        }
    }
}

/// Validate `input`, then hand the validated data to `operation`.
///
/// `operation` is never invoked when validation fails.
pub async fn with_validation<I, S, F, Fut, T>(schema: &S, input: &I, operation: F) -> ApiResult<T>
where
    I: ?Sized,
    S: Schema<I>,
    F: FnOnce(S::Output) -> Fut,
    Fut: Future<Output = ApiResult<T>>,
{
    let data = validate(schema, input).into_result()?;
    operation(data).await
}

type Check<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

struct Rule<T> {
    path: String,
    message: String,
    check: Check<T>,
}

/// Ordered field checks over an already-typed value.
///
/// Every rule runs; a failing rule does not stop the ones after it.
pub struct Rules<T> {
    rules: Vec<Rule<T>>,
}

impl<T> Default for Rules<T> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<T> fmt::Debug for Rules<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.rules.iter().map(|rule| (&rule.path, &rule.message)))
            .finish()
    }
}

impl<T> Rules<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check; `message` is reported at `path` when `check` returns false.
    pub fn rule(
        mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        check: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            path: path.into(),
            message: message.into(),
            check: Box::new(check),
        });
        self
    }

    pub fn issues(&self, value: &T) -> Vec<Issue> {
        self.rules
            .iter()
            .filter(|rule| !(rule.check)(value))
            .map(|rule| Issue::at(&rule.path, rule.message.clone()))
            .collect()
    }
}

impl<T: Clone> Schema<T> for Rules<T> {
    type Output = T;

    fn safe_parse(&self, input: &T) -> Result<T, Vec<Issue>> {
        let issues = self.issues(input);
        if issues.is_empty() {
            Ok(input.clone())
        } else {
            Err(issues)
        }
    }
}

/// Schema for raw JSON: deserialize into `T`, then apply [`Rules`].
///
/// A value that does not deserialize yields a single issue; rules only run
/// on values that do.
pub struct TypedSchema<T> {
    rules: Rules<T>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> TypedSchema<T> {
    pub fn new() -> Self {
        Self::with_rules(Rules::new())
    }

    pub fn with_rules(rules: Rules<T>) -> Self {
        Self {
            rules,
            _marker: PhantomData,
        }
    }
}

impl<T: DeserializeOwned> Default for TypedSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> Schema<Value> for TypedSchema<T> {
    type Output = T;

    fn safe_parse(&self, input: &Value) -> Result<T, Vec<Issue>> {
        let data = T::deserialize(input).map_err(|e| vec![Issue::new(e.to_string())])?;
        let issues = self.rules.issues(&data);
        if issues.is_empty() {
            Ok(data)
        } else {
            Err(issues)
        }
    }
}
