use crate::auth::{NoAuth, TokenProvider};
use crate::config::{ClientConfig, ConfigError};
use crate::error::{ApiError, ApiResult};
use crate::logging::{log_debug, log_info};
use crate::signal::{AbortReason, AbortSignal};

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE, LOCATION, RETRY_AFTER,
};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Header some endpoints use to announce the new slug of a moved resource.
pub const NEW_SLUG_HEADER: &str = "x-new-slug";

/// Per-request inputs besides method and path.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// JSON payload.
    pub body: Option<Value>,
    /// Caller headers; these override the defaults and the bearer token.
    pub headers: HeaderMap,
    /// Cancels the request when it fires.
    pub signal: Option<AbortSignal>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize `body` to JSON and attach it.
    ///
    /// A body that cannot be represented as JSON is reported as a validation
    /// error, since nothing has been sent yet.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> ApiResult<Self> {
        let value = serde_json::to_value(body).map_err(|e| {
            ApiError::validation(vec![format!("Request body could not be serialized: {e}")])
        })?;
        self.body = Some(value);
        Ok(self)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn signal(mut self, signal: AbortSignal) -> Self {
        self.signal = Some(signal);
        self
    }
}

/// Builder for constructing an [`ApiClient`] with custom configuration.
///
/// # Example
///
/// ```no_run
/// use timetable_client::{ApiClientBuilder, StaticToken};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), timetable_client::ConfigError> {
/// let client = ApiClientBuilder::new()
///     .base_url("https://timetable.example.com/api")
///     .timeout(Duration::from_secs(10))
///     .token_provider(StaticToken::new("service-token"))
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClientBuilder {
    config: ClientConfig,
    token_provider: Option<Arc<dyn TokenProvider>>,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiClientBuilder {
    pub fn new() -> Self {
        Self {
            config: ClientConfig::default(),
            token_provider: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn token_provider(mut self, provider: impl TokenProvider + 'static) -> Self {
        self.token_provider = Some(Arc::new(provider));
        self
    }

    /// Share one provider between several clients.
    pub fn shared_token_provider(mut self, provider: Arc<dyn TokenProvider>) -> Self {
        self.token_provider = Some(provider);
        self
    }

    /// Validate the configuration and build the [`ApiClient`].
    pub fn build(self) -> Result<ApiClient, ConfigError> {
        self.config.validate()?;

        let mut http = reqwest::Client::builder()
            .timeout(self.config.timeout)
            // 301 carries the moved-resource signal, so it must reach the classifier.
            .redirect(reqwest::redirect::Policy::none());
        if let Some(user_agent) = &self.config.user_agent {
            http = http.user_agent(user_agent.clone());
        }
        let http = http.build()?;

        log_info!(
            base_url = %self.config.base_url,
            timeout_ms = self.config.timeout.as_millis(),
            authenticated = self.token_provider.is_some(),
            "Timetable API client configured"
        );

        Ok(ApiClient {
            http,
            base_url: self.config.base_url.trim_end_matches('/').to_string(),
            token_provider: self.token_provider.unwrap_or_else(|| Arc::new(NoAuth)),
        })
    }
}

/// Request executor for the timetable API.
///
/// Performs exactly one HTTP exchange per call and turns every failure into
/// an [`ApiError`]. It never retries; see [`crate::retry`] for the guidance a
/// caller's retry loop should use.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token_provider: Arc<dyn TokenProvider>,
}

impl ApiClient {
    /// Create a client without authentication.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        ApiClientBuilder::new().config(config).build()
    }

    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue one request and decode the response body.
    ///
    /// Resolves to `None` for 204 No Content, whose body is never read.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<Option<T>> {
        let RequestOptions {
            body,
            headers,
            signal,
        } = options;
        let url = self.url_for(path);

        if let Some(reason) = signal.as_ref().and_then(AbortSignal::reason) {
            return Err(aborted_error(reason));
        }

        log_debug!(method = %method, url = %url, has_body = body.is_some(), "Sending timetable API request");
        let started = Instant::now();

        let exchange = self.exchange::<T>(method.clone(), &url, body, headers);
        let result = match signal {
            Some(signal) => tokio::select! {
                result = exchange => result,
                reason = signal.aborted() => Err(aborted_error(reason)),
            },
            None => exchange.await,
        };

        log_debug!(
            method = %method,
            url = %url,
            elapsed_ms = started.elapsed().as_millis(),
            success = result.is_ok(),
            "Timetable API request finished"
        );
        result
    }

    /// Like [`request`](Self::request), but always yields a `T`.
    ///
    /// A 204 response decodes `T` from JSON `null`, which suits `()`,
    /// `Option<_>` and `serde_json::Value`.
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> ApiResult<T> {
        match self.request::<T>(method, path, options).await? {
            Some(value) => Ok(value),
            None => serde_json::from_value(Value::Null).map_err(|e| {
                ApiError::api(
                    format!("Expected a response body but received none: {e}"),
                    StatusCode::NO_CONTENT.as_u16(),
                    None,
                )
            }),
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::GET, path, RequestOptions::new()).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn patch<B, T>(&self, path: &str, body: &B) -> ApiResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PATCH, path, RequestOptions::new().json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> ApiResult<T> {
        self.send(Method::DELETE, path, RequestOptions::new()).await
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn exchange<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: Option<Value>,
        headers: HeaderMap,
    ) -> ApiResult<Option<T>> {
        let headers = self.merged_headers(headers).await?;

        let mut request = self.http.request(method, url).headers(headers);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(None);
        }

        if !status.is_success() {
            return Err(error_from_response(response).await);
        }

        let bytes = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice::<T>(&bytes).map(Some).map_err(|e| {
            ApiError::api(
                format!("Failed to parse response body: {e}"),
                status.as_u16(),
                None,
            )
        })
    }

    /// Defaults, then the bearer token, then caller headers; later sources win.
    async fn merged_headers(&self, caller: HeaderMap) -> ApiResult<HeaderMap> {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        merged.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = self.token_provider.token().await {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                ApiError::network(
                    format!("Invalid authorization token: {e}"),
                    Some(Box::new(e)),
                )
            })?;
            value.set_sensitive(true);
            merged.insert(AUTHORIZATION, value);
        }

        for name in caller.keys() {
            merged.remove(name);
        }
        for (name, value) in caller.iter() {
            merged.append(name.clone(), value.clone());
        }

        Ok(merged)
    }
}

fn transport_error(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::timeout(format!("Request timed out: {error}"), Some(Box::new(error)))
    } else {
        ApiError::network(
            format!("Network request failed: {error}"),
            Some(Box::new(error)),
        )
    }
}

fn aborted_error(reason: AbortReason) -> ApiError {
    match reason {
        AbortReason::Timeout => ApiError::timeout("Request aborted: deadline exceeded", None),
        AbortReason::Cancelled => ApiError::network("Request was cancelled", None),
    }
}

/// Build the error for a non-2xx response.
///
/// An unreadable or non-JSON body is not an error of its own: the message
/// falls back to the status and `details` stays empty.
async fn error_from_response(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let headers = response.headers().clone();
    let text = response.text().await.unwrap_or_default();
    let details: Option<Value> = serde_json::from_str(&text).ok();

    let message = details
        .as_ref()
        .and_then(|body| string_field(body, "message").or_else(|| string_field(body, "error")))
        .unwrap_or_else(|| format!("Request failed with status {status}"));

    if status == StatusCode::MOVED_PERMANENTLY.as_u16() {
        if let Some(redirect) = redirect_signal(details.as_ref(), &headers) {
            return redirect;
        }
    }

    let retry_after = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok());
    ApiError::from_status(status, message, details, retry_after)
}

/// A 301 only counts as a redirect signal when it names the new slug.
fn redirect_signal(details: Option<&Value>, headers: &HeaderMap) -> Option<ApiError> {
    let new_slug = details
        .and_then(|body| string_field(body, "newSlug"))
        .or_else(|| header_string(headers, NEW_SLUG_HEADER))?;

    let redirect_url = details
        .and_then(|body| string_field(body, "redirectUrl"))
        .or_else(|| header_string(headers, LOCATION.as_str()))
        .unwrap_or_default();

    Some(ApiError::redirect(new_slug, redirect_url))
}

fn string_field(body: &Value, field: &str) -> Option<String> {
    body.get(field)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
