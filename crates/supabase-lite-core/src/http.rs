use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use tracing::debug;

use crate::error::{SupabaseError, SupabaseResult};
use crate::retry::{with_retry, RetryPolicy};
use crate::value::JsonValue;

/// A fully described outgoing request. Replayed verbatim on every attempt.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Set a header, replacing any previous value.
    pub fn header(mut self, name: &str, value: &str) -> SupabaseResult<Self> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| SupabaseError::config(format!("Invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value).map_err(|e| {
            SupabaseError::config(format!("Invalid header value for '{}': {}", name, e))
        })?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Merge a header map, replacing existing entries with the same name.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
        self
    }

    /// Attach a JSON body and `Content-Type: application/json`.
    pub fn json(mut self, body: &JsonValue) -> SupabaseResult<Self> {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body.to_vec()?);
        Ok(self)
    }

    /// Attach a raw body with the given content type.
    pub fn bytes(self, content_type: &str, body: Vec<u8>) -> SupabaseResult<Self> {
        let mut request = self.header(CONTENT_TYPE.as_str(), content_type)?;
        request.body = Some(body);
        Ok(request)
    }

    /// Header value as text, if present and valid UTF-8.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// A completed HTTP round trip.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, headers: HeaderMap, body: Vec<u8>) -> Self {
        let status_text = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        Self {
            status,
            status_text,
            headers,
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body decoded as UTF-8, lossily.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// Sends [`HttpRequest`]s with a per-attempt timeout, retrying transient statuses.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    http: reqwest::Client,
    policy: RetryPolicy,
    timeout: Duration,
}

impl HttpExecutor {
    pub fn new(policy: RetryPolicy, timeout: Duration) -> SupabaseResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| SupabaseError::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self::with_client(http, policy, timeout))
    }

    /// Use an existing `reqwest::Client` (shares its connection pool).
    pub fn with_client(http: reqwest::Client, policy: RetryPolicy, timeout: Duration) -> Self {
        Self {
            http,
            policy,
            timeout,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Execute the request under the retry policy.
    ///
    /// Returns the first non-transient response whatever its status; callers decide which
    /// statuses are errors.
    pub async fn execute(&self, request: &HttpRequest) -> SupabaseResult<RawResponse> {
        let response =
            with_retry(&self.policy, move |attempt| self.send_once(request, attempt)).await?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "Request finished"
        );
        Ok(response)
    }

    async fn send_once(&self, request: &HttpRequest, attempt: u32) -> SupabaseResult<RawResponse> {
        debug!(method = %request.method, url = %request.url, attempt, "Sending request");

        let mut builder = self
            .http
            .request(request.method.clone(), &request.url)
            .headers(request.headers.clone())
            .timeout(self.timeout);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(RawResponse::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object;

    #[test]
    fn test_request_json_sets_content_type() {
        let req = HttpRequest::new(Method::POST, "http://localhost/rest/v1/t")
            .json(&object![("a", 1)])
            .unwrap();
        assert_eq!(req.header_value("content-type"), Some("application/json"));
        assert_eq!(req.body.as_deref(), Some(br#"{"a":1}"#.as_slice()));
    }

    #[test]
    fn test_request_invalid_header_value() {
        let err = HttpRequest::new(Method::GET, "http://localhost")
            .header("apikey", "bad\nvalue")
            .unwrap_err();
        assert!(matches!(err, SupabaseError::Config(_)));
    }

    #[test]
    fn test_request_headers_merge_replaces() {
        let mut extra = HeaderMap::new();
        extra.insert("prefer", HeaderValue::from_static("return=minimal"));
        let req = HttpRequest::new(Method::GET, "http://localhost")
            .header("Prefer", "count=exact")
            .unwrap()
            .headers(extra);
        assert_eq!(req.header_value("prefer"), Some("return=minimal"));
        assert_eq!(req.headers.get_all("prefer").iter().count(), 1);
    }

    #[test]
    fn test_raw_response_status_text() {
        let resp = RawResponse::new(404, HeaderMap::new(), Vec::new());
        assert_eq!(resp.status_text, "Not Found");
        assert!(!resp.is_success());
        assert!(RawResponse::new(206, HeaderMap::new(), Vec::new()).is_success());
    }
}
