use std::sync::Arc;

use reqwest::Method;
use url::Url;

use crate::config::SupabaseConfig;
use crate::error::{SupabaseError, SupabaseResult};
use crate::http::{HttpExecutor, HttpRequest, RawResponse};
use crate::retry::RetryPolicy;

/// The main client for interacting with a Supabase project.
///
/// Holds the configuration and the retrying HTTP executor. Service crates extend it with
/// sub-clients (`postgrest()`, `auth()`, `storage()`, `realtime()`). Cheap to clone.
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: Arc<SupabaseConfig>,
    executor: HttpExecutor,
}

impl SupabaseClient {
    /// Create a new client, validating the project URL and API key.
    pub fn new(config: SupabaseConfig) -> SupabaseResult<Self> {
        let parsed = Url::parse(&config.supabase_url).map_err(|e| {
            SupabaseError::config(format!("Invalid Supabase URL '{}': {}", config.supabase_url, e))
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SupabaseError::config(format!(
                "Unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }
        if config.api_key.trim().is_empty() {
            return Err(SupabaseError::config("API key must not be empty"));
        }

        let executor = HttpExecutor::new(config.retry, config.timeout)?;
        Ok(Self {
            config: Arc::new(config),
            executor,
        })
    }

    /// Create a client from `SUPABASE_*` environment variables.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::new(SupabaseConfig::from_env()?)
    }

    /// Get the full config.
    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    /// Project URL without a trailing slash.
    pub fn supabase_url(&self) -> &str {
        self.config.supabase_url.trim_end_matches('/')
    }

    pub fn api_key(&self) -> &str {
        &self.config.api_key
    }

    /// Get the default schema.
    pub fn schema(&self) -> &str {
        &self.config.schema
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        self.executor.policy()
    }

    /// Token sent as `Authorization: Bearer ...`: the access token if set, else the API key.
    pub fn bearer_token(&self) -> &str {
        self.config
            .access_token
            .as_deref()
            .unwrap_or(&self.config.api_key)
    }

    /// A client sharing this one's connection pool that authenticates as a user.
    pub fn with_access_token(&self, token: impl Into<String>) -> Self {
        let config = SupabaseConfig::clone(&self.config).access_token(token);
        Self {
            config: Arc::new(config),
            executor: self.executor.clone(),
        }
    }

    /// Absolute URL for a path under the project URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.supabase_url(), path.trim_start_matches('/'))
    }

    /// Start a request carrying the `apikey` and `Authorization` headers.
    pub fn request(&self, method: Method, path: &str) -> SupabaseResult<HttpRequest> {
        HttpRequest::new(method, self.endpoint(path))
            .header("apikey", self.api_key())?
            .header("Authorization", &format!("Bearer {}", self.bearer_token()))
    }

    /// Send a request through the retrying executor.
    pub async fn send(&self, request: HttpRequest) -> SupabaseResult<RawResponse> {
        self.executor.execute(&request).await
    }
}
