use std::str::FromStr;
use std::time::Duration;

use crate::error::{SupabaseError, SupabaseResult};
use crate::retry::RetryPolicy;

/// Configuration for connecting to a Supabase project.
#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    /// Project URL (e.g. "https://xyzcompany.supabase.co")
    pub supabase_url: String,
    /// Anon (or service role) key, sent as `apikey`
    pub api_key: String,
    /// User access token sent as the bearer token instead of the API key
    pub access_token: Option<String>,
    /// Default schema (defaults to "public")
    pub schema: String,
    /// Timeout applied to each individual attempt
    pub timeout: Duration,
    /// Retry policy for transient statuses
    pub retry: RetryPolicy,
}

impl SupabaseConfig {
    /// Create a new config with a project URL and API key.
    pub fn new(supabase_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            supabase_url: supabase_url.into(),
            api_key: api_key.into(),
            access_token: None,
            schema: "public".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }

    /// Build a config from `SUPABASE_*` environment variables.
    ///
    /// `SUPABASE_URL` and `SUPABASE_ANON_KEY` are required. `SUPABASE_SCHEMA`,
    /// `SUPABASE_TIMEOUT_MS`, `SUPABASE_MAX_RETRIES` and `SUPABASE_RETRY_INTERVAL_MS`
    /// override the defaults when set.
    pub fn from_env() -> SupabaseResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> SupabaseResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("SUPABASE_URL")
            .ok_or_else(|| SupabaseError::config("SUPABASE_URL is not set"))?;
        let key = lookup("SUPABASE_ANON_KEY")
            .ok_or_else(|| SupabaseError::config("SUPABASE_ANON_KEY is not set"))?;

        let mut config = Self::new(url, key);
        if let Some(schema) = lookup("SUPABASE_SCHEMA") {
            config.schema = schema;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SUPABASE_TIMEOUT_MS")? {
            config.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = parse_var::<u32, _>(&lookup, "SUPABASE_MAX_RETRIES")? {
            config.retry.max_retries = n;
        }
        if let Some(ms) = parse_var::<u64, _>(&lookup, "SUPABASE_RETRY_INTERVAL_MS")? {
            config.retry.retry_interval_ms = ms;
        }
        Ok(config)
    }

    /// Set a user access token to authenticate requests.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Set the default schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Set the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the per-attempt timeout in milliseconds.
    pub fn timeout_ms(self, ms: u64) -> Self {
        self.timeout(Duration::from_millis(ms))
    }

    /// Replace the retry policy.
    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Set the total attempt budget.
    pub fn max_retries(mut self, n: u32) -> Self {
        self.retry.max_retries = n;
        self
    }

    /// Set the fixed delay between attempts.
    pub fn retry_interval_ms(mut self, ms: u64) -> Self {
        self.retry.retry_interval_ms = ms;
        self
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> SupabaseResult<Option<T>>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| SupabaseError::config(format!("{} has an invalid value: {}", name, raw))),
    }
}
