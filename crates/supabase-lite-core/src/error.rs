/// All errors that can occur in the supabase-lite crates.
#[derive(Debug, thiserror::Error)]
pub enum SupabaseError {
    /// Transport-level failure (connection refused, per-attempt timeout, TLS, ...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The payload was not well-formed JSON.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Well-formed payload with the wrong shape, or an unparsable pagination header.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// A table query or batch operation finished with a non-2xx status.
    #[error("Query error ({status}): {message}")]
    Query {
        status: u16,
        message: String,
        code: Option<String>,
    },

    /// An RPC call finished with a non-2xx status.
    #[error("RPC error ({status}): {message}")]
    Rpc {
        status: u16,
        message: String,
        code: Option<String>,
    },

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Realtime error: {0}")]
    Realtime(String),

    /// `in` filter built with no values.
    #[error("in() filter on column '{column}' requires at least one value")]
    EmptyInList { column: String },

    /// Every permitted attempt ended in a transient status.
    #[error("Max retries exceeded after {attempts} attempt(s) (last status: {last_status:?})")]
    MaxRetriesExceeded {
        attempts: u32,
        last_status: Option<u16>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl SupabaseError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// HTTP status carried by the error, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Query { status, .. } | Self::Rpc { status, .. } => Some(*status),
            Self::MaxRetriesExceeded { last_status, .. } => *last_status,
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for SupabaseError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias using SupabaseError.
pub type SupabaseResult<T> = Result<T, SupabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_query_error() {
        let err = SupabaseError::Query {
            status: 401,
            message: "JWT expired".into(),
            code: Some("PGRST301".into()),
        };
        assert_eq!(err.to_string(), "Query error (401): JWT expired");
        assert_eq!(err.status(), Some(401));
    }

    #[test]
    fn display_empty_in_list() {
        let err = SupabaseError::EmptyInList {
            column: "id".into(),
        };
        assert_eq!(
            err.to_string(),
            "in() filter on column 'id' requires at least one value"
        );
    }

    #[test]
    fn display_max_retries() {
        let err = SupabaseError::MaxRetriesExceeded {
            attempts: 3,
            last_status: Some(503),
        };
        assert_eq!(
            err.to_string(),
            "Max retries exceeded after 3 attempt(s) (last status: Some(503))"
        );
        assert_eq!(err.status(), Some(503));
    }

    #[test]
    fn serde_error_maps_to_serialization() {
        let e = serde_json::from_str::<u8>("\"x\"").unwrap_err();
        let err: SupabaseError = e.into();
        assert!(matches!(err, SupabaseError::Serialization(_)));
    }
}
