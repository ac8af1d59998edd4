use serde::Deserialize;
use supabase_lite_core::SupabaseError;

/// Error response format from the Supabase Storage API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "statusCode")]
    pub status_code: Option<String>,
}

impl StorageApiErrorResponse {
    /// Extract the most informative error message from the response.
    pub fn error_message(&self) -> Option<String> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::to_string)
    }
}

/// Storage-specific errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Transport failure, exhausted retries or malformed JSON from the shared executor.
    #[error(transparent)]
    Core(#[from] SupabaseError),

    /// Storage API returned an error response.
    #[error("Storage API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Well-formed JSON of the wrong shape.
    #[error("Invalid storage response: {0}")]
    InvalidResponse(String),
}

impl From<StorageError> for SupabaseError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Core(inner) => inner,
            other => SupabaseError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_api() {
        let err = StorageError::Api {
            status: 404,
            message: "Not found".into(),
        };
        assert_eq!(err.to_string(), "Storage API error (404): Not found");
    }

    #[test]
    fn error_converts_to_supabase_error() {
        let err = StorageError::Api {
            status: 500,
            message: "Internal".into(),
        };
        let supa: SupabaseError = err.into();
        match supa {
            SupabaseError::Storage(msg) => assert!(msg.contains("Internal")),
            other => panic!("Expected Storage variant, got: {:?}", other),
        }
    }

    #[test]
    fn core_error_passes_through() {
        let err = StorageError::Core(SupabaseError::parse("bad json"));
        assert!(matches!(SupabaseError::from(err), SupabaseError::Parse(_)));
    }

    #[test]
    fn api_error_response_deserialization() {
        let json = r#"{"error":"Bucket not found","message":"The resource was not found","statusCode":"404"}"#;
        let resp: StorageApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status_code.as_deref(), Some("404"));
        // message takes priority
        assert_eq!(resp.error_message().as_deref(), Some("The resource was not found"));
    }

    #[test]
    fn api_error_response_fallback_to_error() {
        let json = r#"{"error":"Something went wrong"}"#;
        let resp: StorageApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.error_message().as_deref(), Some("Something went wrong"));
    }

    #[test]
    fn api_error_response_empty() {
        let resp: StorageApiErrorResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.error_message(), None);
    }
}
