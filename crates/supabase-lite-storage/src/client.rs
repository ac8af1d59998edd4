use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::error::Category;
use tracing::debug;

use supabase_lite_core::{HttpRequest, RawResponse, SupabaseClient, SupabaseError, SupabaseResult};

use crate::bucket_api::StorageBucketApi;
use crate::error::{StorageApiErrorResponse, StorageError};

/// HTTP client for the Supabase Storage API at `/storage/v1/...`.
///
/// # Example
/// ```ignore
/// use supabase_lite_storage::SupabaseClientStorageExt;
///
/// let file_api = client.storage().from("avatars");
/// let bytes = file_api.download("photo.png").await?;
/// ```
#[derive(Debug, Clone)]
pub struct StorageClient {
    client: SupabaseClient,
}

impl StorageClient {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Base URL of the storage API.
    pub fn base_url(&self) -> String {
        self.client.endpoint("storage/v1")
    }

    /// Get a file API scoped to `bucket`.
    pub fn from(&self, bucket: &str) -> StorageBucketApi {
        StorageBucketApi::new(self.clone(), bucket.to_string())
    }

    // ─── Internal Helpers ────────────────────────────────────────

    pub(crate) fn request(&self, method: Method, path: &str) -> SupabaseResult<HttpRequest> {
        self.client
            .request(method, &format!("storage/v1/{}", path.trim_start_matches('/')))
    }

    pub(crate) async fn send(&self, request: HttpRequest) -> Result<RawResponse, StorageError> {
        debug!(method = %request.method, url = %request.url, "Storage request");
        let resp = self.client.send(request).await?;
        if !resp.is_success() {
            return Err(parse_error(&resp));
        }
        Ok(resp)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(resp: &RawResponse) -> Result<T, StorageError> {
    serde_json::from_slice(&resp.body).map_err(|e| match e.classify() {
        Category::Data => StorageError::InvalidResponse(e.to_string()),
        _ => StorageError::Core(SupabaseError::parse(e.to_string())),
    })
}

fn parse_error(resp: &RawResponse) -> StorageError {
    let body: StorageApiErrorResponse = serde_json::from_slice(&resp.body).unwrap_or_default();
    StorageError::Api {
        status: resp.status,
        message: body
            .error_message()
            .unwrap_or_else(|| format!("HTTP {} {}", resp.status, resp.status_text)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderMap;
    use supabase_lite_core::SupabaseConfig;

    fn storage(url: &str) -> StorageClient {
        StorageClient::new(SupabaseClient::new(SupabaseConfig::new(url, "test-key")).unwrap())
    }

    #[test]
    fn client_base_url() {
        assert_eq!(
            storage("https://example.supabase.co").base_url(),
            "https://example.supabase.co/storage/v1"
        );
        assert_eq!(
            storage("https://example.supabase.co/").base_url(),
            "https://example.supabase.co/storage/v1"
        );
    }

    #[test]
    fn request_building() {
        let req = storage("https://example.supabase.co")
            .request(Method::GET, "/object/avatars/a.png")
            .unwrap();
        assert_eq!(req.url, "https://example.supabase.co/storage/v1/object/avatars/a.png");
        assert_eq!(req.header_value("apikey"), Some("test-key"));
    }

    #[test]
    fn parse_error_falls_back_to_status() {
        let resp = RawResponse::new(403, HeaderMap::new(), b"<html>".to_vec());
        assert!(matches!(
            parse_error(&resp),
            StorageError::Api { status: 403, ref message } if message == "HTTP 403 Forbidden"
        ));
    }
}
