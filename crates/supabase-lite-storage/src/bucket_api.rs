use reqwest::Method;
use serde::Serialize;

use supabase_lite_core::JsonValue;

use crate::client::{decode, StorageClient};
use crate::error::StorageError;
use crate::types::*;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// File operations API scoped to a specific bucket.
///
/// Created via `StorageClient::from("bucket_name")`.
///
/// # Example
/// ```ignore
/// let file_api = storage.from("avatars");
/// file_api.upload("photo.png", data, FileOptions::new()).await?;
/// let bytes = file_api.download("photo.png").await?;
/// ```
#[derive(Debug, Clone)]
pub struct StorageBucketApi {
    client: StorageClient,
    bucket_id: String,
}

#[derive(Serialize)]
struct ListRequest<'a> {
    prefix: &'a str,
    #[serde(flatten)]
    options: &'a SearchOptions,
}

impl StorageBucketApi {
    pub(crate) fn new(client: StorageClient, bucket_id: String) -> Self {
        Self { client, bucket_id }
    }

    pub fn bucket_id(&self) -> &str {
        &self.bucket_id
    }

    /// Upload a new file to the bucket.
    pub async fn upload(
        &self,
        path: &str,
        data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse, StorageError> {
        self.write_object(Method::POST, path, data, options).await
    }

    /// Replace an existing file in the bucket.
    pub async fn update(
        &self,
        path: &str,
        data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse, StorageError> {
        self.write_object(Method::PUT, path, data, options).await
    }

    /// Download a file from the bucket.
    ///
    /// Returns the raw file bytes.
    pub async fn download(&self, path: &str) -> Result<Vec<u8>, StorageError> {
        let request = self.client.request(Method::GET, &self.object_path(path))?;
        let resp = self.client.send(request).await?;
        Ok(resp.body)
    }

    /// List files in the bucket under the folder `prefix` (`""` for the root).
    pub async fn list(
        &self,
        prefix: &str,
        options: SearchOptions,
    ) -> Result<Vec<FileObject>, StorageError> {
        let body = JsonValue::from_serializable(&ListRequest {
            prefix,
            options: &options,
        })?;
        let request = self
            .client
            .request(Method::POST, &format!("object/list/{}", self.bucket_id))?
            .json(&body)?;
        let resp = self.client.send(request).await?;
        decode(&resp)
    }

    /// Remove files from the bucket. Returns the removed objects.
    pub async fn remove(&self, paths: &[&str]) -> Result<Vec<FileObject>, StorageError> {
        let body = supabase_lite_core::object![("prefixes", paths.to_vec())];
        let request = self
            .client
            .request(Method::DELETE, &format!("object/{}", self.bucket_id))?
            .json(&body)?;
        let resp = self.client.send(request).await?;
        decode(&resp)
    }

    /// Get the public URL for a file (no HTTP call, just URL construction).
    ///
    /// Only works for files in public buckets.
    pub fn get_public_url(&self, path: &str) -> String {
        format!(
            "{}/object/public/{}/{}",
            self.client.base_url(),
            self.bucket_id,
            path.trim_start_matches('/')
        )
    }

    async fn write_object(
        &self,
        method: Method,
        path: &str,
        data: Vec<u8>,
        options: FileOptions,
    ) -> Result<UploadResponse, StorageError> {
        let content_type = options
            .content_type
            .as_deref()
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        let mut request = self
            .client
            .request(method, &self.object_path(path))?
            .bytes(content_type, data)?;

        if let Some(cache) = &options.cache_control {
            request = request.header("cache-control", cache)?;
        }
        if let Some(upsert) = options.upsert {
            request = request.header("x-upsert", if upsert { "true" } else { "false" })?;
        }
        if let Some(metadata) = &options.metadata {
            request = request.header("x-metadata", &metadata.to_json_string())?;
        }

        let resp = self.client.send(request).await?;
        decode(&resp)
    }

    fn object_path(&self, path: &str) -> String {
        format!("object/{}/{}", self.bucket_id, path.trim_start_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use supabase_lite_core::{SupabaseClient, SupabaseConfig};

    fn bucket() -> StorageBucketApi {
        let client =
            SupabaseClient::new(SupabaseConfig::new("https://example.supabase.co", "k")).unwrap();
        StorageClient::new(client).from("avatars")
    }

    #[test]
    fn public_url_construction() {
        assert_eq!(
            bucket().get_public_url("folder/photo.png"),
            "https://example.supabase.co/storage/v1/object/public/avatars/folder/photo.png"
        );
    }

    #[test]
    fn object_path_strips_leading_slash() {
        assert_eq!(bucket().object_path("/a/b.txt"), "object/avatars/a/b.txt");
    }

    #[test]
    fn list_request_flattens_options() {
        let options = SearchOptions::new().limit(5).search("cat");
        let json = serde_json::to_value(ListRequest {
            prefix: "pets",
            options: &options,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prefix": "pets", "limit": 5, "search": "cat"})
        );
    }
}
