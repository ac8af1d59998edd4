use serde::{Deserialize, Serialize};
use supabase_lite_core::JsonValue;

/// A file object returned from list/remove operations.
///
/// Folders come back with `id` and `metadata` set to `null`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileObject {
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub metadata: Option<FileMetadata>,
}

/// Object metadata as reported by the storage backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileMetadata {
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "lastModified")]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub mimetype: Option<String>,
    #[serde(default, rename = "cacheControl")]
    pub cache_control: Option<String>,
}

/// Options for file upload/update.
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    pub cache_control: Option<String>,
    pub content_type: Option<String>,
    pub upsert: Option<bool>,
    pub metadata: Option<JsonValue>,
}

impl FileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_control(mut self, value: &str) -> Self {
        self.cache_control = Some(value.to_string());
        self
    }

    pub fn content_type(mut self, value: &str) -> Self {
        self.content_type = Some(value.to_string());
        self
    }

    pub fn upsert(mut self, value: bool) -> Self {
        self.upsert = Some(value);
        self
    }

    pub fn metadata(mut self, value: JsonValue) -> Self {
        self.metadata = Some(value);
        self
    }
}

/// Options for listing files in a bucket.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none", rename = "sortBy")]
    pub sort_by: Option<SortBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn sort_by(mut self, column: &str, order: SortOrder) -> Self {
        self.sort_by = Some(SortBy {
            column: column.to_string(),
            order,
        });
        self
    }

    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_string());
        self
    }
}

/// Sort configuration for file listing.
#[derive(Debug, Clone, Serialize)]
pub struct SortBy {
    pub column: String,
    pub order: SortOrder,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Response from upload/update operations.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    /// `<bucket>/<path>` of the stored object.
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(default, rename = "Id")]
    pub id: Option<String>,
}
