//! Supabase Storage HTTP client.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_lite::prelude::*;
//!
//! let client = SupabaseClient::new(config)?;
//! let file_api = client.storage().from("photos");
//!
//! file_api.upload("photo.png", data, FileOptions::new().content_type("image/png")).await?;
//! let bytes = file_api.download("photo.png").await?;
//! let files = file_api.list("", SearchOptions::new().limit(100)).await?;
//! ```

pub mod bucket_api;
pub mod client;
pub mod error;
pub mod types;

pub use bucket_api::StorageBucketApi;
pub use client::StorageClient;
pub use error::{StorageApiErrorResponse, StorageError};
pub use types::*;

use supabase_lite_core::SupabaseClient;

/// Extension trait to create a [`StorageClient`] from a [`SupabaseClient`].
pub trait SupabaseClientStorageExt {
    /// Create a [`StorageClient`] sharing the client's configuration and connection pool.
    fn storage(&self) -> StorageClient;
}

impl SupabaseClientStorageExt for SupabaseClient {
    fn storage(&self) -> StorageClient {
        StorageClient::new(self.clone())
    }
}
