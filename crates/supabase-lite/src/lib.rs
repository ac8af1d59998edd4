//! A small Supabase client.
//!
//! The core crate is always available; each service sits behind a feature of the same name
//! (`query`, `auth`, `storage`, `realtime`), all enabled by default.
//!
//! ```no_run
//! use supabase_lite::prelude::*;
//!
//! # async fn run() -> Result<(), SupabaseError> {
//! let client = SupabaseClient::from_env()?;
//! let query = client.from("users").select("id,name").eq("active", true).limit(10);
//! let response = client.postgrest().execute(query).await?;
//! for row in response.rows() {
//!     println!("{}", row);
//! }
//! # Ok(())
//! # }
//! ```

pub use supabase_lite_core::*;

#[cfg(feature = "query")]
pub use supabase_lite_query::*;

#[cfg(feature = "auth")]
pub use supabase_lite_auth;

#[cfg(feature = "storage")]
pub use supabase_lite_storage;

#[cfg(feature = "realtime")]
pub use supabase_lite_realtime;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use supabase_lite::prelude::*;
/// ```
pub mod prelude {
    pub use supabase_lite_core::object;
    pub use supabase_lite_core::{
        JsonValue, RetryPolicy, SupabaseClient, SupabaseConfig, SupabaseError, SupabaseResponse,
        SupabaseResult,
    };

    #[cfg(feature = "query")]
    pub use supabase_lite_query::{
        CountOption, FilterOperator, Filterable, IsValue, OrderDirection, PostgrestClient,
        QueryBuilder, SupabaseClientQueryExt,
    };

    #[cfg(feature = "auth")]
    pub use supabase_lite_auth::{
        AuthClient, AuthError, AuthErrorCode, AuthResponse, Session, SupabaseClientAuthExt, User,
        UserAttributes,
    };

    #[cfg(feature = "storage")]
    pub use supabase_lite_storage::{
        FileObject, FileOptions, SearchOptions, SortOrder, StorageBucketApi, StorageClient,
        StorageError, SupabaseClientStorageExt,
    };

    #[cfg(feature = "realtime")]
    pub use supabase_lite_realtime::{
        ChannelState, RealtimeClient, RealtimeConfig, RealtimeError, SupabaseClientRealtimeExt,
    };
}
