//! PostgREST query building and execution for supabase-lite.
//!
//! ```no_run
//! use supabase_lite_core::{SupabaseClient, SupabaseConfig};
//! use supabase_lite_query::{Filterable, SupabaseClientQueryExt};
//!
//! # async fn run() -> supabase_lite_core::SupabaseResult<()> {
//! let client = SupabaseClient::new(SupabaseConfig::new("http://localhost:54321", "anon-key"))?;
//! let query = client.from("users").select("id,name,email").eq("id", "123").limit(10);
//! let response = client.postgrest().execute(query).await?;
//! println!("{} rows", response.rows().len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod execute;
pub mod filter;
pub mod postgrest;
pub mod types;

pub use builder::QueryBuilder;
pub use execute::PostgrestClient;
pub use filter::Filterable;
pub use types::{CountOption, FilterOperator, IsValue, OrderDirection, RowRange};

use supabase_lite_core::SupabaseClient;

/// Extension trait adding PostgREST access to [`SupabaseClient`].
pub trait SupabaseClientQueryExt {
    /// Get a client for executing queries, batches and RPC calls.
    fn postgrest(&self) -> PostgrestClient;

    /// Start a query on a table.
    fn from(&self, table: &str) -> QueryBuilder;
}

impl SupabaseClientQueryExt for SupabaseClient {
    fn postgrest(&self) -> PostgrestClient {
        PostgrestClient::new(self.clone())
    }

    fn from(&self, table: &str) -> QueryBuilder {
        QueryBuilder::new(table)
    }
}
