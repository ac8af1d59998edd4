//! Core of supabase-lite: configuration, the JSON value model, the retrying HTTP
//! executor and response decoding shared by every service crate.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod retry;
pub mod value;

pub use client::SupabaseClient;
pub use config::SupabaseConfig;
pub use error::{SupabaseError, SupabaseResult};
pub use http::{HttpExecutor, HttpRequest, RawResponse};
pub use response::{decode_response, parse_content_range_count, ResponseMetadata, SupabaseResponse};
pub use retry::{is_transient, with_retry, RetryPolicy, TRANSIENT_STATUSES};
pub use value::JsonValue;
