//! Supabase Auth (GoTrue) client.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_lite::prelude::*;
//!
//! let client = SupabaseClient::new(config)?;
//! let auth = client.auth();
//!
//! // Sign up
//! let response = auth.sign_up("user@example.com", "password123").await?;
//!
//! // Sign in
//! let session = auth.sign_in_with_password("user@example.com", "password123").await?;
//!
//! // Get current user
//! let user = auth.get_user(&session.access_token).await?;
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::AuthClient;
pub use error::{AuthError, AuthErrorCode, GoTrueErrorResponse};
pub use types::{AuthResponse, Session, User, UserAttributes};

use supabase_lite_core::SupabaseClient;

/// Extension trait to create an [`AuthClient`] from a [`SupabaseClient`].
pub trait SupabaseClientAuthExt {
    /// Create an [`AuthClient`] sharing the client's configuration and connection pool.
    fn auth(&self) -> AuthClient;
}

impl SupabaseClientAuthExt for SupabaseClient {
    fn auth(&self) -> AuthClient {
        AuthClient::new(self.clone())
    }
}
