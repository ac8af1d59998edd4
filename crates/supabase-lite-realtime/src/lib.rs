//! Supabase Realtime WebSocket client.
//!
//! Speaks the Phoenix Channels v1.0.0 protocol: joins `realtime:<channel>` topics, keeps
//! the socket alive with heartbeats, and hands every frame of a joined topic to a callback
//! as raw text.
//!
//! # Usage
//!
//! ```ignore
//! use supabase_lite::prelude::*;
//!
//! let realtime = client.realtime()?;
//! realtime.connect().await?;
//! realtime
//!     .subscribe("room-1", |frame| println!("received: {frame}"))
//!     .await?;
//! ```

pub mod client;
pub mod error;
pub(crate) mod protocol;
pub mod types;

pub use client::{MessageCallback, RealtimeClient};
pub use error::RealtimeError;
pub use types::{ChannelState, PhoenixMessage, RealtimeConfig};

use supabase_lite_core::SupabaseClient;

/// Extension trait to create a [`RealtimeClient`] from a [`SupabaseClient`].
pub trait SupabaseClientRealtimeExt {
    /// A new, unconnected [`RealtimeClient`] for the client's project and key.
    fn realtime(&self) -> Result<RealtimeClient, RealtimeError>;
}

impl SupabaseClientRealtimeExt for SupabaseClient {
    fn realtime(&self) -> Result<RealtimeClient, RealtimeError> {
        RealtimeClient::new(self.supabase_url(), self.api_key())
    }
}
