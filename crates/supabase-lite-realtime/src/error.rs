use std::time::Duration;

use supabase_lite_core::SupabaseError;

#[derive(Debug, thiserror::Error)]
pub enum RealtimeError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel already subscribed: {0}")]
    ChannelAlreadyExists(String),

    #[error("Channel not found: {0}")]
    ChannelNotFound(String),

    #[error("Subscribe timed out after {0:?}")]
    SubscribeTimeout(Duration),

    #[error("Connection closed")]
    ConnectionClosed,

    /// The server refused a join.
    #[error("Server error: {0}")]
    ServerError(String),
}

impl From<RealtimeError> for SupabaseError {
    fn from(e: RealtimeError) -> Self {
        SupabaseError::Realtime(e.to_string())
    }
}
