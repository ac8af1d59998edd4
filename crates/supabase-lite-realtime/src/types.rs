use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A Phoenix Channels protocol message (v1.0.0).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhoenixMessage {
    pub event: String,
    pub topic: String,
    pub payload: Value,
    #[serde(rename = "ref")]
    pub msg_ref: Option<String>,
    #[serde(default)]
    pub join_ref: Option<String>,
}

impl PhoenixMessage {
    /// `payload.status` of a `phx_reply`.
    pub fn reply_status(&self) -> Option<&str> {
        self.payload.get("status").and_then(|s| s.as_str())
    }
}

/// The lifecycle state of a subscribed channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Joining,
    Joined,
    Closed,
    Errored,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Joining => write!(f, "joining"),
            Self::Joined => write!(f, "joined"),
            Self::Closed => write!(f, "closed"),
            Self::Errored => write!(f, "errored"),
        }
    }
}

/// Configuration for the realtime client.
#[derive(Debug, Clone)]
pub struct RealtimeConfig {
    /// The Supabase project URL (http/https).
    pub url: String,
    /// The Supabase API key.
    pub api_key: String,
    /// Heartbeat interval (default: 30s).
    pub heartbeat_interval: Duration,
    /// How long `subscribe` waits for the join reply (default: 10s).
    pub subscribe_timeout: Duration,
}

impl RealtimeConfig {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
            heartbeat_interval: Duration::from_secs(30),
            subscribe_timeout: Duration::from_secs(10),
        }
    }

    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    pub fn subscribe_timeout(mut self, timeout: Duration) -> Self {
        self.subscribe_timeout = timeout;
        self
    }
}
