use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::sync::{broadcast, oneshot, Mutex, RwLock};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace, warn};

use crate::error::RealtimeError;
use crate::protocol::{self, RefCounter};
use crate::types::{ChannelState, PhoenixMessage, RealtimeConfig};

type WsSink = futures_util::stream::SplitSink<
    tokio_tungstenite::WebSocketStream<
        tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
    >,
    Message,
>;

/// Receives every raw text frame addressed to a subscribed channel.
pub type MessageCallback = Arc<dyn Fn(String) + Send + Sync>;

struct Subscription {
    join_ref: String,
    state: ChannelState,
    callback: MessageCallback,
}

struct RealtimeClientInner {
    config: RealtimeConfig,
    ws_write: Mutex<Option<WsSink>>,
    // Keyed by topic (`realtime:<channel>`).
    channels: RwLock<HashMap<String, Subscription>>,
    ref_counter: RefCounter,
    pending_replies: Mutex<HashMap<String, oneshot::Sender<PhoenixMessage>>>,
    connected: AtomicBool,
    shutdown_tx: broadcast::Sender<()>,
}

/// Client for Supabase Realtime WebSocket connections.
///
/// Wraps `Arc<Inner>`, so clones share one connection and one set of subscriptions.
///
/// # Example
/// ```ignore
/// let realtime = client.realtime()?;
/// realtime.connect().await?;
/// realtime.subscribe("room-1", |frame| println!("{frame}")).await?;
/// realtime.broadcast("room-1", "cursor", serde_json::json!({"x": 10})).await?;
/// ```
#[derive(Clone)]
pub struct RealtimeClient {
    inner: Arc<RealtimeClientInner>,
}

impl RealtimeClient {
    /// Create a new RealtimeClient from a Supabase URL and API key.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Result<Self, RealtimeError> {
        Self::with_config(RealtimeConfig::new(url, api_key))
    }

    pub fn with_config(config: RealtimeConfig) -> Result<Self, RealtimeError> {
        if config.url.is_empty() {
            return Err(RealtimeError::InvalidConfig(
                "URL must not be empty".to_string(),
            ));
        }
        if config.api_key.is_empty() {
            return Err(RealtimeError::InvalidConfig(
                "API key must not be empty".to_string(),
            ));
        }

        let (shutdown_tx, _) = broadcast::channel(1);

        Ok(Self {
            inner: Arc::new(RealtimeClientInner {
                config,
                ws_write: Mutex::new(None),
                channels: RwLock::new(HashMap::new()),
                ref_counter: RefCounter::new(),
                pending_replies: Mutex::new(HashMap::new()),
                connected: AtomicBool::new(false),
                shutdown_tx,
            }),
        })
    }

    /// Open the WebSocket and start the reader and heartbeat tasks.
    pub async fn connect(&self) -> Result<(), RealtimeError> {
        let ws_url = build_ws_url(&self.inner.config.url, &self.inner.config.api_key)?;
        debug!(url = %redact_api_key(&ws_url), "Connecting to Supabase Realtime");

        let (ws_stream, _) = tokio_tungstenite::connect_async(ws_url.as_str()).await?;
        let (write, read) = ws_stream.split();

        *self.inner.ws_write.lock().await = Some(write);
        self.inner.connected.store(true, Ordering::SeqCst);

        let inner = Arc::clone(&self.inner);
        let mut shutdown_rx = self.inner.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut read = read;
            loop {
                tokio::select! {
                    msg = read.next() => {
                        match msg {
                            Some(Ok(Message::Text(text))) => {
                                handle_message(&inner, &text).await;
                            }
                            Some(Ok(Message::Close(_))) => {
                                debug!("WebSocket closed by server");
                                mark_disconnected(&inner).await;
                                break;
                            }
                            Some(Ok(Message::Ping(data))) => {
                                let mut ws = inner.ws_write.lock().await;
                                if let Some(sink) = ws.as_mut() {
                                    let _ = sink.send(Message::Pong(data)).await;
                                }
                            }
                            Some(Err(e)) => {
                                warn!(error = %e, "WebSocket read error");
                                mark_disconnected(&inner).await;
                                break;
                            }
                            None => {
                                debug!("WebSocket stream ended");
                                mark_disconnected(&inner).await;
                                break;
                            }
                            _ => {}
                        }
                    }
                    _ = shutdown_rx.recv() => {
                        debug!("Reader task shutting down");
                        break;
                    }
                }
            }
        });

        let inner_hb = Arc::clone(&self.inner);
        let mut shutdown_rx_hb = self.inner.shutdown_tx.subscribe();
        let heartbeat_interval = self.inner.config.heartbeat_interval;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(heartbeat_interval);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        if !inner_hb.connected.load(Ordering::SeqCst) {
                            break;
                        }
                        let heartbeat = protocol::build_heartbeat(&inner_hb.ref_counter);
                        if let Err(e) = send_message(&inner_hb, heartbeat).await {
                            warn!(error = %e, "Heartbeat send failed");
                            inner_hb.connected.store(false, Ordering::SeqCst);
                            break;
                        }
                        trace!("Heartbeat sent");
                    }
                    _ = shutdown_rx_hb.recv() => {
                        debug!("Heartbeat task shutting down");
                        break;
                    }
                }
            }
        });

        debug!("Connected to Supabase Realtime");
        Ok(())
    }

    /// Join `realtime:<channel>` and deliver its frames to `callback`.
    ///
    /// Returns once the server acknowledged the join. Every later text frame on the topic is
    /// passed to `callback` verbatim, from the reader task, so the callback must not block.
    pub async fn subscribe<F>(&self, channel: &str, callback: F) -> Result<(), RealtimeError>
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        if !self.is_connected() {
            return Err(RealtimeError::ConnectionClosed);
        }

        let topic = protocol::topic_for(channel);
        let join_ref = self.inner.ref_counter.next();

        {
            let mut channels = self.inner.channels.write().await;
            if channels.contains_key(&topic) {
                return Err(RealtimeError::ChannelAlreadyExists(channel.to_string()));
            }
            channels.insert(
                topic.clone(),
                Subscription {
                    join_ref: join_ref.clone(),
                    state: ChannelState::Joining,
                    callback: Arc::new(callback),
                },
            );
        }

        let (reply_tx, reply_rx) = oneshot::channel();
        self.inner
            .pending_replies
            .lock()
            .await
            .insert(join_ref.clone(), reply_tx);

        let join = protocol::build_join(&topic, &self.inner.config.api_key, &join_ref);
        if let Err(e) = send_message(&self.inner, join).await {
            self.abandon_join(&topic, &join_ref).await;
            return Err(e);
        }

        let timeout = self.inner.config.subscribe_timeout;
        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(reply)) if reply.reply_status() == Some("ok") => {
                debug!(topic = %topic, "Channel joined");
                Ok(())
            }
            Ok(Ok(reply)) => {
                self.abandon_join(&topic, &join_ref).await;
                let reason = reply
                    .payload
                    .get("response")
                    .and_then(|r| r.get("reason"))
                    .and_then(|r| r.as_str())
                    .unwrap_or("unknown")
                    .to_string();
                warn!(topic = %topic, reason = %reason, "Channel join refused");
                Err(RealtimeError::ServerError(reason))
            }
            Ok(Err(_)) => {
                self.abandon_join(&topic, &join_ref).await;
                Err(RealtimeError::ConnectionClosed)
            }
            Err(_) => {
                self.abandon_join(&topic, &join_ref).await;
                warn!(topic = %topic, ?timeout, "Channel join timed out");
                Err(RealtimeError::SubscribeTimeout(timeout))
            }
        }
    }

    /// Send a broadcast `event` with `payload` to a joined channel.
    pub async fn broadcast(
        &self,
        channel: &str,
        event: &str,
        payload: impl Into<Value>,
    ) -> Result<(), RealtimeError> {
        let topic = protocol::topic_for(channel);
        let join_ref = self.joined_ref(&topic, channel).await?;
        let msg = protocol::build_broadcast(
            &topic,
            event,
            payload.into(),
            &join_ref,
            &self.inner.ref_counter,
        );
        send_message(&self.inner, msg).await
    }

    /// Leave a channel. Its callback receives nothing further.
    pub async fn unsubscribe(&self, channel: &str) -> Result<(), RealtimeError> {
        let topic = protocol::topic_for(channel);
        let removed = self.inner.channels.write().await.remove(&topic);
        let subscription =
            removed.ok_or_else(|| RealtimeError::ChannelNotFound(channel.to_string()))?;

        debug!(topic = %topic, "Leaving channel");
        if subscription.state == ChannelState::Joined && self.is_connected() {
            let leave =
                protocol::build_leave(&topic, &subscription.join_ref, &self.inner.ref_counter);
            send_message(&self.inner, leave).await?;
        }
        Ok(())
    }

    /// Close the connection and drop every subscription.
    pub async fn disconnect(&self) -> Result<(), RealtimeError> {
        debug!("Disconnecting from Supabase Realtime");
        let _ = self.inner.shutdown_tx.send(());
        self.inner.connected.store(false, Ordering::SeqCst);

        {
            let mut ws = self.inner.ws_write.lock().await;
            if let Some(mut sink) = ws.take() {
                let _ = sink.send(Message::Close(None)).await;
            }
        }

        self.inner.pending_replies.lock().await.clear();
        self.inner.channels.write().await.clear();
        Ok(())
    }

    /// Names of the channels currently subscribed or joining.
    pub async fn channels(&self) -> Vec<String> {
        self.inner
            .channels
            .read()
            .await
            .keys()
            .map(|topic| topic.trim_start_matches("realtime:").to_string())
            .collect()
    }

    /// State of a channel, if it is known.
    pub async fn channel_state(&self, channel: &str) -> Option<ChannelState> {
        self.inner
            .channels
            .read()
            .await
            .get(&protocol::topic_for(channel))
            .map(|s| s.state)
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    async fn joined_ref(&self, topic: &str, channel: &str) -> Result<String, RealtimeError> {
        let channels = self.inner.channels.read().await;
        match channels.get(topic) {
            Some(s) if s.state == ChannelState::Joined => Ok(s.join_ref.clone()),
            _ => Err(RealtimeError::ChannelNotFound(channel.to_string())),
        }
    }

    async fn abandon_join(&self, topic: &str, join_ref: &str) {
        self.inner.pending_replies.lock().await.remove(join_ref);
        let mut channels = self.inner.channels.write().await;
        if channels.get(topic).is_some_and(|s| s.join_ref == join_ref) {
            channels.remove(topic);
        }
    }
}

impl std::fmt::Debug for RealtimeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeClient")
            .field("url", &self.inner.config.url)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Convert a Supabase HTTP URL to the WebSocket URL of the Realtime endpoint.
pub(crate) fn build_ws_url(base_url: &str, api_key: &str) -> Result<url::Url, RealtimeError> {
    let mut parsed = url::Url::parse(base_url)?;

    let ws_scheme = match parsed.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(RealtimeError::InvalidConfig(format!(
                "Unsupported URL scheme: {}",
                other
            )));
        }
    };
    parsed
        .set_scheme(ws_scheme)
        .map_err(|_| RealtimeError::InvalidConfig("Failed to set WS scheme".to_string()))?;

    let mut path = parsed.path().to_string();
    if !path.ends_with('/') {
        path.push('/');
    }
    path.push_str("realtime/v1/websocket");
    parsed.set_path(&path);

    parsed
        .query_pairs_mut()
        .append_pair("apikey", api_key)
        .append_pair("vsn", "1.0.0");

    Ok(parsed)
}

fn redact_api_key(url: &url::Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let v = if k == "apikey" { "***".into() } else { v.into_owned() };
            (k.into_owned(), v)
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}

async fn send_message(
    inner: &RealtimeClientInner,
    msg: PhoenixMessage,
) -> Result<(), RealtimeError> {
    let text = serde_json::to_string(&msg)?;
    let mut ws = inner.ws_write.lock().await;
    let sink = ws.as_mut().ok_or(RealtimeError::ConnectionClosed)?;
    trace!(topic = %msg.topic, event = %msg.event, "Sending WS message");
    sink.send(Message::Text(text.into())).await?;
    Ok(())
}

/// Route one inbound frame.
///
/// A `phx_reply` to a pending join settles that join and is not forwarded. Any other frame
/// on a joined topic goes to the topic's callback verbatim.
async fn handle_message(inner: &RealtimeClientInner, text: &str) {
    let msg: PhoenixMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "Failed to parse Phoenix message");
            return;
        }
    };

    trace!(topic = %msg.topic, event = %msg.event, "Received WS message");

    if msg.event == "phx_reply" {
        if let Some(ref_id) = msg.msg_ref.as_deref() {
            let pending = inner.pending_replies.lock().await.remove(ref_id);
            if let Some(tx) = pending {
                let mut channels = inner.channels.write().await;
                if let Some(sub) = channels.get_mut(&msg.topic) {
                    if sub.join_ref == ref_id {
                        sub.state = if msg.reply_status() == Some("ok") {
                            ChannelState::Joined
                        } else {
                            ChannelState::Errored
                        };
                    }
                }
                drop(channels);
                let _ = tx.send(msg);
                return;
            }
        }
    }

    let callback = {
        let mut channels = inner.channels.write().await;
        let Some(sub) = channels.get_mut(&msg.topic) else {
            trace!(topic = %msg.topic, "Frame for unknown topic");
            return;
        };
        if sub.state != ChannelState::Joined {
            return;
        }
        match msg.event.as_str() {
            "phx_close" => sub.state = ChannelState::Closed,
            "phx_error" => sub.state = ChannelState::Errored,
            _ => {}
        }
        Arc::clone(&sub.callback)
    };

    callback(text.to_string());
}

async fn mark_disconnected(inner: &RealtimeClientInner) {
    inner.connected.store(false, Ordering::SeqCst);
    *inner.ws_write.lock().await = None;
    // Dropping the senders fails any join still waiting.
    inner.pending_replies.lock().await.clear();
    for sub in inner.channels.write().await.values_mut() {
        sub.state = ChannelState::Closed;
    }
}
