use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{json, Value};

use crate::types::PhoenixMessage;

/// Generates message refs, unique per connection.
pub(crate) struct RefCounter {
    counter: AtomicU64,
}

impl RefCounter {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(1),
        }
    }

    pub fn next(&self) -> String {
        self.counter.fetch_add(1, Ordering::Relaxed).to_string()
    }
}

/// `realtime:<channel>`
pub(crate) fn topic_for(channel: &str) -> String {
    format!("realtime:{}", channel)
}

/// Heartbeat on the `phoenix` topic.
pub(crate) fn build_heartbeat(ref_counter: &RefCounter) -> PhoenixMessage {
    PhoenixMessage {
        event: "heartbeat".to_string(),
        topic: "phoenix".to_string(),
        payload: json!({}),
        msg_ref: Some(ref_counter.next()),
        join_ref: None,
    }
}

/// `phx_join`; `join_ref` is also the message ref the server replies to.
pub(crate) fn build_join(topic: &str, access_token: &str, join_ref: &str) -> PhoenixMessage {
    PhoenixMessage {
        event: "phx_join".to_string(),
        topic: topic.to_string(),
        payload: json!({
            "config": {
                "broadcast": { "ack": false, "self": false },
                "presence": { "key": "" },
                "postgres_changes": [],
            },
            "access_token": access_token,
        }),
        msg_ref: Some(join_ref.to_string()),
        join_ref: Some(join_ref.to_string()),
    }
}

pub(crate) fn build_leave(topic: &str, join_ref: &str, ref_counter: &RefCounter) -> PhoenixMessage {
    PhoenixMessage {
        event: "phx_leave".to_string(),
        topic: topic.to_string(),
        payload: json!({}),
        msg_ref: Some(ref_counter.next()),
        join_ref: Some(join_ref.to_string()),
    }
}

pub(crate) fn build_broadcast(
    topic: &str,
    event: &str,
    payload: Value,
    join_ref: &str,
    ref_counter: &RefCounter,
) -> PhoenixMessage {
    PhoenixMessage {
        event: "broadcast".to_string(),
        topic: topic.to_string(),
        payload: json!({
            "type": "broadcast",
            "event": event,
            "payload": payload,
        }),
        msg_ref: Some(ref_counter.next()),
        join_ref: Some(join_ref.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refs_increase() {
        let refs = RefCounter::new();
        assert_eq!(refs.next(), "1");
        assert_eq!(refs.next(), "2");
    }

    #[test]
    fn join_uses_its_ref_as_join_ref() {
        let join = build_join(&topic_for("room"), "anon", "4");
        assert_eq!(join.topic, "realtime:room");
        assert_eq!(join.event, "phx_join");
        assert_eq!(join.msg_ref.as_deref(), Some("4"));
        assert_eq!(join.join_ref.as_deref(), Some("4"));
        assert_eq!(join.payload["access_token"], "anon");
        assert_eq!(join.payload["config"]["broadcast"]["self"], false);
    }

    #[test]
    fn heartbeat_targets_phoenix() {
        let refs = RefCounter::new();
        let hb = build_heartbeat(&refs);
        assert_eq!(hb.topic, "phoenix");
        assert_eq!(hb.event, "heartbeat");
        assert!(hb.join_ref.is_none());
    }

    #[test]
    fn broadcast_envelope() {
        let refs = RefCounter::new();
        let msg = build_broadcast("realtime:room", "cursor", json!({"x": 1}), "1", &refs);
        assert_eq!(msg.event, "broadcast");
        assert_eq!(msg.payload["type"], "broadcast");
        assert_eq!(msg.payload["event"], "cursor");
        assert_eq!(msg.payload["payload"]["x"], 1);
        assert_eq!(msg.join_ref.as_deref(), Some("1"));
    }

    #[test]
    fn leave_carries_join_ref() {
        let refs = RefCounter::new();
        let msg = build_leave("realtime:room", "7", &refs);
        assert_eq!(msg.event, "phx_leave");
        assert_eq!(msg.join_ref.as_deref(), Some("7"));
    }
}
