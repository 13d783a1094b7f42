//! Live push message definition.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use beacon_core::types::EventId;
use beacon_entity::payload::Payload;

/// Message type of a channel publish push.
pub const CHANNEL_EVENT: &str = "realtime.publish";

/// Message type of a global broadcast push.
pub const BROADCAST_EVENT: &str = "realtime.broadcast";

/// A best-effort push handed to the live broadcast hub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveMessage {
    /// Message type.
    #[serde(rename = "type")]
    pub message_type: String,
    /// Target channel, absent for global broadcasts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Message body.
    pub data: Value,
    /// When the message was built.
    pub timestamp: DateTime<Utc>,
}

impl LiveMessage {
    /// Push for an event published on `channel`.
    pub fn channel_event(
        event_id: EventId,
        channel: &str,
        event_name: &str,
        data: &Payload,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message_type: CHANNEL_EVENT.to_string(),
            channel: Some(channel.to_string()),
            data: json!({
                "event_id": event_id,
                "event": event_name,
                "data": data.body,
            }),
            timestamp,
        }
    }

    /// Push for a global broadcast.
    pub fn broadcast(
        event_id: EventId,
        event_name: &str,
        data: &Payload,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            message_type: BROADCAST_EVENT.to_string(),
            channel: None,
            data: json!({
                "event_id": event_id,
                "event": event_name,
                "data": data.body,
            }),
            timestamp,
        }
    }
}
