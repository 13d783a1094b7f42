//! Stored offline-queue entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beacon_core::types::{EventId, MessageId, UserId};

use crate::payload::Payload;

/// Delivery status of a queued message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    /// Waiting for the recipient to fetch and acknowledge it.
    Pending,
    /// Acknowledged without removal. Terminal.
    Delivered,
}

impl MessageStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Delivered => "delivered",
        }
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = beacon_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "delivered" => Ok(Self::Delivered),
            _ => Err(beacon_core::AppError::validation(format!(
                "Invalid message status: '{s}'"
            ))),
        }
    }
}

/// One stored copy of a published event.
///
/// A channel publish produces one copy per subscriber, all sharing
/// `event_id`. Broadcast records carry no `user_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuedMessage {
    /// Unique ID of this stored copy.
    pub id: MessageId,
    /// ID shared by every copy of the same publish.
    pub event_id: EventId,
    /// Channel the event was published on.
    pub channel: String,
    /// Application event name.
    pub event_name: String,
    /// Event payload.
    pub data: Payload,
    /// Addressee of this copy.
    pub user_id: Option<UserId>,
    /// Sender of a direct message.
    pub from_user_id: Option<UserId>,
    /// Delivery status.
    pub status: MessageStatus,
    /// When the copy was written.
    pub created_at: DateTime<Utc>,
}

impl QueuedMessage {
    /// Build a pending copy of `event_id` addressed to `user_id`.
    pub fn pending(
        event_id: EventId,
        channel: impl Into<String>,
        event_name: impl Into<String>,
        data: Payload,
        user_id: Option<UserId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MessageId::new(),
            event_id,
            channel: channel.into(),
            event_name: event_name.into(),
            data,
            user_id,
            from_user_id: None,
            status: MessageStatus::Pending,
            created_at,
        }
    }

    /// Whether the copy still awaits acknowledgement.
    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}
