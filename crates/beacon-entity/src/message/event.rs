//! Ephemeral presence-change notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beacon_core::types::UserId;

use crate::presence::PresenceStatus;

/// Event type tag of [`PresenceChangedEvent`].
pub const PRESENCE_CHANGED: &str = "presence.changed";

/// Emitted when a user's presence status actually changes. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChangedEvent {
    /// Always [`PRESENCE_CHANGED`].
    #[serde(rename = "type")]
    pub event_type: String,
    /// `presence:<user_id>`.
    pub channel: String,
    /// User whose status changed.
    pub user_id: UserId,
    /// Previous status.
    pub old_status: PresenceStatus,
    /// New status.
    pub new_status: PresenceStatus,
    /// When the change was written.
    pub timestamp: DateTime<Utc>,
}

impl PresenceChangedEvent {
    /// Build the event for a transition of `user_id`.
    pub fn new(
        user_id: UserId,
        old_status: PresenceStatus,
        new_status: PresenceStatus,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            event_type: PRESENCE_CHANGED.to_string(),
            channel: Self::channel_for(user_id),
            user_id,
            old_status,
            new_status,
            timestamp,
        }
    }

    /// Per-user presence channel name.
    pub fn channel_for(user_id: UserId) -> String {
        format!("presence:{user_id}")
    }
}
