//! Presence record and history row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beacon_core::types::UserId;

use super::PresenceStatus;
use crate::payload::Payload;

/// The latest presence record of a user. One per user; last write wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presence {
    /// User ID.
    pub user_id: UserId,
    /// Current status.
    pub status: PresenceStatus,
    /// Last heartbeat or status write.
    pub last_seen_at: DateTime<Utc>,
    /// Opaque client metadata (device, location, ...).
    pub metadata: Payload,
}

impl Presence {
    /// Build a record stamped with the current time.
    pub fn new(user_id: UserId, status: PresenceStatus, metadata: Payload) -> Self {
        Self {
            user_id,
            status,
            last_seen_at: Utc::now(),
            metadata,
        }
    }

    /// The implicit record of a user that has never been seen.
    pub fn offline(user_id: UserId) -> Self {
        Self::new(user_id, PresenceStatus::Offline, Payload::empty())
    }
}

/// One recorded status transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceChange {
    /// User whose status changed.
    pub user_id: UserId,
    /// Status before the write.
    pub old_status: PresenceStatus,
    /// Status after the write.
    pub new_status: PresenceStatus,
    /// When the change was written.
    pub changed_at: DateTime<Utc>,
}
