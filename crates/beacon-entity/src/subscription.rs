//! Channel subscription edge.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use beacon_core::types::UserId;

/// A user listening to a named channel. Unique per `(user_id, channel)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscribed user.
    pub user_id: UserId,
    /// Channel name.
    pub channel: String,
    /// When the edge was created.
    pub created_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a subscription edge stamped with the current time.
    pub fn new(user_id: UserId, channel: impl Into<String>) -> Self {
        Self {
            user_id,
            channel: channel.into(),
            created_at: Utc::now(),
        }
    }
}
