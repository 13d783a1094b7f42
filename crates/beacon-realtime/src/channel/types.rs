//! Channel name rules and channel summaries.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::types::UserId;

/// Maximum channel name length in bytes.
pub const MAX_CHANNEL_NAME_LEN: usize = 255;

/// Check that `channel` is usable as a channel name.
pub fn validate_channel_name(channel: &str) -> AppResult<()> {
    if channel.is_empty() {
        return Err(AppError::validation("Channel name must not be empty"));
    }
    if channel.len() > MAX_CHANNEL_NAME_LEN {
        return Err(AppError::validation(format!(
            "Channel name exceeds {MAX_CHANNEL_NAME_LEN} bytes"
        )));
    }
    if channel.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(AppError::validation(format!(
            "Channel name '{}' contains whitespace or control characters",
            channel.escape_debug()
        )));
    }
    Ok(())
}

/// Subscribers of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelInfo {
    /// Channel name.
    pub channel: String,
    /// Subscribed users.
    pub members: BTreeSet<UserId>,
}

impl ChannelInfo {
    /// Number of subscribers.
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}
