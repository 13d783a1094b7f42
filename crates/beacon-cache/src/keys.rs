//! Cache key builders for all Beacon cache entries.
//!
//! Centralising key construction prevents typos and makes it easy
//! to find every key the application uses.

use beacon_core::types::UserId;

/// Prefix applied to all Beacon cache keys.
const PREFIX: &str = "beacon";

// ── Presence keys ──────────────────────────────────────────

/// Cache key for user presence state.
pub fn presence(user_id: UserId) -> String {
    format!("{PREFIX}:presence:{user_id}")
}

/// Cache key for the set of all online users.
pub fn online_users() -> String {
    format!("{PREFIX}:presence:online")
}
