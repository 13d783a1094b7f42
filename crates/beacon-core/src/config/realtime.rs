//! Presence and event delivery configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Presence tracking, offline queue and live push settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// TTL of a cached per-user presence record, in seconds.
    #[serde(default = "default_presence_ttl")]
    pub presence_cache_ttl_seconds: u64,
    /// TTL of the cached online-users list, in seconds.
    #[serde(default = "default_online_users_ttl")]
    pub online_users_cache_ttl_seconds: u64,
    /// Number of pending messages returned on reconnection.
    #[serde(default = "default_page_size")]
    pub reconnection_page_size: usize,
    /// Default page size for pending-event listings.
    #[serde(default = "default_page_size")]
    pub pending_default_limit: usize,
    /// Upper bound of messages read (and removed) when clearing a queue.
    #[serde(default = "default_clear_queue_bound")]
    pub clear_queue_bound: usize,
    /// Page size used while sweeping stale presences.
    #[serde(default = "default_page_size")]
    pub stale_sweep_page_size: usize,
    /// Number of status changes retained per user.
    #[serde(default = "default_history_limit")]
    pub presence_history_limit: usize,
    /// Upper bound on a single best-effort live push, in milliseconds.
    #[serde(default = "default_live_push_timeout")]
    pub live_push_timeout_ms: u64,
    /// Upper bound on recording logout activity, in milliseconds.
    #[serde(default = "default_activity_log_timeout")]
    pub activity_log_timeout_ms: u64,
    /// Live broadcast hub: `"none"`, `"memory"` or `"redis"`.
    #[serde(default = "default_hub")]
    pub hub: String,
    /// Buffer size of in-memory hub channels.
    #[serde(default = "default_hub_buffer")]
    pub hub_buffer_size: usize,
    /// Redis URL used by the redis hub.
    #[serde(default = "default_hub_redis_url")]
    pub hub_redis_url: String,
}

impl RealtimeConfig {
    /// Presence cache TTL as a [`Duration`].
    pub fn presence_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.presence_cache_ttl_seconds)
    }

    /// Online-users cache TTL as a [`Duration`].
    pub fn online_users_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.online_users_cache_ttl_seconds)
    }

    /// Activity log bound as a [`Duration`].
    pub fn activity_log_timeout(&self) -> Duration {
        Duration::from_millis(self.activity_log_timeout_ms)
    }

    /// Live push bound as a [`Duration`].
    pub fn live_push_timeout(&self) -> Duration {
        Duration::from_millis(self.live_push_timeout_ms)
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            presence_cache_ttl_seconds: default_presence_ttl(),
            online_users_cache_ttl_seconds: default_online_users_ttl(),
            reconnection_page_size: default_page_size(),
            pending_default_limit: default_page_size(),
            clear_queue_bound: default_clear_queue_bound(),
            stale_sweep_page_size: default_page_size(),
            presence_history_limit: default_history_limit(),
            live_push_timeout_ms: default_live_push_timeout(),
            activity_log_timeout_ms: default_activity_log_timeout(),
            hub: default_hub(),
            hub_buffer_size: default_hub_buffer(),
            hub_redis_url: default_hub_redis_url(),
        }
    }
}

fn default_presence_ttl() -> u64 {
    300
}

fn default_online_users_ttl() -> u64 {
    60
}

fn default_page_size() -> usize {
    100
}

fn default_clear_queue_bound() -> usize {
    10_000
}

fn default_history_limit() -> usize {
    50
}

fn default_live_push_timeout() -> u64 {
    250
}

fn default_activity_log_timeout() -> u64 {
    1_000
}

fn default_hub() -> String {
    "none".to_string()
}

fn default_hub_buffer() -> usize {
    256
}

fn default_hub_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
