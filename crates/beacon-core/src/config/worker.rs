//! Background scheduler configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Scheduler settings for periodic maintenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the scheduler runs inside the server process.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the stale-presence sweep.
    #[serde(default = "default_stale_sweep_cron")]
    pub stale_sweep_cron: String,
    /// Users without a heartbeat for this many minutes are set offline.
    #[serde(default = "default_stale_after_minutes")]
    pub stale_after_minutes: i64,
    /// Upper bound on one sweep run, in seconds.
    #[serde(default = "default_sweep_timeout")]
    pub sweep_timeout_seconds: u64,
}

impl WorkerConfig {
    /// Sweep bound as a [`Duration`].
    pub fn sweep_timeout(&self) -> Duration {
        Duration::from_secs(self.sweep_timeout_seconds)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            stale_sweep_cron: default_stale_sweep_cron(),
            stale_after_minutes: default_stale_after_minutes(),
            sweep_timeout_seconds: default_sweep_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_stale_sweep_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_stale_after_minutes() -> i64 {
    30
}

fn default_sweep_timeout() -> u64 {
    300
}
