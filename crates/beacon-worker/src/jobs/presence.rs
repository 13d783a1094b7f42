//! Stale presence sweep: sets users without a recent heartbeat offline.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing;

use beacon_core::deadline::with_deadline;
use beacon_core::result::AppResult;
use beacon_realtime::presence::PresenceManager;

/// Outcome of one sweep run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SweepReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// Window after which a silent user counts as stale.
    pub stale_after_minutes: i64,
    /// Users set offline.
    pub set_offline: u64,
    /// Whether the run was skipped because a previous one was still going.
    pub skipped: bool,
}

/// Runs [`PresenceManager::cleanup_stale_presences`] on a schedule.
///
/// Overlapping runs are skipped rather than stacked.
#[derive(Debug)]
pub struct StalePresenceSweep {
    presence: Arc<PresenceManager>,
    stale_after_minutes: i64,
    timeout: Duration,
    running: Mutex<()>,
}

impl StalePresenceSweep {
    /// Create a sweep over `presence`. A run taking longer than `timeout`
    /// is abandoned with a timeout error; users already set offline stay
    /// offline.
    pub fn new(
        presence: Arc<PresenceManager>,
        stale_after_minutes: i64,
        timeout: Duration,
    ) -> Self {
        Self {
            presence,
            stale_after_minutes,
            timeout,
            running: Mutex::new(()),
        }
    }

    /// Job name used in logs.
    pub fn job_type(&self) -> &str {
        "stale_presence_sweep"
    }

    /// Run one sweep.
    pub async fn execute(&self) -> AppResult<SweepReport> {
        let started_at = Utc::now();

        let Ok(_guard) = self.running.try_lock() else {
            tracing::debug!("Previous stale presence sweep still running, skipping");
            return Ok(SweepReport {
                started_at,
                stale_after_minutes: self.stale_after_minutes,
                set_offline: 0,
                skipped: true,
            });
        };

        tracing::debug!(
            stale_after_minutes = self.stale_after_minutes,
            "Running stale presence sweep"
        );
        let set_offline = with_deadline(
            self.timeout,
            self.job_type(),
            self.presence.cleanup_stale_presences(self.stale_after_minutes),
        )
        .await?;

        if set_offline > 0 {
            tracing::info!(
                set_offline,
                stale_after_minutes = self.stale_after_minutes,
                "Stale presence sweep: users set offline"
            );
        }

        Ok(SweepReport {
            started_at,
            stale_after_minutes: self.stale_after_minutes,
            set_offline,
            skipped: false,
        })
    }
}
