//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing;

use beacon_core::error::AppError;
use beacon_core::result::AppResult;

use crate::jobs::presence::StalePresenceSweep;

/// Cron-based scheduler for periodic background tasks
pub struct CronScheduler {
    /// The underlying job scheduler
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler
    pub async fn new() -> AppResult<Self> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Stale presence sweep on `cron` (six fields, seconds first)
    pub async fn register_stale_presence_sweep(
        &self,
        sweep: Arc<StalePresenceSweep>,
        cron: &str,
    ) -> AppResult<()> {
        let job = CronJob::new_async(cron, move |_uuid, _lock| {
            let sweep = Arc::clone(&sweep);
            Box::pin(async move {
                match sweep.execute().await {
                    Ok(report) => tracing::debug!(
                        job = sweep.job_type(),
                        set_offline = report.set_offline,
                        skipped = report.skipped,
                        "Scheduled job finished"
                    ),
                    Err(e) => tracing::error!(
                        job = sweep.job_type(),
                        error = %e,
                        "Scheduled job failed"
                    ),
                }
            })
        })
        .map_err(|e| {
            AppError::configuration(format!(
                "Invalid stale_presence_sweep schedule '{cron}': {e}"
            ))
        })?;

        self.scheduler.add(job).await.map_err(|e| {
            AppError::internal(format!("Failed to add stale_presence_sweep schedule: {e}"))
        })?;

        tracing::info!(cron, "Registered: stale_presence_sweep");
        Ok(())
    }

    /// Start the scheduler
    pub async fn start(&self) -> AppResult<()> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Start the scheduler and keep it running until `shutdown` fires
    pub async fn run_until(self, shutdown: CancellationToken) -> AppResult<()> {
        self.start().await?;
        shutdown.cancelled().await;
        self.shutdown().await
    }

    /// Shutdown the scheduler
    pub async fn shutdown(&self) -> AppResult<()> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
