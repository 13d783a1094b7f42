//! One-off stale presence sweep.

use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use beacon_core::result::AppResult;
use beacon_worker::StalePresenceSweep;

use crate::output::{self, OutputFormat};

/// Arguments for the sweep command
#[derive(Debug, Args)]
pub struct SweepArgs {
    /// Minutes without a heartbeat before a user counts as stale
    /// (defaults to worker.stale_after_minutes)
    #[arg(short, long)]
    pub minutes: Option<i64>,
}

/// Sweep result row
#[derive(Debug, Serialize, Tabled)]
struct SweepRow {
    #[tabled(rename = "Stale after (min)")]
    stale_after_minutes: i64,
    #[tabled(rename = "Set offline")]
    set_offline: u64,
}

/// Execute the sweep command
pub async fn execute(args: &SweepArgs, config_path: &str, format: OutputFormat) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let engine = super::build_engine(&config).await?;
    let minutes = args.minutes.unwrap_or(config.worker.stale_after_minutes);

    let sweep = StalePresenceSweep::new(
        engine.presence.clone(),
        minutes,
        config.worker.sweep_timeout(),
    );
    let report = sweep.execute().await?;

    output::print_item(
        &SweepRow {
            stale_after_minutes: report.stale_after_minutes,
            set_offline: report.set_offline,
        },
        format,
    );
    Ok(())
}
