//! Database migration commands.

use clap::{Args, Subcommand};

use beacon_core::result::AppResult;
use beacon_database::DatabasePool;

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Run all pending migrations
    Run,
    /// Check database connectivity
    Check,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config_path: &str) -> AppResult<()> {
    let config = super::load_config(config_path)?;
    let db = DatabasePool::connect(&config.database).await?;

    match &args.command {
        MigrateCommand::Run => {
            println!("Running database migrations...");
            beacon_database::migration::run_migrations(db.pool())
                .await
                .map_err(|e| e.context("migration failed"))?;
            output::print_success("All migrations applied.");
        }
        MigrateCommand::Check => {
            let healthy = db.health_check().await?;
            output::print_kv("Database reachable", &healthy.to_string());
        }
    }

    db.close().await;
    Ok(())
}
