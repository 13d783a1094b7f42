//! CLI command definitions and dispatch.

pub mod channel;
pub mod migrate;
pub mod presence;
pub mod queue;
pub mod sweep;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use beacon_cache::CacheManager;
use beacon_core::config::AppConfig;
use beacon_core::deadline::with_deadline;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_database::DatabasePool;
use beacon_database::repositories::{ActivityRepository, postgres_stores};
use beacon_entity::payload::Payload;
use beacon_realtime::RealtimeEngine;
use beacon_realtime::bridge::hub_from_config;

use crate::output::OutputFormat;

/// Beacon: presence tracking and store-and-forward event delivery
#[derive(Debug, Parser)]
#[command(name = "beacon", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Abort the command after this many seconds
    #[arg(long, default_value = "30")]
    pub timeout: u64,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// User presence
    Presence(presence::PresenceArgs),
    /// Channel subscriptions and publishing
    Channel(channel::ChannelArgs),
    /// Offline message queue
    Queue(queue::QueueArgs),
    /// Set stale users offline once
    Sweep(sweep::SweepArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> AppResult<()> {
        let run = async {
            match &self.command {
                Commands::Presence(args) => {
                    presence::execute(args, &self.config, self.format).await
                }
                Commands::Channel(args) => channel::execute(args, &self.config, self.format).await,
                Commands::Queue(args) => queue::execute(args, &self.config, self.format).await,
                Commands::Sweep(args) => sweep::execute(args, &self.config, self.format).await,
                Commands::Migrate(args) => migrate::execute(args, &self.config).await,
            }
        };
        with_deadline(Duration::from_secs(self.timeout), self.command.name(), run).await
    }
}

impl Commands {
    /// Command name used in timeout errors
    fn name(&self) -> &'static str {
        match self {
            Self::Presence(_) => "presence command",
            Self::Channel(_) => "channel command",
            Self::Queue(_) => "queue command",
            Self::Sweep(_) => "sweep command",
            Self::Migrate(_) => "migrate command",
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> AppResult<AppConfig> {
    AppConfig::load_from(config_path)
}

/// Helper: wire a realtime engine over PostgreSQL and the configured cache
pub async fn build_engine(config: &AppConfig) -> AppResult<RealtimeEngine> {
    let db = DatabasePool::connect(&config.database).await?;
    let pool = db.pool().clone();
    let cache = CacheManager::new(&config.cache).await?;
    let hub = hub_from_config(&config.realtime).await?;

    Ok(RealtimeEngine::builder(
        postgres_stores(&pool),
        Arc::new(cache),
        config.realtime.clone(),
    )
    .with_hub(hub)
    .with_activity_log(Arc::new(ActivityRepository::new(pool)))
    .build())
}

/// Helper: parse an optional JSON argument into a payload
pub fn parse_payload(raw: Option<&str>) -> AppResult<Payload> {
    match raw {
        None => Ok(Payload::empty()),
        Some(text) => serde_json::from_str::<serde_json::Value>(text)
            .map(Payload::new)
            .map_err(|e| AppError::validation(format!("Invalid JSON payload: {e}"))),
    }
}
