//! Beacon server: presence tracking and store-and-forward event delivery.
//!
//! Main entry point that wires all crates together and runs the background
//! scheduler until shutdown.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, fmt};

use beacon_cache::CacheManager;
use beacon_core::config::AppConfig;
use beacon_core::error::AppError;
use beacon_database::DatabasePool;
use beacon_database::repositories::{ActivityRepository, postgres_stores};
use beacon_realtime::RealtimeEngine;
use beacon_realtime::bridge::{BroadcastDispatcher, hub_from_config};
use beacon_worker::{CronScheduler, StalePresenceSweep};

#[tokio::main]
async fn main() {
    let env = std::env::var("BEACON_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);
    tracing::info!(env = %env, "Configuration loaded");

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting Beacon v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Database connection + migrations ─────────────────
    let db = DatabasePool::connect(&config.database).await?;
    beacon_database::migration::run_migrations(db.pool())
        .await
        .map_err(|e| e.context("Migration failed"))?;
    tracing::info!("Database migrations complete");

    // ── Step 2: Cache ────────────────────────────────────────────
    tracing::info!(provider = %config.cache.provider, "Initializing cache");
    let cache = Arc::new(CacheManager::new(&config.cache).await?);

    // ── Step 3: Live hub + presence event fan-out ────────────────
    let hub = hub_from_config(&config.realtime).await?;
    let dispatcher = Arc::new(BroadcastDispatcher::new(config.realtime.hub_buffer_size));
    let mut presence_events = dispatcher.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = presence_events.recv().await {
            tracing::debug!(
                user_id = %event.user_id,
                old_status = %event.old_status,
                new_status = %event.new_status,
                "Presence changed"
            );
        }
    });

    // ── Step 4: Realtime engine ──────────────────────────────────
    let engine = RealtimeEngine::builder(
        postgres_stores(db.pool()),
        cache,
        config.realtime.clone(),
    )
    .with_hub(hub)
    .with_dispatcher(dispatcher)
    .with_activity_log(Arc::new(ActivityRepository::new(db.pool().clone())))
    .build();

    let stats = engine.presence.stats().await?;
    tracing::info!(online_users = stats.online_users, "Realtime engine ready");

    // ── Step 5: Background scheduler ─────────────────────────────
    let shutdown = CancellationToken::new();
    let worker = if config.worker.enabled {
        let scheduler = CronScheduler::new().await?;
        let sweep = Arc::new(StalePresenceSweep::new(
            Arc::clone(&engine.presence),
            config.worker.stale_after_minutes,
            config.worker.sweep_timeout(),
        ));
        scheduler
            .register_stale_presence_sweep(sweep, &config.worker.stale_sweep_cron)
            .await?;
        Some(tokio::spawn(scheduler.run_until(shutdown.clone())))
    } else {
        tracing::info!("Background worker disabled");
        None
    };

    // ── Step 6: Wait for shutdown ────────────────────────────────
    shutdown_signal().await;
    tracing::info!("Shutdown signal received");
    shutdown.cancel();

    if let Some(handle) = worker {
        match handle.await {
            Ok(result) => result?,
            Err(e) => tracing::warn!(error = %e, "Scheduler task ended abnormally"),
        }
    }

    db.close().await;
    tracing::info!("Beacon stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => tracing::error!("Failed to install SIGTERM handler: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
