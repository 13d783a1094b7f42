//! Scheduled maintenance tasks for Beacon.
//!
//! This crate provides:
//! - A cron scheduler that runs until a cancellation token fires
//! - The stale-presence sweep that sets silent users offline

pub mod jobs;
pub mod scheduler;

pub use jobs::presence::{StalePresenceSweep, SweepReport};
pub use scheduler::CronScheduler;
