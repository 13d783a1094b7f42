//! # beacon-database
//!
//! PostgreSQL connection management and the sqlx implementations of the
//! realtime store and activity-log contracts.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use repositories::postgres_stores;
