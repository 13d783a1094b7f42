//! User activity repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_realtime::activity::ActivityLog;

/// Repository for the user activity log.
#[derive(Debug, Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    /// Create a new activity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityLog for ActivityRepository {
    async fn log_activity(
        &self,
        user_id: UserId,
        action: &str,
        at: DateTime<Utc>,
    ) -> AppResult<()> {
        sqlx::query("INSERT INTO user_activities (user_id, action, occurred_at) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(action)
            .bind(at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to log activity", e))?;
        Ok(())
    }
}
