//! Presence repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_entity::payload::Payload;
use beacon_entity::presence::{Presence, PresenceChange, PresenceStatus};
use beacon_realtime::store::PresenceStore;

use super::{column_version, sql_limit, stored_version};

/// Row of `user_presences`.
#[derive(Debug, sqlx::FromRow)]
struct PresenceRow {
    user_id: UserId,
    status: String,
    last_seen_at: DateTime<Utc>,
    metadata: serde_json::Value,
    metadata_version: i16,
}

impl TryFrom<PresenceRow> for Presence {
    type Error = AppError;

    fn try_from(row: PresenceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            status: row.status.parse()?,
            last_seen_at: row.last_seen_at,
            metadata: Payload {
                schema_version: stored_version("metadata", row.metadata_version)?,
                body: row.metadata,
            },
        })
    }
}

/// Row of `presence_history`.
#[derive(Debug, sqlx::FromRow)]
struct HistoryRow {
    user_id: UserId,
    old_status: String,
    new_status: String,
    changed_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for PresenceChange {
    type Error = AppError;

    fn try_from(row: HistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: row.user_id,
            old_status: row.old_status.parse::<PresenceStatus>()?,
            new_status: row.new_status.parse::<PresenceStatus>()?,
            changed_at: row.changed_at,
        })
    }
}

/// Repository for presence records and their history.
#[derive(Debug, Clone)]
pub struct PresenceRepository {
    pool: PgPool,
}

impl PresenceRepository {
    /// Create a new presence repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PresenceStore for PresenceRepository {
    async fn upsert_presence(&self, presence: &Presence) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO user_presences (user_id, status, last_seen_at, metadata, metadata_version, updated_at) \
             VALUES ($1, $2, $3, $4, $5, NOW()) \
             ON CONFLICT (user_id) DO UPDATE SET \
             status = EXCLUDED.status, last_seen_at = EXCLUDED.last_seen_at, \
             metadata = EXCLUDED.metadata, metadata_version = EXCLUDED.metadata_version, \
             updated_at = NOW()",
        )
        .bind(presence.user_id)
        .bind(presence.status.as_str())
        .bind(presence.last_seen_at)
        .bind(&presence.metadata.body)
        .bind(column_version("metadata", presence.metadata.schema_version)?)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to upsert presence", e))?;
        Ok(())
    }

    async fn find_presence(&self, user_id: UserId) -> AppResult<Option<Presence>> {
        let row = sqlx::query_as::<_, PresenceRow>(
            "SELECT user_id, status, last_seen_at, metadata, metadata_version \
             FROM user_presences WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find presence", e))?;

        row.map(Presence::try_from).transpose()
    }

    async fn online_users(&self) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_presences WHERE status <> 'offline' ORDER BY user_id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list online users", e))
    }

    async fn stale_presences(
        &self,
        cutoff: DateTime<Utc>,
        after: Option<UserId>,
        limit: usize,
    ) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM user_presences \
             WHERE status <> 'offline' AND last_seen_at < $1 \
             AND ($2::uuid IS NULL OR user_id > $2) \
             ORDER BY user_id LIMIT $3",
        )
        .bind(cutoff)
        .bind(after)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list stale presences", e)
        })
    }

    async fn append_history(&self, change: &PresenceChange, keep: usize) -> AppResult<()> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        sqlx::query(
            "INSERT INTO presence_history (user_id, old_status, new_status, changed_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(change.user_id)
        .bind(change.old_status.as_str())
        .bind(change.new_status.as_str())
        .bind(change.changed_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to insert presence history", e)
        })?;

        sqlx::query(
            "DELETE FROM presence_history WHERE user_id = $1 AND id NOT IN \
             (SELECT id FROM presence_history WHERE user_id = $1 ORDER BY id DESC LIMIT $2)",
        )
        .bind(change.user_id)
        .bind(sql_limit(keep))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to trim presence history", e)
        })?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit presence history", e)
        })
    }

    async fn presence_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<PresenceChange>> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            "SELECT user_id, old_status, new_status, changed_at FROM presence_history \
             WHERE user_id = $1 ORDER BY id DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load presence history", e)
        })?;

        rows.into_iter().map(PresenceChange::try_from).collect()
    }
}
