//! Offline message queue repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::types::{EventId, MessageId, UserId};
use beacon_entity::message::{MessageStatus, QueuedMessage};
use beacon_entity::payload::Payload;
use beacon_realtime::store::MessageQueueStore;

use super::{column_version, sql_limit, stored_version};

/// Row of `queued_messages`.
#[derive(Debug, sqlx::FromRow)]
struct MessageRow {
    id: MessageId,
    event_id: EventId,
    channel: String,
    event_name: String,
    data: serde_json::Value,
    data_version: i16,
    user_id: Option<UserId>,
    from_user_id: Option<UserId>,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<MessageRow> for QueuedMessage {
    type Error = AppError;

    fn try_from(row: MessageRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            event_id: row.event_id,
            channel: row.channel,
            event_name: row.event_name,
            data: Payload {
                schema_version: stored_version("data", row.data_version)?,
                body: row.data,
            },
            user_id: row.user_id,
            from_user_id: row.from_user_id,
            status: row.status.parse::<MessageStatus>()?,
            created_at: row.created_at,
        })
    }
}

/// Repository for queued message copies.
#[derive(Debug, Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageQueueStore for MessageRepository {
    async fn store_message(&self, message: &QueuedMessage) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO queued_messages \
             (id, event_id, channel, event_name, data, data_version, user_id, from_user_id, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(message.id)
        .bind(message.event_id)
        .bind(&message.channel)
        .bind(&message.event_name)
        .bind(&message.data.body)
        .bind(column_version("data", message.data.schema_version)?)
        .bind(message.user_id)
        .bind(message.from_user_id)
        .bind(message.status.as_str())
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to store message", e))?;
        Ok(())
    }

    async fn pending_messages(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<QueuedMessage>> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, event_id, channel, event_name, data, data_version, user_id, from_user_id, status, created_at \
             FROM queued_messages WHERE user_id = $1 AND status = 'pending' \
             ORDER BY created_at ASC, seq ASC LIMIT $2",
        )
        .bind(user_id)
        .bind(sql_limit(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to load pending messages", e)
        })?;

        rows.into_iter().map(QueuedMessage::try_from).collect()
    }

    async fn remove_message(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM queued_messages WHERE user_id = $1 AND event_id = $2")
                .bind(user_id)
                .bind(event_id)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove message", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_delivered(&self, user_id: UserId, event_id: EventId) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE queued_messages SET status = 'delivered' \
             WHERE user_id = $1 AND event_id = $2 AND status = 'pending'",
        )
        .bind(user_id)
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to mark message delivered", e)
        })?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_pending(&self, user_id: UserId) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM queued_messages WHERE user_id = $1 AND status = 'pending'",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to count pending messages", e)
        })?;
        Ok(count.max(0) as u64)
    }
}
