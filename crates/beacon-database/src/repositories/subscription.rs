//! Subscription repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use beacon_core::error::{AppError, ErrorKind};
use beacon_core::result::AppResult;
use beacon_core::types::UserId;
use beacon_entity::subscription::Subscription;
use beacon_realtime::store::SubscriptionStore;

/// Repository for channel subscription edges.
#[derive(Debug, Clone)]
pub struct SubscriptionRepository {
    pool: PgPool,
}

impl SubscriptionRepository {
    /// Create a new subscription repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for SubscriptionRepository {
    async fn create_subscription(&self, subscription: &Subscription) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO realtime_subscriptions (user_id, channel, created_at) \
             VALUES ($1, $2, $3) ON CONFLICT (user_id, channel) DO NOTHING",
        )
        .bind(subscription.user_id)
        .bind(&subscription.channel)
        .bind(subscription.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create subscription", e))?;
        Ok(())
    }

    async fn remove_subscription(&self, user_id: UserId, channel: &str) -> AppResult<bool> {
        let result =
            sqlx::query("DELETE FROM realtime_subscriptions WHERE user_id = $1 AND channel = $2")
                .bind(user_id)
                .bind(channel)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to remove subscription", e)
                })?;
        Ok(result.rows_affected() > 0)
    }

    async fn user_subscriptions(&self, user_id: UserId) -> AppResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT channel FROM realtime_subscriptions WHERE user_id = $1 ORDER BY channel",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subscriptions", e))
    }

    async fn channel_subscribers(&self, channel: &str) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT user_id FROM realtime_subscriptions WHERE channel = $1 ORDER BY user_id",
        )
        .bind(channel)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list subscribers", e))
    }
}
