//! Redis pub/sub hub for multi-node deployments.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::debug;

use beacon_core::error::AppError;
use beacon_core::result::AppResult;

use crate::message::types::LiveMessage;

use super::hub::LiveBroadcastHub;

/// Prefix of every Redis pub/sub channel the hub publishes to.
pub const DEFAULT_PREFIX: &str = "beacon:live:";

/// Publishes live messages as JSON on Redis pub/sub channels.
///
/// Channel pushes go to `<prefix>channel:<name>`, global pushes to
/// `<prefix>broadcast`.
#[derive(Clone)]
pub struct RedisBroadcastHub {
    conn: ConnectionManager,
    prefix: String,
}

impl std::fmt::Debug for RedisBroadcastHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisBroadcastHub")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

impl RedisBroadcastHub {
    /// Connect to Redis.
    pub async fn connect(url: &str, prefix: &str) -> AppResult<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| AppError::configuration(format!("Invalid Redis URL: {e}")))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| AppError::external(format!("Redis connection failed: {e}")))?;
        Ok(Self {
            conn,
            prefix: prefix.to_string(),
        })
    }

    /// Pub/sub channel a channel push is published on.
    pub fn channel_topic(&self, channel: &str) -> String {
        format!("{}channel:{channel}", self.prefix)
    }

    /// Pub/sub channel global pushes are published on.
    pub fn broadcast_topic(&self) -> String {
        format!("{}broadcast", self.prefix)
    }

    async fn publish(&self, topic: &str, message: &LiveMessage) -> AppResult<()> {
        let payload = serde_json::to_string(message)?;
        let mut conn = self.conn.clone();
        let receivers = redis::cmd("PUBLISH")
            .arg(topic)
            .arg(payload)
            .query_async::<i64>(&mut conn)
            .await
            .map_err(|e| AppError::external(format!("Redis PUBLISH failed: {e}")))?;
        debug!(topic, receivers, "Published live message");
        Ok(())
    }
}

#[async_trait]
impl LiveBroadcastHub for RedisBroadcastHub {
    async fn broadcast(&self, message: LiveMessage) -> AppResult<()> {
        let topic = self.broadcast_topic();
        self.publish(&topic, &message).await
    }

    async fn broadcast_to_channel(&self, channel: &str, message: LiveMessage) -> AppResult<()> {
        let topic = self.channel_topic(channel);
        self.publish(&topic, &message).await
    }
}
