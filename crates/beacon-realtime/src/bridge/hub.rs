//! Live broadcast hub contract and selection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;

use crate::message::types::LiveMessage;

use super::memory_hub::MemoryBroadcastHub;

/// Pushes messages to currently connected transport sessions.
///
/// Delivery is best effort. Persisted delivery never depends on a hub.
#[async_trait]
pub trait LiveBroadcastHub: Send + Sync + std::fmt::Debug + 'static {
    /// Push to every connected session.
    async fn broadcast(&self, message: LiveMessage) -> AppResult<()>;

    /// Push to sessions listening on `channel`.
    async fn broadcast_to_channel(&self, channel: &str, message: LiveMessage) -> AppResult<()>;
}

/// Hub used when no live transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullHub;

#[async_trait]
impl LiveBroadcastHub for NullHub {
    async fn broadcast(&self, _message: LiveMessage) -> AppResult<()> {
        Ok(())
    }

    async fn broadcast_to_channel(&self, _channel: &str, _message: LiveMessage) -> AppResult<()> {
        Ok(())
    }
}

/// Build the hub named by `config.hub`.
pub async fn hub_from_config(config: &RealtimeConfig) -> AppResult<Arc<dyn LiveBroadcastHub>> {
    match config.hub.as_str() {
        "none" => Ok(Arc::new(NullHub)),
        "memory" => {
            info!("Initializing in-memory live broadcast hub");
            Ok(Arc::new(MemoryBroadcastHub::new(config.hub_buffer_size)))
        }
        #[cfg(feature = "redis-hub")]
        "redis" => {
            info!("Initializing Redis live broadcast hub");
            let hub = super::redis_hub::RedisBroadcastHub::connect(
                &config.hub_redis_url,
                super::redis_hub::DEFAULT_PREFIX,
            )
            .await?;
            Ok(Arc::new(hub))
        }
        other => Err(AppError::configuration(format!(
            "Unknown live hub: '{other}'. Supported: none, memory, redis"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::error::ErrorKind;

    #[tokio::test]
    async fn test_default_hub_is_null() {
        let hub = hub_from_config(&RealtimeConfig::default()).await.unwrap();
        let msg = LiveMessage {
            message_type: "test".into(),
            channel: None,
            data: serde_json::Value::Null,
            timestamp: chrono::Utc::now(),
        };
        assert!(hub.broadcast(msg).await.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_hub_rejected() {
        let config = RealtimeConfig {
            hub: "carrier-pigeon".into(),
            ..RealtimeConfig::default()
        };
        let err = hub_from_config(&config).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
