//! In-memory live hub for single-node deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::broadcast;

use beacon_core::result::AppResult;

use crate::message::types::LiveMessage;

use super::hub::LiveBroadcastHub;

/// In-memory hub backed by tokio broadcast channels.
///
/// Pushes to a channel nobody listens on are dropped, and so is the
/// channel's sender once its last listener has gone.
#[derive(Debug)]
pub struct MemoryBroadcastHub {
    /// Channel name → broadcast sender
    channels: RwLock<HashMap<String, broadcast::Sender<LiveMessage>>>,
    /// Sender for global broadcasts
    global: broadcast::Sender<LiveMessage>,
    /// Buffer size for channels
    buffer_size: usize,
}

impl MemoryBroadcastHub {
    /// Create a new in-memory hub
    pub fn new(buffer_size: usize) -> Self {
        let buffer_size = buffer_size.max(1);
        Self {
            channels: RwLock::new(HashMap::new()),
            global: broadcast::channel(buffer_size).0,
            buffer_size,
        }
    }

    /// Listen on a channel
    pub async fn subscribe(&self, channel: &str) -> broadcast::Receiver<LiveMessage> {
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(channel.to_string())
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        tx.subscribe()
    }

    /// Number of channels that currently hold a sender
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Listen for global broadcasts
    pub fn subscribe_all(&self) -> broadcast::Receiver<LiveMessage> {
        self.global.subscribe()
    }
}

#[async_trait]
impl LiveBroadcastHub for MemoryBroadcastHub {
    async fn broadcast(&self, message: LiveMessage) -> AppResult<()> {
        let _ = self.global.send(message);
        Ok(())
    }

    async fn broadcast_to_channel(&self, channel: &str, message: LiveMessage) -> AppResult<()> {
        {
            let channels = self.channels.read().await;
            match channels.get(channel) {
                None => return Ok(()),
                Some(tx) if tx.receiver_count() > 0 => {
                    let _ = tx.send(message);
                    return Ok(());
                }
                Some(_) => {}
            }
        }

        // Every listener is gone; drop the sender unless someone re-subscribed.
        let mut channels = self.channels.write().await;
        if channels
            .get(channel)
            .is_some_and(|tx| tx.receiver_count() == 0)
        {
            channels.remove(channel);
        }
        Ok(())
    }
}
