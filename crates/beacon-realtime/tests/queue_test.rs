//! Integration tests for the offline queue and reconnection replay.

mod helpers;

use serde_json::json;

use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::types::{EventId, UserId};
use beacon_entity::payload::Payload;

async fn publish_n(app: &helpers::TestEngine, channel: &str, n: usize) -> Vec<EventId> {
    let mut ids = Vec::with_capacity(n);
    for i in 0..n {
        let receipt = app
            .engine
            .publisher
            .publish_to_channel(channel, "tick", Payload::new(json!({ "n": i })))
            .await
            .unwrap();
        ids.push(receipt.event_id);
    }
    ids
}

#[tokio::test]
async fn test_reconnection_returns_backlog_in_order_without_consuming() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    let published = publish_n(&app, "feed", 3).await;

    let first = app.engine.reconnection.handle_reconnection(user).await.unwrap();
    let second = app.engine.reconnection.handle_reconnection(user).await.unwrap();

    let ids: Vec<EventId> = first.iter().map(|m| m.event_id).collect();
    assert_eq!(ids, published);
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_reconnection_is_bounded_by_page_size() {
    let config = RealtimeConfig {
        reconnection_page_size: 2,
        ..RealtimeConfig::default()
    };
    let app = helpers::TestEngine::with_config(config);
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    let published = publish_n(&app, "feed", 3).await;

    let backlog = app.engine.reconnection.handle_reconnection(user).await.unwrap();

    assert_eq!(backlog.len(), 2);
    assert_eq!(backlog[0].event_id, published[0]);
}

#[tokio::test]
async fn test_ack_removes_only_own_copy() {
    let app = helpers::TestEngine::new();
    let (a, b) = (UserId::new(), UserId::new());
    app.engine.subscriptions.subscribe(a, "feed").await.unwrap();
    app.engine.subscriptions.subscribe(b, "feed").await.unwrap();
    let published = publish_n(&app, "feed", 1).await;

    let removed = app
        .engine
        .queue
        .remove_event_from_queue(a, published[0])
        .await
        .unwrap();

    assert!(removed);
    assert!(app.engine.reconnection.handle_reconnection(a).await.unwrap().is_empty());
    assert_eq!(app.engine.reconnection.handle_reconnection(b).await.unwrap().len(), 1);
    assert!(
        !app.engine
            .queue
            .remove_event_from_queue(a, published[0])
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_clear_then_pending_is_empty() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    publish_n(&app, "feed", 4).await;

    let removed = app.engine.queue.clear_event_queue(user).await.unwrap();

    assert_eq!(removed, 4);
    assert!(app.engine.queue.get_pending_events(user, 100).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_clear_is_bounded() {
    let config = RealtimeConfig {
        clear_queue_bound: 2,
        ..RealtimeConfig::default()
    };
    let app = helpers::TestEngine::with_config(config);
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    publish_n(&app, "feed", 3).await;

    assert_eq!(app.engine.queue.clear_event_queue(user).await.unwrap(), 2);
    assert_eq!(app.engine.queue.pending_count(user).await.unwrap(), 1);
}

#[tokio::test]
async fn test_mark_delivered_leaves_pending_view() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    let published = publish_n(&app, "feed", 2).await;

    assert!(
        app.engine
            .queue
            .mark_delivered(user, published[0])
            .await
            .unwrap()
    );

    let pending = app.engine.queue.get_pending_events(user, 100).await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].event_id, published[1]);
    assert_eq!(app.store.inner.all_messages_for(user).len(), 2);
}

#[tokio::test]
async fn test_pending_respects_limit() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.engine.subscriptions.subscribe(user, "feed").await.unwrap();
    publish_n(&app, "feed", 3).await;

    assert_eq!(app.engine.queue.get_pending_events(user, 2).await.unwrap().len(), 2);
    assert!(app.engine.queue.get_pending_events(user, 0).await.unwrap().is_empty());
}
