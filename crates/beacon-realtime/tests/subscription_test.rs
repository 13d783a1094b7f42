//! Integration tests for the subscription registry.

mod helpers;

use beacon_core::error::ErrorKind;
use beacon_core::types::UserId;
use beacon_entity::message::PRESENCE_CHANNEL;

#[tokio::test]
async fn test_subscribe_is_idempotent() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let registry = &app.engine.subscriptions;

    registry.subscribe(user, "news").await.unwrap();
    registry.subscribe(user, "news").await.unwrap();

    assert_eq!(registry.list_subscribers("news").await.unwrap().len(), 1);
    assert_eq!(registry.list_subscriptions(user).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_subscribe_many_stops_at_first_error() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let registry = &app.engine.subscriptions;

    let err = registry
        .subscribe_many(user, &["alpha", "broken-1", "gamma"])
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    let channels = registry.list_subscriptions(user).await.unwrap();
    assert!(channels.contains("alpha"));
    assert!(!channels.contains("gamma"));
}

#[tokio::test]
async fn test_unsubscribe_all() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let other = UserId::new();
    let registry = &app.engine.subscriptions;

    registry
        .subscribe_many(user, &["a".to_string(), "b".to_string(), "c".to_string()])
        .await
        .unwrap();
    registry.subscribe(other, "a").await.unwrap();

    assert_eq!(registry.unsubscribe_all(user).await.unwrap(), 3);
    assert!(registry.list_subscriptions(user).await.unwrap().is_empty());
    assert!(registry.list_subscribers("a").await.unwrap().contains(&other));
}

#[tokio::test]
async fn test_unsubscribe_missing_is_noop() {
    let app = helpers::TestEngine::new();
    app.engine
        .subscriptions
        .unsubscribe(UserId::new(), "nowhere")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_presence_channel_and_info() {
    let app = helpers::TestEngine::new();
    let (a, b) = (UserId::new(), UserId::new());
    let registry = &app.engine.subscriptions;

    registry.subscribe_to_presence(a).await.unwrap();
    registry.subscribe_to_presence(b).await.unwrap();
    registry.unsubscribe_from_presence(b).await.unwrap();

    let info = registry.channel_info(PRESENCE_CHANNEL).await.unwrap();
    assert_eq!(info.channel, "presence");
    assert_eq!(info.member_count(), 1);
    assert!(info.members.contains(&a));
}

#[tokio::test]
async fn test_invalid_channel_rejected() {
    let app = helpers::TestEngine::new();
    let err = app
        .engine
        .subscriptions
        .subscribe(UserId::new(), "has space")
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}
