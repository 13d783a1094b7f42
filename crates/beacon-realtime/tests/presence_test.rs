//! Integration tests for presence tracking.

mod helpers;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use chrono::{Duration, Utc};
use serde_json::json;

use beacon_cache::keys;
use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::error::ErrorKind;
use beacon_core::traits::cache::CacheProvider;
use beacon_core::types::UserId;
use beacon_entity::payload::Payload;
use beacon_entity::presence::{Presence, PresenceStatus};

fn device(name: &str) -> Payload {
    Payload::new(json!({ "device": name }))
}

fn stale_presence(user_id: UserId, status: PresenceStatus) -> Presence {
    Presence {
        user_id,
        status,
        last_seen_at: Utc::now() - Duration::hours(2),
        metadata: Payload::empty(),
    }
}

async fn status_of(app: &helpers::TestEngine, user: UserId) -> PresenceStatus {
    app.engine.presence.get_presence(user).await.unwrap().status
}

#[tokio::test]
async fn test_update_then_read_online() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();

    app.engine
        .presence
        .update_presence(user, PresenceStatus::Online, device("desktop"))
        .await
        .unwrap();

    let first = app.engine.presence.get_presence(user).await.unwrap();
    let cached = app.engine.presence.get_presence(user).await.unwrap();
    assert_eq!(first.status, PresenceStatus::Online);
    assert_eq!(cached.status, PresenceStatus::Online);
    assert_eq!(cached.metadata.get_str("device"), Some("desktop"));
}

#[tokio::test]
async fn test_unknown_user_reads_offline_and_is_not_cached() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();

    let presence = app.engine.presence.get_presence(user).await.unwrap();

    assert_eq!(presence.status, PresenceStatus::Offline);
    assert_eq!(presence.user_id, user);
    assert!(app.cache.get(&keys::presence(user)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_repeated_status_does_not_broadcast_twice() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();

    for _ in 0..2 {
        app.engine
            .presence
            .update_presence(user, PresenceStatus::Online, Payload::empty())
            .await
            .unwrap();
    }

    let events = app.dispatcher.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].old_status, PresenceStatus::Offline);
    assert_eq!(events[0].new_status, PresenceStatus::Online);
}

#[tokio::test]
async fn test_online_to_away_broadcasts_once_with_both_statuses() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    presence
        .update_presence(user, PresenceStatus::Away, Payload::empty())
        .await
        .unwrap();

    let transitions: Vec<_> = app
        .dispatcher
        .events()
        .into_iter()
        .filter(|e| e.old_status == PresenceStatus::Online)
        .collect();
    assert_eq!(transitions.len(), 1);
    assert_eq!(transitions[0].new_status, PresenceStatus::Away);
    assert_eq!(transitions[0].channel, format!("presence:{user}"));
    assert_eq!(transitions[0].event_type, "presence.changed");
}

#[tokio::test]
async fn test_write_invalidates_cached_presence() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    presence.get_presence(user).await.unwrap();
    presence
        .update_presence(user, PresenceStatus::Custom("in a meeting".into()), Payload::empty())
        .await
        .unwrap();

    let current = presence.get_presence(user).await.unwrap();
    assert_eq!(current.status.as_str(), "in a meeting");
}

#[tokio::test]
async fn test_set_offline_invalidates_online_list() {
    let app = helpers::TestEngine::new();
    let (alice, bob) = (UserId::new(), UserId::new());
    let presence = &app.engine.presence;

    presence
        .update_presence(alice, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    presence
        .update_presence(bob, PresenceStatus::Away, Payload::empty())
        .await
        .unwrap();
    let online = presence.get_online_users().await.unwrap();
    assert_eq!(online.len(), 2);

    presence.set_offline(alice).await.unwrap();

    let online = presence.get_online_users().await.unwrap();
    assert!(!online.contains(&alice));
    assert!(online.contains(&bob));
    assert_eq!(presence.stats().await.unwrap().online_users, 1);
}

#[tokio::test]
async fn test_status_change_refreshes_cached_online_list() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    assert!(presence.get_online_users().await.unwrap().is_empty());

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();

    assert!(presence.get_online_users().await.unwrap().contains(&user));
}

#[tokio::test]
async fn test_set_offline_twice_broadcasts_once() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    presence.set_offline(user).await.unwrap();
    presence.set_offline(user).await.unwrap();

    let offline_events = app
        .dispatcher
        .events()
        .iter()
        .filter(|e| e.new_status == PresenceStatus::Offline)
        .count();
    assert_eq!(offline_events, 1);
}

#[tokio::test]
async fn test_heartbeat_keeps_metadata() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Away, device("phone"))
        .await
        .unwrap();
    presence.heartbeat(user).await.unwrap();

    let current = presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Online);
    assert_eq!(current.metadata.get_str("device"), Some("phone"));
}

#[tokio::test]
async fn test_logout_records_activity() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();

    app.engine.presence.heartbeat(user).await.unwrap();
    app.engine.presence.handle_user_logout(user).await.unwrap();

    assert_eq!(app.activity.entries(), vec![(user, "logout".to_string())]);
    let current = app.engine.presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Offline);
}

#[tokio::test]
async fn test_logout_survives_activity_log_failure() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.activity.broken.store(true, Ordering::SeqCst);

    app.engine.presence.heartbeat(user).await.unwrap();
    app.engine.presence.handle_user_logout(user).await.unwrap();

    let current = app.engine.presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Offline);
    assert!(app.activity.entries().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_logout_not_blocked_by_stalled_activity_log() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.activity.stalled.store(true, Ordering::SeqCst);

    app.engine.presence.heartbeat(user).await.unwrap();
    let finished = tokio::time::timeout(
        std::time::Duration::from_secs(60),
        app.engine.presence.handle_user_logout(user),
    )
    .await;

    assert!(finished.is_ok(), "logout waited on the activity log");
    finished.unwrap().unwrap();
    let current = app.engine.presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Offline);
}

#[tokio::test]
async fn test_custom_spelling_of_known_status_is_not_a_transition() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    presence
        .update_presence(user, PresenceStatus::Custom("Online".into()), Payload::empty())
        .await
        .unwrap();

    assert_eq!(app.dispatcher.events().len(), 1);
    let current = presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Online);
}

#[tokio::test]
async fn test_empty_custom_status_rejected() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap();
    let err = presence
        .update_presence(user, PresenceStatus::Custom("  ".into()), Payload::empty())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(app.dispatcher.events().len(), 1);
    let current = presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Online);
}

#[tokio::test]
async fn test_store_failure_surfaces_with_context() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    app.store.fail_presence_writes_for(user);

    let err = app
        .engine
        .presence
        .update_presence(user, PresenceStatus::Online, Payload::empty())
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Database);
    assert!(err.message.contains(&user.to_string()));
    assert!(app.dispatcher.events().is_empty());
}

#[tokio::test]
async fn test_cleanup_counts_successes_and_skips_failures() {
    let app = helpers::TestEngine::new();
    let stale: Vec<UserId> = (0..3).map(|_| UserId::new()).collect();
    for user in &stale {
        app.seed_presence(stale_presence(*user, PresenceStatus::Online))
            .await;
    }
    let fresh = UserId::new();
    app.engine.presence.heartbeat(fresh).await.unwrap();
    app.seed_presence(stale_presence(UserId::new(), PresenceStatus::Offline))
        .await;
    app.store.fail_presence_writes_for(stale[1]);

    let cleaned = app.engine.presence.cleanup_stale_presences(30).await.unwrap();

    assert_eq!(cleaned, 2);
    assert_eq!(status_of(&app, stale[0]).await, PresenceStatus::Offline);
    assert_eq!(status_of(&app, stale[1]).await, PresenceStatus::Online);
    assert_eq!(status_of(&app, stale[2]).await, PresenceStatus::Offline);
    assert_eq!(status_of(&app, fresh).await, PresenceStatus::Online);
}

#[tokio::test]
async fn test_cleanup_walks_every_page() {
    let config = RealtimeConfig {
        stale_sweep_page_size: 2,
        ..RealtimeConfig::default()
    };
    let app = helpers::TestEngine::with_config(config);
    for _ in 0..5 {
        app.seed_presence(stale_presence(UserId::new(), PresenceStatus::Away))
            .await;
    }

    let cleaned = app.engine.presence.cleanup_stale_presences(30).await.unwrap();

    assert_eq!(cleaned, 5);
    assert!(app.engine.presence.get_online_users().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cleanup_rejects_negative_window() {
    let app = helpers::TestEngine::new();
    let err = app
        .engine
        .presence
        .cleanup_stale_presences(-1)
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
}

#[tokio::test]
async fn test_history_records_only_real_transitions() {
    let app = helpers::TestEngine::new();
    let user = UserId::new();
    let presence = &app.engine.presence;

    presence.heartbeat(user).await.unwrap();
    presence.heartbeat(user).await.unwrap();
    presence
        .update_presence(user, PresenceStatus::Away, Payload::empty())
        .await
        .unwrap();

    let history = presence.get_presence_history(user, 10).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].old_status, PresenceStatus::Online);
    assert_eq!(history[0].new_status, PresenceStatus::Away);
    assert_eq!(history[1].old_status, PresenceStatus::Offline);
}

#[tokio::test]
async fn test_cache_read_failure_falls_back_to_store() {
    let app = helpers::TestEngine::with_cache(
        RealtimeConfig::default(),
        Arc::new(helpers::BrokenReadCache),
    );
    let user = UserId::new();

    app.engine
        .presence
        .update_presence(user, PresenceStatus::Away, Payload::empty())
        .await
        .unwrap();

    let current = app.engine.presence.get_presence(user).await.unwrap();
    assert_eq!(current.status, PresenceStatus::Away);
    assert!(app.engine.presence.get_online_users().await.unwrap().contains(&user));
}
