//! Presence manager: the per-user status state machine.
//!
//! Any status may move to any other status. A user that was never seen reads
//! as offline without a stored record. Every write stamps `last_seen_at`,
//! invalidates the user's cached record and, when the status actually
//! changed, the online-users list. Only real transitions reach the history
//! and the event dispatcher.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use beacon_cache::keys;
use beacon_core::config::realtime::RealtimeConfig;
use beacon_core::deadline::with_deadline;
use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_core::traits::cache::{CacheProvider, get_json, set_json};
use beacon_core::types::UserId;
use beacon_entity::message::PresenceChangedEvent;
use beacon_entity::payload::Payload;
use beacon_entity::presence::{Presence, PresenceChange, PresenceStatus};

use crate::activity::{ActivityLog, LOGOUT_ACTION};
use crate::bridge::dispatcher::EventDispatcher;
use crate::store::PresenceStore;

/// Aggregate presence statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealtimeStats {
    /// Users whose status is not offline.
    pub online_users: usize,
}

/// Tracks user presence on top of a [`PresenceStore`] and a cache.
#[derive(Debug)]
pub struct PresenceManager {
    store: Arc<dyn PresenceStore>,
    cache: Arc<dyn CacheProvider>,
    dispatcher: Arc<dyn EventDispatcher>,
    activity: Arc<dyn ActivityLog>,
    config: RealtimeConfig,
}

impl PresenceManager {
    /// Creates a presence manager.
    pub fn new(
        store: Arc<dyn PresenceStore>,
        cache: Arc<dyn CacheProvider>,
        dispatcher: Arc<dyn EventDispatcher>,
        activity: Arc<dyn ActivityLog>,
        config: RealtimeConfig,
    ) -> Self {
        Self {
            store,
            cache,
            dispatcher,
            activity,
            config,
        }
    }

    /// Write a new status and metadata for a user.
    ///
    /// The status is normalized first, so `Custom("Online")` is the same
    /// state as `Online` and an empty label is a validation error.
    ///
    /// Repeating the current status refreshes `last_seen_at` without emitting
    /// a presence-change event.
    pub async fn update_presence(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        metadata: Payload,
    ) -> AppResult<()> {
        self.write_status(user_id, status, Some(metadata), false)
            .await
            .map(|_| ())
    }

    /// Mark a user online and refresh `last_seen_at`, keeping its metadata.
    pub async fn heartbeat(&self, user_id: UserId) -> AppResult<()> {
        self.write_status(user_id, PresenceStatus::Online, None, false)
            .await
            .map(|_| ())
    }

    /// Force a user offline, keeping its metadata.
    ///
    /// Always invalidates both the user's record and the online-users list.
    pub async fn set_offline(&self, user_id: UserId) -> AppResult<()> {
        self.write_status(user_id, PresenceStatus::Offline, None, true)
            .await
            .map(|_| ())
    }

    /// Set a user offline and record the logout.
    ///
    /// The activity log is best effort and bounded by
    /// `activity_log_timeout_ms`: a failure or timeout is logged and the call
    /// still succeeds once the user is offline.
    pub async fn handle_user_logout(&self, user_id: UserId) -> AppResult<()> {
        self.set_offline(user_id)
            .await
            .map_err(|e| e.context(format!("failed to log out user {user_id}")))?;

        let logged = with_deadline(
            self.config.activity_log_timeout(),
            "record logout activity",
            self.activity.log_activity(user_id, LOGOUT_ACTION, Utc::now()),
        )
        .await;
        if let Err(e) = logged {
            warn!(user_id = %user_id, error = %e, "Failed to record logout activity");
        }

        info!(user_id = %user_id, "User logged out");
        Ok(())
    }

    /// Read a user's presence. Users without a record read as offline.
    pub async fn get_presence(&self, user_id: UserId) -> AppResult<Presence> {
        let key = keys::presence(user_id);

        match get_json::<Presence>(self.cache.as_ref(), &key).await {
            Ok(Some(presence)) => return Ok(presence),
            Ok(None) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Presence cache read failed"),
        }

        let found = self
            .store
            .find_presence(user_id)
            .await
            .map_err(|e| e.context(format!("failed to get presence of user {user_id}")))?;

        match found {
            Some(presence) => {
                if let Err(e) = set_json(
                    self.cache.as_ref(),
                    &key,
                    &presence,
                    self.config.presence_cache_ttl(),
                )
                .await
                {
                    warn!(user_id = %user_id, error = %e, "Presence cache fill failed");
                }
                Ok(presence)
            }
            None => Ok(Presence::offline(user_id)),
        }
    }

    /// Users whose status is anything other than offline.
    pub async fn get_online_users(&self) -> AppResult<BTreeSet<UserId>> {
        let key = keys::online_users();

        match get_json::<BTreeSet<UserId>>(self.cache.as_ref(), &key).await {
            Ok(Some(users)) => return Ok(users),
            Ok(None) => {}
            Err(e) => warn!(error = %e, "Online users cache read failed"),
        }

        let users: BTreeSet<UserId> = self
            .store
            .online_users()
            .await
            .map_err(|e| e.context("failed to get online users"))?
            .into_iter()
            .collect();

        if let Err(e) = set_json(
            self.cache.as_ref(),
            &key,
            &users,
            self.config.online_users_cache_ttl(),
        )
        .await
        {
            warn!(error = %e, "Online users cache fill failed");
        }
        Ok(users)
    }

    /// Most recent status transitions of a user, newest first.
    pub async fn get_presence_history(
        &self,
        user_id: UserId,
        limit: usize,
    ) -> AppResult<Vec<PresenceChange>> {
        self.store
            .presence_history(user_id, limit)
            .await
            .map_err(|e| e.context(format!("failed to get presence history of user {user_id}")))
    }

    /// Aggregate presence statistics.
    pub async fn stats(&self) -> AppResult<RealtimeStats> {
        let online = self.get_online_users().await?;
        Ok(RealtimeStats {
            online_users: online.len(),
        })
    }

    /// Set offline every user not seen for `stale_after_minutes`.
    ///
    /// Users that fail to go offline are logged and skipped. Returns the
    /// number of users set offline. Only a failure to list stale users fails
    /// the sweep.
    pub async fn cleanup_stale_presences(&self, stale_after_minutes: i64) -> AppResult<u64> {
        if stale_after_minutes < 0 {
            return Err(AppError::validation(format!(
                "Stale window must not be negative, got {stale_after_minutes} minutes"
            )));
        }

        let cutoff = Utc::now() - ChronoDuration::minutes(stale_after_minutes);
        let page_size = self.config.stale_sweep_page_size.max(1);
        let mut cursor: Option<UserId> = None;
        let mut cleaned: u64 = 0;
        let mut failed: u64 = 0;

        loop {
            let page = self
                .store
                .stale_presences(cutoff, cursor, page_size)
                .await
                .map_err(|e| e.context("failed to list stale presences"))?;

            for user_id in &page {
                match self.set_offline(*user_id).await {
                    Ok(()) => cleaned += 1,
                    Err(e) => {
                        failed += 1;
                        warn!(user_id = %user_id, error = %e, "Failed to set stale user offline");
                    }
                }
            }

            if page.len() < page_size {
                break;
            }
            cursor = page.last().copied();
        }

        info!(cleaned, failed, stale_after_minutes, "Stale presence sweep complete");
        Ok(cleaned)
    }

    /// Persist a status write and run its side effects. Returns the prior
    /// status.
    ///
    /// `metadata: None` keeps the metadata of the prior record.
    async fn write_status(
        &self,
        user_id: UserId,
        status: PresenceStatus,
        metadata: Option<Payload>,
        always_invalidate_online: bool,
    ) -> AppResult<PresenceStatus> {
        let status: PresenceStatus = status
            .as_str()
            .parse()
            .map_err(|e: AppError| e.context(format!("failed to set presence of user {user_id}")))?;
        let op = || format!("failed to set presence of user {user_id} to {status}");

        let previous = self.get_presence(user_id).await.map_err(|e| e.context(op()))?;
        let old_status = previous.status;
        let metadata = metadata.unwrap_or(previous.metadata);

        let record = Presence::new(user_id, status.clone(), metadata);
        self.store
            .upsert_presence(&record)
            .await
            .map_err(|e| e.context(op()))?;

        let changed = old_status != status;
        self.invalidate(user_id, changed || always_invalidate_online)
            .await
            .map_err(|e| e.context(op()))?;

        if changed {
            self.record_transition(user_id, old_status.clone(), status, record.last_seen_at)
                .await;
        } else {
            debug!(user_id = %user_id, status = %status, "Presence refreshed");
        }

        Ok(old_status)
    }

    async fn invalidate(&self, user_id: UserId, online_list: bool) -> AppResult<()> {
        self.cache.delete(&keys::presence(user_id)).await?;
        if online_list {
            self.cache.delete(&keys::online_users()).await?;
        }
        Ok(())
    }

    async fn record_transition(
        &self,
        user_id: UserId,
        old_status: PresenceStatus,
        new_status: PresenceStatus,
        at: DateTime<Utc>,
    ) {
        let change = PresenceChange {
            user_id,
            old_status: old_status.clone(),
            new_status: new_status.clone(),
            changed_at: at,
        };
        if let Err(e) = self
            .store
            .append_history(&change, self.config.presence_history_limit)
            .await
        {
            warn!(user_id = %user_id, error = %e, "Failed to record presence history");
        }

        info!(
            user_id = %user_id,
            old_status = %old_status,
            new_status = %new_status,
            "Presence changed"
        );
        self.dispatcher
            .dispatch(&PresenceChangedEvent::new(user_id, old_status, new_status, at));
    }
}
