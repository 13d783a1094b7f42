//! Activity log sink used on logout.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use beacon_core::result::AppResult;
use beacon_core::types::UserId;

/// Action recorded when a user logs out.
pub const LOGOUT_ACTION: &str = "logout";

/// Records user activity. Failures are the caller's to tolerate.
#[async_trait]
pub trait ActivityLog: Send + Sync + std::fmt::Debug + 'static {
    /// Record that `user_id` performed `action` at `at`.
    async fn log_activity(&self, user_id: UserId, action: &str, at: DateTime<Utc>)
    -> AppResult<()>;
}

/// Activity log that records nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopActivityLog;

#[async_trait]
impl ActivityLog for NoopActivityLog {
    async fn log_activity(
        &self,
        _user_id: UserId,
        _action: &str,
        _at: DateTime<Utc>,
    ) -> AppResult<()> {
        Ok(())
    }
}
