//! sqlx repositories backing the realtime stores.

pub mod activity;
pub mod message;
pub mod presence;
pub mod subscription;

use std::sync::Arc;

use sqlx::PgPool;

use beacon_core::error::AppError;
use beacon_core::result::AppResult;
use beacon_realtime::store::RealtimeStores;

pub use activity::ActivityRepository;
pub use message::MessageRepository;
pub use presence::PresenceRepository;
pub use subscription::SubscriptionRepository;

/// Realtime stores backed by PostgreSQL.
pub fn postgres_stores(pool: &PgPool) -> RealtimeStores {
    RealtimeStores {
        subscriptions: Arc::new(SubscriptionRepository::new(pool.clone())),
        presence: Arc::new(PresenceRepository::new(pool.clone())),
        messages: Arc::new(MessageRepository::new(pool.clone())),
    }
}

/// Convert a caller-supplied limit into a SQL `LIMIT` value.
pub(crate) fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

/// Read a stored payload schema version.
pub(crate) fn stored_version(column: &str, version: i16) -> AppResult<u16> {
    u16::try_from(version).map_err(|_| {
        AppError::validation(format!("Invalid {column} schema version {version}"))
    })
}

/// Convert a payload schema version into its SQL column value.
pub(crate) fn column_version(column: &str, version: u16) -> AppResult<i16> {
    i16::try_from(version).map_err(|_| {
        AppError::validation(format!(
            "{column} schema version {version} exceeds {}",
            i16::MAX
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use beacon_core::error::ErrorKind;

    #[test]
    fn test_schema_version_bounds() {
        assert_eq!(stored_version("data", 3).unwrap(), 3);
        assert_eq!(
            stored_version("data", -1).unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(column_version("metadata", 7).unwrap(), 7);
        assert_eq!(
            column_version("metadata", u16::MAX).unwrap_err().kind,
            ErrorKind::Validation
        );
    }
}
