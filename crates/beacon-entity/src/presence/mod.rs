//! Presence domain entities.

pub mod model;

pub use model::{Presence, PresenceChange};

use serde::{Deserialize, Serialize};

/// Presence status of a user.
///
/// The three well-known states are typed; any other non-empty label is kept
/// as [`PresenceStatus::Custom`]. There is no transition table: every state
/// may move to every other state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PresenceStatus {
    /// User is connected and active.
    Online,
    /// User is connected but away.
    Away,
    /// User is not connected.
    #[default]
    Offline,
    /// Application-defined status label.
    Custom(String),
}

impl PresenceStatus {
    /// Check if the user is considered online.
    pub fn is_online(&self) -> bool {
        !matches!(self, Self::Offline)
    }

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Online => "online",
            Self::Away => "away",
            Self::Offline => "offline",
            Self::Custom(label) => label.as_str(),
        }
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = beacon_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        match normalized.as_str() {
            "" => Err(beacon_core::AppError::validation(
                "Presence status must not be empty",
            )),
            "online" => Ok(Self::Online),
            "away" => Ok(Self::Away),
            "offline" => Ok(Self::Offline),
            _ => Ok(Self::Custom(normalized)),
        }
    }
}

impl TryFrom<String> for PresenceStatus {
    type Error = beacon_core::AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PresenceStatus> for String {
    fn from(status: PresenceStatus) -> Self {
        status.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_and_custom() {
        assert_eq!("Online".parse::<PresenceStatus>().unwrap(), PresenceStatus::Online);
        assert_eq!(" away ".parse::<PresenceStatus>().unwrap(), PresenceStatus::Away);
        assert_eq!(
            "dnd".parse::<PresenceStatus>().unwrap(),
            PresenceStatus::Custom("dnd".into())
        );
        assert!("".parse::<PresenceStatus>().is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&PresenceStatus::Away).unwrap();
        assert_eq!(json, "\"away\"");
        let back: PresenceStatus = serde_json::from_str("\"in_meeting\"").unwrap();
        assert_eq!(back, PresenceStatus::Custom("in_meeting".into()));
        assert!(back.is_online());
        assert!(!PresenceStatus::Offline.is_online());
    }
}
