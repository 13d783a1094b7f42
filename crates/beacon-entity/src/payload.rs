//! Versioned open payload used for presence metadata and event data.
//!
//! The body is kept as JSON at the storage and transport boundary. Code that
//! needs the contents builds a typed view with [`Payload::decode`] instead of
//! passing raw maps around.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use beacon_core::error::AppError;
use beacon_core::result::AppResult;

/// Schema version written by this build.
pub const CURRENT_SCHEMA_VERSION: u16 = 1;

/// An opaque key-value payload tagged with its schema version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Schema version of `body`.
    pub schema_version: u16,
    /// JSON body.
    pub body: Value,
}

impl Payload {
    /// Wrap a JSON value at the current schema version.
    pub fn new(body: Value) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            body,
        }
    }

    /// An empty object payload.
    pub fn empty() -> Self {
        Self::new(Value::Object(serde_json::Map::new()))
    }

    /// Serialize a typed value into a payload.
    pub fn encode<T: Serialize>(value: &T) -> AppResult<Self> {
        Ok(Self::new(serde_json::to_value(value)?))
    }

    /// Build a typed view of the body.
    pub fn decode<T: DeserializeOwned>(&self) -> AppResult<T> {
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(AppError::validation(format!(
                "Unsupported payload schema version {} (max {})",
                self.schema_version, CURRENT_SCHEMA_VERSION
            )));
        }
        Ok(serde_json::from_value(self.body.clone())?)
    }

    /// Look up a top-level string field.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Whether the body carries no data.
    pub fn is_empty(&self) -> bool {
        match &self.body {
            Value::Null => true,
            Value::Object(map) => map.is_empty(),
            _ => false,
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for Payload {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}
