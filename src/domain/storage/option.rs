//! Named option records
//!
//! Options are small JSON documents addressed by a well-known name, the
//! same shape a host's key-value configuration table has. The API key
//! registry is persisted as one option.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{StorageEntity, StorageKey};

/// Name of a stored option
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionName(String);

impl OptionName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl StorageKey for OptionName {
    fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for OptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single named option and its JSON value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOption {
    name: OptionName,
    value: Value,
    updated_at: DateTime<Utc>,
}

impl StoredOption {
    pub fn new(name: OptionName, value: Value) -> Self {
        Self {
            name,
            value,
            updated_at: Utc::now(),
        }
    }

    pub fn name(&self) -> &OptionName {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }
}

impl StorageEntity for StoredOption {
    type Key = OptionName;

    fn key(&self) -> &Self::Key {
        &self.name
    }
}
