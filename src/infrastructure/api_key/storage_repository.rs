//! Option-backed API key store
//!
//! The whole registry lives in one named option, as a JSON object mapping
//! each token to `{ "forms": [..], "created": "YYYY-MM-DD HH:MM:SS" }`.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::api_key::{ApiKeyRegistry, ApiKeyStore};
use crate::domain::storage::{OptionName, Storage, StoredOption};
use crate::domain::DomainError;

/// Option name holding the API key registry
pub const API_KEYS_OPTION: &str = "form_submissions_api_keys";

/// Storage-backed implementation of ApiKeyStore
#[derive(Debug)]
pub struct OptionApiKeyStore {
    storage: Arc<dyn Storage<StoredOption>>,
    option: OptionName,
}

impl OptionApiKeyStore {
    /// Create a store persisting under the default option name
    pub fn new(storage: Arc<dyn Storage<StoredOption>>) -> Self {
        Self {
            storage,
            option: OptionName::new(API_KEYS_OPTION),
        }
    }
}

#[async_trait]
impl ApiKeyStore for OptionApiKeyStore {
    async fn load(&self) -> Result<ApiKeyRegistry, DomainError> {
        let Some(option) = self.storage.get(&self.option).await? else {
            return Ok(ApiKeyRegistry::new());
        };

        // An option that was never populated may hold null or an empty list
        match option.into_value() {
            serde_json::Value::Null => Ok(ApiKeyRegistry::new()),
            serde_json::Value::Array(items) if items.is_empty() => Ok(ApiKeyRegistry::new()),
            value => serde_json::from_value(value).map_err(|e| {
                DomainError::storage(format!("Corrupt API key registry '{}': {}", self.option, e))
            }),
        }
    }

    async fn save(&self, registry: &ApiKeyRegistry) -> Result<(), DomainError> {
        let value = serde_json::to_value(registry)
            .map_err(|e| DomainError::internal(format!("Failed to encode API keys: {}", e)))?;

        self.storage
            .save(StoredOption::new(self.option.clone(), value))
            .await?;

        Ok(())
    }
}
