//! API Key service
//!
//! The authorization gate: issues and revokes scoped tokens and checks a
//! presented token against a requested form.

use std::sync::Arc;

use chrono::Local;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::domain::api_key::{
    canonical_form_ref, AccessError, ApiKeyRecord, ApiKeyRegistry, ApiKeyScope, ApiKeyStore,
    ApiToken,
};
use crate::domain::DomainError;

use super::generator::TokenGenerator;

/// Attempts made to find a token not already in the registry
const MAX_TOKEN_ATTEMPTS: usize = 16;

/// A freshly issued API key
#[derive(Debug, Clone)]
pub struct IssuedApiKey {
    pub token: ApiToken,
    pub record: ApiKeyRecord,
}

/// API Key service for issuing, revoking and checking tokens
#[derive(Debug)]
pub struct ApiKeyService {
    store: Arc<dyn ApiKeyStore>,
    generator: TokenGenerator,
    write_lock: Mutex<()>,
}

impl ApiKeyService {
    /// Create a new API key service
    pub fn new(store: Arc<dyn ApiKeyStore>) -> Self {
        Self {
            store,
            generator: TokenGenerator::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create with a custom generator
    pub fn with_generator(mut self, generator: TokenGenerator) -> Self {
        self.generator = generator;
        self
    }

    /// Issue a new token for the given scope
    pub async fn issue(&self, scope: ApiKeyScope) -> Result<IssuedApiKey, DomainError> {
        let _guard = self.write_lock.lock().await;
        let mut registry = self.store.load().await?;

        let token = unique_token(&registry, || self.generator.generate()).ok_or_else(|| {
            DomainError::internal("Could not generate a unique API key")
        })?;

        let record = ApiKeyRecord::new(scope, Local::now().naive_local());
        registry.insert(token.clone(), record.clone());
        self.store.save(&registry).await?;

        info!(
            key = %token.fingerprint(),
            forms = ?record.scope().entries(),
            "API key issued"
        );

        Ok(IssuedApiKey { token, record })
    }

    /// Revoke a token; returns whether it existed
    pub async fn revoke(&self, token: &str) -> Result<bool, DomainError> {
        let token = ApiToken::new(token.trim());
        let _guard = self.write_lock.lock().await;
        let mut registry = self.store.load().await?;

        if registry.remove(&token).is_none() {
            debug!(key = %token.fingerprint(), "Revoke of unknown API key ignored");
            return Ok(false);
        }

        self.store.save(&registry).await?;
        info!(key = %token.fingerprint(), "API key revoked");

        Ok(true)
    }

    /// Look up a token without a form
    pub async fn authenticate(&self, token: &str) -> Result<ApiKeyRecord, AccessError> {
        let token = token.trim();

        if token.is_empty() {
            return Err(AccessError::MissingKey);
        }

        let registry = self.store.load().await?;

        registry.get(token).cloned().ok_or_else(|| {
            debug!(
                key = %ApiToken::new(token).fingerprint(),
                "Unknown API key presented"
            );
            AccessError::UnknownKey
        })
    }

    /// Check a token against a form reference
    pub async fn check(&self, token: &str, form_ref: &str) -> Result<ApiKeyRecord, AccessError> {
        let record = self.authenticate(token).await?;

        if !record.scope().permits(form_ref) {
            debug!(
                key = %ApiToken::new(token.trim()).fingerprint(),
                form = form_ref,
                "API key out of scope"
            );
            return Err(AccessError::OutOfScope {
                form: canonical_form_ref(form_ref).unwrap_or_default(),
            });
        }

        Ok(record)
    }

    /// Fail-closed boolean form of [`ApiKeyService::check`]
    pub async fn authorize(&self, token: &str, form_ref: &str) -> bool {
        self.check(token, form_ref).await.is_ok()
    }

    /// All issued keys, oldest first
    pub async fn list(&self) -> Result<Vec<(ApiToken, ApiKeyRecord)>, DomainError> {
        let registry = self.store.load().await?;

        let mut keys: Vec<_> = registry
            .iter()
            .map(|(token, record)| (token.clone(), record.clone()))
            .collect();
        keys.sort_by_key(|(_, record)| record.created_at());

        Ok(keys)
    }

    /// Verify the key store is readable
    pub async fn ping(&self) -> Result<(), DomainError> {
        self.store.load().await.map(|_| ())
    }
}

fn unique_token(
    registry: &ApiKeyRegistry,
    mut generate: impl FnMut() -> ApiToken,
) -> Option<ApiToken> {
    (0..MAX_TOKEN_ATTEMPTS)
        .map(|_| generate())
        .find(|token| !registry.contains(token))
}
