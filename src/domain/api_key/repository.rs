//! API key store trait

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::ApiKeyRegistry;

/// Persistence for the whole API key registry
///
/// The registry is read and written as one unit. Callers that modify it
/// are responsible for serializing their read-modify-write cycles.
#[async_trait]
pub trait ApiKeyStore: Send + Sync + std::fmt::Debug {
    /// Load the current registry, empty when nothing was stored yet
    async fn load(&self) -> Result<ApiKeyRegistry, DomainError>;

    /// Replace the stored registry
    async fn save(&self, registry: &ApiKeyRegistry) -> Result<(), DomainError>;
}
