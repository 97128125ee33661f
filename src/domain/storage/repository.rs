//! Keyed record store

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::DomainError;

use super::entity::StorageEntity;

/// Persistence for whole records addressed by key
///
/// A save replaces the stored record in one step; callers own any
/// read-modify-write sequencing.
#[async_trait]
pub trait Storage<E>: Send + Sync + Debug
where
    E: StorageEntity + 'static,
{
    /// The record stored under `key`, if any
    async fn get(&self, key: &E::Key) -> Result<Option<E>, DomainError>;

    /// Insert or replace the record under its own key
    async fn save(&self, entity: E) -> Result<E, DomainError>;
}
