//! API Key domain
//!
//! Types for scoped API keys: tokens, per-key form scopes, the persisted
//! registry and the store trait it lives behind.

mod entity;
mod error;
mod repository;
mod validation;

pub use entity::{ApiKeyRecord, ApiKeyRegistry, ApiKeyScope, ApiToken, ALL_FORMS};
pub use error::AccessError;
pub use repository::ApiKeyStore;
pub use validation::canonical_form_ref;
