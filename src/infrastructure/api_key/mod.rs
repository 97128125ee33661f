//! API Key infrastructure implementations
//!
//! Token generation, the option-backed key store and the authorization
//! gate service.

mod generator;
mod service;
mod storage_repository;

pub use generator::{constant_time_compare, TokenGenerator, TOKEN_BYTES};
pub use service::{ApiKeyService, IssuedApiKey};
pub use storage_repository::{OptionApiKeyStore, API_KEYS_OPTION};
