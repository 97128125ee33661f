//! Access control errors

use thiserror::Error;

use crate::domain::DomainError;

/// Why a presented credential was not accepted
#[derive(Debug, Error)]
pub enum AccessError {
    /// No token was presented
    #[error("API key missing")]
    MissingKey,

    /// The token is not in the key store
    #[error("Invalid API key")]
    UnknownKey,

    /// The token exists but does not cover the requested form
    #[error("API key not authorized for form '{form}'")]
    OutOfScope { form: String },

    /// The key store could not be read
    #[error(transparent)]
    Store(#[from] DomainError),
}
