//! Domain layer - Core entities, value objects and collaborator traits

pub mod api_key;
pub mod error;
pub mod export;
pub mod form;
pub mod storage;
pub mod submission;

pub use api_key::{AccessError, ApiKeyRecord, ApiKeyRegistry, ApiKeyScope, ApiKeyStore, ApiToken};
pub use error::DomainError;
pub use export::{
    humanize_key, DocumentBody, ExportError, ExportFormat, ExportOutput, ImageFetcher,
    ResolvedFieldMap,
};
pub use form::{FieldDefinition, FormSchemaProvider};
pub use storage::{OptionName, Storage, StorageEntity, StorageKey, StoredOption};
pub use submission::{FormId, Submission, SubmissionQuery, SubmissionSource};
