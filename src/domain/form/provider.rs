//! Form schema provider trait

use async_trait::async_trait;

use crate::domain::submission::FormId;
use crate::domain::DomainError;

use super::entity::FieldDefinition;

/// Supplies the declared fields of a form
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FormSchemaProvider: Send + Sync + std::fmt::Debug {
    /// Declared fields in form order; empty when the form is unknown
    async fn fields(&self, form_id: FormId) -> Result<Vec<FieldDefinition>, DomainError>;
}
