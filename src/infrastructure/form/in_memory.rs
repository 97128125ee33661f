//! In-memory form schema provider

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::form::{FieldDefinition, FormSchemaProvider};
use crate::domain::submission::FormId;
use crate::domain::DomainError;

/// Declared fields per form, held in memory
#[derive(Debug, Default)]
pub struct InMemoryFormSchemaProvider {
    forms: RwLock<HashMap<FormId, Vec<FieldDefinition>>>,
}

impl InMemoryFormSchemaProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the declared fields of a form
    pub fn set_fields(
        &self,
        form_id: FormId,
        fields: Vec<FieldDefinition>,
    ) -> Result<(), DomainError> {
        self.forms
            .write()
            .map_err(|e| DomainError::storage(format!("Failed to acquire lock: {}", e)))?
            .insert(form_id, fields);
        Ok(())
    }
}

#[async_trait]
impl FormSchemaProvider for InMemoryFormSchemaProvider {
    async fn fields(&self, form_id: FormId) -> Result<Vec<FieldDefinition>, DomainError> {
        let forms = self
            .forms
            .read()
            .map_err(|e| DomainError::storage(format!("Failed to acquire lock: {}", e)))?;

        Ok(forms.get(&form_id).cloned().unwrap_or_default())
    }
}
