//! PostgreSQL form schema provider

use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::form::{FieldDefinition, FormSchemaProvider};
use crate::domain::submission::FormId;
use crate::domain::DomainError;

/// Reads declared fields from the `form_fields` table
#[derive(Debug, Clone)]
pub struct PostgresFormSchemaProvider {
    pool: PgPool,
}

impl PostgresFormSchemaProvider {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FormSchemaProvider for PostgresFormSchemaProvider {
    async fn fields(&self, form_id: FormId) -> Result<Vec<FieldDefinition>, DomainError> {
        let form_id = i64::try_from(form_id.value())
            .map_err(|_| DomainError::validation(format!("Form id {} out of range", form_id)))?;

        let rows = sqlx::query(
            "SELECT key, label, type FROM form_fields WHERE form_id = $1 ORDER BY position, key",
        )
        .bind(form_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to load form fields: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                FieldDefinition::new(
                    row.get::<String, _>("key"),
                    row.get::<String, _>("label"),
                    row.get::<String, _>("type"),
                )
            })
            .collect())
    }
}
