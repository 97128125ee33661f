//! PostgreSQL submission source

use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde_json::{Map, Value};
use sqlx::postgres::PgPool;
use sqlx::Row;

use crate::domain::submission::{FormId, Submission, SubmissionQuery, SubmissionSource};
use crate::domain::DomainError;

/// Reads the `form_submissions` table
#[derive(Debug, Clone)]
pub struct PostgresSubmissionSource {
    pool: PgPool,
}

impl PostgresSubmissionSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn form_id_param(form_id: FormId) -> Result<i64, DomainError> {
    i64::try_from(form_id.value())
        .map_err(|_| DomainError::validation(format!("Form id {} out of range", form_id)))
}

fn submission_id(id: i64) -> Result<u64, DomainError> {
    u64::try_from(id)
        .map_err(|_| DomainError::storage(format!("Submission has negative id {}", id)))
}

#[async_trait]
impl SubmissionSource for PostgresSubmissionSource {
    async fn query(&self, query: &SubmissionQuery) -> Result<Vec<Submission>, DomainError> {
        let rows = sqlx::query(
            r#"
            SELECT id, submitted_at, fields
            FROM form_submissions
            WHERE form_id = $1
              AND ($2::timestamp IS NULL OR submitted_at >= $2)
              AND ($3::timestamp IS NULL OR submitted_at <= $3)
            ORDER BY submitted_at, id
            "#,
        )
        .bind(form_id_param(query.form_id)?)
        .bind(query.after)
        .bind(query.before)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to query submissions: {}", e)))?;

        rows.into_iter()
            .map(|row| {
                let id: i64 = row.get("id");
                let submitted_at: NaiveDateTime = row.get("submitted_at");
                let fields = match row.get::<Value, _>("fields") {
                    Value::Object(map) => map,
                    Value::Null => Map::new(),
                    other => {
                        return Err(DomainError::storage(format!(
                            "Submission {} has non-object fields: {}",
                            id, other
                        )))
                    }
                };

                Ok(Submission {
                    id: submission_id(id)?,
                    form_id: query.form_id,
                    submitted_at,
                    fields,
                })
            })
            .collect()
    }

    async fn ping(&self) -> Result<(), DomainError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Database unreachable: {}", e)))?;
        Ok(())
    }
}
