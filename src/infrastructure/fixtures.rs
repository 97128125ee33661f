//! JSON fixture loading for the in-memory sources
//!
//! A fixture file lists forms with their declared fields and submissions:
//!
//! ```json
//! { "forms": [ { "id": 3,
//!                "fields": [ { "key": "email", "label": "Email", "type": "email" } ],
//!                "submissions": [ { "submitted_at": "2024-05-02 14:03:09",
//!                                   "fields": { "email": "a@example.com" } } ] } ] }
//! ```

use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::info;

use crate::domain::form::FieldDefinition;
use crate::domain::submission::{FormId, Submission, SUBMITTED_AT_FORMAT};
use crate::domain::DomainError;

use super::form::InMemoryFormSchemaProvider;
use super::submission::InMemorySubmissionSource;

/// Parsed fixture file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FixtureSet {
    #[serde(default)]
    pub forms: Vec<FormFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FormFixture {
    pub id: FormId,
    #[serde(default)]
    pub fields: Vec<FieldDefinition>,
    #[serde(default)]
    pub submissions: Vec<SubmissionFixture>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionFixture {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub submitted_at: NaiveDateTime,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, SUBMITTED_AT_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f"))
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))
}

impl FixtureSet {
    /// Read and parse a fixture file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!(
                "Failed to read fixtures '{}': {}",
                path.display(),
                e
            ))
        })?;

        let fixtures = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            forms = fixtures.forms.len(),
            "Loaded submission fixtures"
        );

        Ok(fixtures)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        serde_json::from_str(raw)
            .map_err(|e| DomainError::configuration(format!("Invalid fixtures: {}", e)))
    }

    /// Populate in-memory sources; missing ids are numbered in file order
    pub fn into_sources(
        self,
    ) -> Result<(InMemorySubmissionSource, InMemoryFormSchemaProvider), DomainError> {
        let submissions = InMemorySubmissionSource::new();
        let schemas = InMemoryFormSchemaProvider::new();
        let mut next_id = 1u64;

        for form in self.forms {
            schemas.set_fields(form.id, form.fields)?;

            for fixture in form.submissions {
                let id = fixture.id.unwrap_or(next_id);
                next_id = next_id.max(id) + 1;

                let mut submission = Submission::new(id, form.id, fixture.submitted_at);
                submission.fields = fixture.fields;
                submissions.push(submission)?;
            }
        }

        Ok((submissions, schemas))
    }
}
