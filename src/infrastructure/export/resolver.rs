//! Field label resolution
//!
//! Merges declared schema labels with labels inferred from the keys the
//! submissions actually carry.

use std::sync::Arc;

use tracing::debug;

use crate::domain::export::{humanize_key, ResolvedFieldMap};
use crate::domain::form::FormSchemaProvider;
use crate::domain::submission::{
    FormId, Submission, DATE_SUBMITTED_KEY, FORM_ID_KEY, SEQ_NUM_KEY,
};
use crate::domain::DomainError;

/// Keys every export knows about regardless of the schema
pub const EXTRA_KEYS: [&str; 3] = [DATE_SUBMITTED_KEY, FORM_ID_KEY, SEQ_NUM_KEY];

/// Prefix of host-internal per-field keys that never get a label
pub const INTERNAL_FIELD_PREFIX: &str = "_field_";

/// Builds the ordered key → label map for an export
#[derive(Debug, Clone)]
pub struct FieldLabelResolver {
    schemas: Arc<dyn FormSchemaProvider>,
}

impl FieldLabelResolver {
    pub fn new(schemas: Arc<dyn FormSchemaProvider>) -> Self {
        Self { schemas }
    }

    pub async fn resolve(
        &self,
        form_id: FormId,
        submissions: &[Submission],
    ) -> Result<ResolvedFieldMap, DomainError> {
        let mut map = ResolvedFieldMap::new();

        for field in self.schemas.fields(form_id).await? {
            if field.has_label() {
                map.insert(field.key, field.label);
            }
        }

        let declared = map.len();

        for key in submissions.iter().flat_map(Submission::field_keys) {
            if map.contains_key(key) || is_reserved_key(key) {
                continue;
            }
            map.insert(key, humanize_key(key));
        }

        debug!(
            form_id = %form_id,
            declared,
            inferred = map.len() - declared,
            "Resolved field labels"
        );

        for key in EXTRA_KEYS {
            map.insert(key, humanize_key(key));
        }

        map.remove(FORM_ID_KEY);
        map.move_to_front(SEQ_NUM_KEY);

        Ok(map)
    }
}

fn is_reserved_key(key: &str) -> bool {
    EXTRA_KEYS.contains(&key) || key.starts_with(INTERNAL_FIELD_PREFIX)
}
