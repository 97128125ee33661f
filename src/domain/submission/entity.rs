//! Submission entity and query types

use std::borrow::Cow;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::DomainError;

/// Extra key carrying the submission date
pub const DATE_SUBMITTED_KEY: &str = "date_submitted";

/// Internal key carrying the owning form id
pub const FORM_ID_KEY: &str = "_form_id";

/// Key carrying the per-form sequence number
pub const SEQ_NUM_KEY: &str = "_seq_num";

/// Format used when the submission date is displayed
pub const SUBMITTED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Form identifier - a positive integer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u64", into = "u64")]
pub struct FormId(u64);

impl FormId {
    pub fn new(id: u64) -> Result<Self, DomainError> {
        if id == 0 {
            return Err(DomainError::validation("Form id must be a positive integer"));
        }

        Ok(Self(id))
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl TryFrom<u64> for FormId {
    type Error = DomainError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FormId> for u64 {
    fn from(id: FormId) -> Self {
        id.0
    }
}

impl FromStr for FormId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DomainError::validation(format!(
                "Invalid form id '{}': expected a positive integer",
                s
            )));
        }

        let id = trimmed.parse::<u64>().map_err(|e| {
            DomainError::validation(format!("Invalid form id '{}': {}", s, e))
        })?;

        Self::new(id)
    }
}

impl std::fmt::Display for FormId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed form entry
///
/// `fields` keeps the storage order of the keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: u64,
    pub form_id: FormId,
    pub submitted_at: NaiveDateTime,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Submission {
    pub fn new(id: u64, form_id: FormId, submitted_at: NaiveDateTime) -> Self {
        Self {
            id,
            form_id,
            submitted_at,
            fields: Map::new(),
        }
    }

    /// Add a field value, keeping insertion order
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Keys carried by this submission, in storage order
    pub fn field_keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Raw value for a key
    ///
    /// The submission date is served from `submitted_at` unless the record
    /// carries an explicit value for it.
    pub fn field_value(&self, key: &str) -> Option<Cow<'_, Value>> {
        if let Some(value) = self.fields.get(key) {
            return Some(Cow::Borrowed(value));
        }

        if key == DATE_SUBMITTED_KEY {
            return Some(Cow::Owned(Value::String(
                self.submitted_at.format(SUBMITTED_AT_FORMAT).to_string(),
            )));
        }

        None
    }
}

/// Submission lookup for one form within an inclusive time window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionQuery {
    pub form_id: FormId,
    pub after: Option<NaiveDateTime>,
    pub before: Option<NaiveDateTime>,
}

impl SubmissionQuery {
    pub fn for_form(form_id: FormId) -> Self {
        Self {
            form_id,
            after: None,
            before: None,
        }
    }

    /// Window covering whole calendar days
    ///
    /// `begin` starts at 00:00:00, `end` stops at 23:59:59; both inclusive.
    pub fn with_dates(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.after = begin.map(|d| d.and_time(NaiveTime::MIN));
        self.before = end.and_then(|d| d.and_hms_opt(23, 59, 59));
        self
    }

    /// Whether a submission falls inside this query
    pub fn matches(&self, submission: &Submission) -> bool {
        if submission.form_id != self.form_id {
            return false;
        }

        if let Some(after) = self.after {
            if submission.submitted_at < after {
                return false;
            }
        }

        if let Some(before) = self.before {
            if submission.submitted_at > before {
                return false;
            }
        }

        true
    }
}
