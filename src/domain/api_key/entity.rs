//! API key entity and related types

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::validation::canonical_form_ref;

/// Sentinel scope entry granting access to every form
pub const ALL_FORMS: &str = "all";

/// Opaque bearer token identifying an API key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short, non-secret prefix suitable for logs
    pub fn fingerprint(&self) -> String {
        self.0.chars().take(8).collect()
    }
}

impl std::fmt::Display for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Forms an API key may read
///
/// Persisted as a list of strings where the single entry `"all"` stands for
/// every form. Form references are kept as canonical strings and compared by
/// string equality.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum ApiKeyScope {
    /// Access to every form
    All,
    /// Access to the listed forms only
    Forms(BTreeSet<String>),
}

impl ApiKeyScope {
    /// Build a scope from raw entries, normalizing them to canonical strings
    ///
    /// An exact `all` entry wins. Blank entries are dropped, so a list with
    /// nothing else in it permits no form at all.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut forms = BTreeSet::new();

        for entry in entries {
            let entry = entry.as_ref().trim();

            if entry == ALL_FORMS {
                return Self::All;
            }

            if let Some(canonical) = canonical_form_ref(entry) {
                forms.insert(canonical);
            }
        }

        Self::Forms(forms)
    }

    /// Scope covering only the given forms
    pub fn forms<I, S>(forms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_entries(forms)
    }

    /// True when the scope names no form and is not `all`
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Forms(forms) if forms.is_empty())
    }

    /// Check whether a form reference is covered by this scope
    pub fn permits(&self, form_ref: &str) -> bool {
        match self {
            Self::All => true,
            Self::Forms(forms) => {
                canonical_form_ref(form_ref).is_some_and(|canonical| forms.contains(&canonical))
            }
        }
    }

    /// Scope entries in their persisted form
    pub fn entries(&self) -> Vec<String> {
        match self {
            Self::All => vec![ALL_FORMS.to_string()],
            Self::Forms(forms) => forms.iter().cloned().collect(),
        }
    }
}

impl From<Vec<String>> for ApiKeyScope {
    fn from(entries: Vec<String>) -> Self {
        Self::from_entries(entries)
    }
}

impl From<ApiKeyScope> for Vec<String> {
    fn from(scope: ApiKeyScope) -> Self {
        scope.entries()
    }
}

/// A stored API key: its scope and creation time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    forms: ApiKeyScope,
    #[serde(with = "created_format")]
    created: NaiveDateTime,
}

impl ApiKeyRecord {
    pub fn new(scope: ApiKeyScope, created: NaiveDateTime) -> Self {
        Self {
            forms: scope,
            created,
        }
    }

    pub fn scope(&self) -> &ApiKeyScope {
        &self.forms
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created
    }
}

/// Every issued key, addressed by token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyRegistry(BTreeMap<ApiToken, ApiKeyRecord>);

impl ApiKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, token: &str) -> Option<&ApiKeyRecord> {
        self.0.get(&ApiToken::new(token))
    }

    pub fn contains(&self, token: &ApiToken) -> bool {
        self.0.contains_key(token)
    }

    pub fn insert(&mut self, token: ApiToken, record: ApiKeyRecord) {
        self.0.insert(token, record);
    }

    pub fn remove(&mut self, token: &ApiToken) -> Option<ApiKeyRecord> {
        self.0.remove(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ApiToken, &ApiKeyRecord)> {
        self.0.iter()
    }
}

/// `created` is stored as `YYYY-MM-DD HH:MM:SS`
mod created_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}
