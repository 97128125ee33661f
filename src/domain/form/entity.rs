//! Form schema types

use serde::{Deserialize, Serialize};

/// Declared field of a form: key, display label and field type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldDefinition {
    pub fn new(
        key: impl Into<String>,
        label: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            field_type: field_type.into(),
        }
    }

    /// Whether the definition can seed a label mapping
    pub fn has_label(&self) -> bool {
        !self.key.is_empty() && !self.label.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_type_field() {
        let field = FieldDefinition::new("email", "Email Address", "email");
        let json = serde_json::to_value(&field).unwrap();

        assert_eq!(
            json,
            serde_json::json!({"key": "email", "label": "Email Address", "type": "email"})
        );
    }

    #[test]
    fn test_has_label_requires_key_and_label() {
        assert!(FieldDefinition::new("email", "Email", "email").has_label());
        assert!(!FieldDefinition::new("", "Email", "email").has_label());
        assert!(!FieldDefinition::new("submit", "", "submit").has_label());
    }
}
