//! Form reference normalization
//!
//! Scopes store form identifiers as strings. Both the stored entries and the
//! requested identifier go through [`canonical_form_ref`] so that `"007"`
//! and `"7"` compare equal while non-numeric references only ever match
//! themselves.

/// Canonical string form of a form reference, `None` when blank
pub fn canonical_form_ref(raw: &str) -> Option<String> {
    let trimmed = raw.trim();

    if trimmed.is_empty() {
        return None;
    }

    if trimmed.bytes().all(|b| b.is_ascii_digit()) {
        let digits = trimmed.trim_start_matches('0');
        return Some(if digits.is_empty() {
            "0".to_string()
        } else {
            digits.to_string()
        });
    }

    Some(trimmed.to_string())
}
