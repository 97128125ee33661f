//! Resolved field label map

use serde::Serialize;

/// Ordered field key → display label mapping for one export
///
/// Inserting an existing key replaces its label in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolvedFieldMap {
    entries: Vec<(String, String)>,
}

impl ResolvedFieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, label: impl Into<String>) {
        let key = key.into();
        let label = label.into();

        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = label,
            None => self.entries.push((key, label)),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, label)| label.as_str())
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Move a key to the first position, keeping the order of the rest
    pub fn move_to_front(&mut self, key: &str) {
        if let Some(index) = self.entries.iter().position(|(k, _)| k == key) {
            let entry = self.entries.remove(index);
            self.entries.insert(0, entry);
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, l)| (k.as_str(), l.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Display label for a field key that has no declared label
///
/// Leading underscores are dropped and underscores become spaces. Every
/// word gets an upper-case first letter, where a word starts after a space,
/// tab, line feed, carriage return, form feed or vertical tab.
pub fn humanize_key(key: &str) -> String {
    let spaced = key.trim_start_matches('_').replace('_', " ");
    let mut out = String::with_capacity(spaced.len());
    let mut word_start = true;

    for c in spaced.chars() {
        if word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        word_start = is_word_delimiter(c);
    }

    out.trim().to_string()
}

fn is_word_delimiter(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0C' | '\x0B')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_key() {
        assert_eq!(humanize_key("_custom_note"), "Custom Note");
        assert_eq!(humanize_key("date_submitted"), "Date Submitted");
        assert_eq!(humanize_key("_seq_num"), "Seq Num");
        assert_eq!(humanize_key("__form_id"), "Form Id");
        assert_eq!(humanize_key("email"), "Email");
    }

    #[test]
    fn test_humanize_key_keeps_inner_case() {
        assert_eq!(humanize_key("zipCode"), "ZipCode");
        assert_eq!(humanize_key("utm_SOURCE"), "Utm SOURCE");
    }

    #[test]
    fn test_humanize_key_words_start_after_any_blank() {
        assert_eq!(humanize_key("first\tname"), "First\tName");
        assert_eq!(humanize_key("a\nb\rc"), "A\nB\rC");
        assert_eq!(humanize_key("x\x0Cy\x0Bz"), "X\x0CY\x0BZ");
        assert_eq!(humanize_key("two  spaces"), "Two  Spaces");
    }

    #[test]
    fn test_humanize_key_trims_trailing_separators() {
        assert_eq!(humanize_key("notes_"), "Notes");
        assert_eq!(humanize_key("___"), "");
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = ResolvedFieldMap::new();
        map.insert("a", "A");
        map.insert("b", "B");
        map.insert("a", "Alpha");

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("a", "Alpha"), ("b", "B")]);
    }

    #[test]
    fn test_move_to_front_preserves_rest() {
        let mut map = ResolvedFieldMap::new();
        map.insert("a", "A");
        map.insert("b", "B");
        map.insert("c", "C");
        map.move_to_front("c");

        let keys: Vec<_> = map.keys().collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_remove() {
        let mut map = ResolvedFieldMap::new();
        map.insert("a", "A");

        assert_eq!(map.remove("a"), Some("A".to_string()));
        assert_eq!(map.remove("a"), None);
        assert!(map.is_empty());
    }
}
