//! Display normalization of raw submission values
//!
//! Composite values are flattened to a comma separated list, line breaks
//! become spaces and any markup is reduced to its text.

use scraper::{ElementRef, Html};
use serde_json::Value;

use super::php_serialized;

/// Separator used when flattening list values
pub const LIST_SEPARATOR: &str = ", ";

/// Deepest composite nesting that is flattened; deeper values are printed raw
const MAX_FLATTEN_DEPTH: usize = php_serialized::MAX_DEPTH;

/// Render a raw field value as a single display line
pub fn normalize_value(value: &Value) -> String {
    let text = flatten(value, 0).replace(['\n', '\r'], " ");
    strip_markup(&text).trim().to_string()
}

fn flatten(value: &Value, depth: usize) -> String {
    if depth >= MAX_FLATTEN_DEPTH {
        return match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
    }

    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => match decode_composite(s) {
            Some(decoded) => flatten(&decoded, depth + 1),
            None => s.clone(),
        },
        Value::Array(items) => join(items.iter(), depth + 1),
        Value::Object(map) => join(map.values(), depth + 1),
    }
}

fn join<'a>(values: impl Iterator<Item = &'a Value>, depth: usize) -> String {
    values
        .map(|value| flatten(value, depth))
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}

/// Decode a string holding a JSON array or a PHP-serialized value
fn decode_composite(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        return serde_json::from_str::<Value>(trimmed)
            .ok()
            .filter(Value::is_array);
    }

    if php_serialized::looks_serialized(trimmed) {
        return php_serialized::unserialize(trimmed);
    }

    None
}

/// Text content of a markup fragment, without script and style bodies
pub fn strip_markup(text: &str) -> String {
    if !text.contains('<') {
        return text.to_string();
    }

    let fragment = Html::parse_fragment(text);
    let mut out = String::with_capacity(text.len());

    // Document order walk with an explicit stack; markup depth is untrusted
    let mut pending: Vec<_> = fragment.root_element().children().rev().collect();
    while let Some(node) = pending.pop() {
        if let Some(el) = ElementRef::wrap(node) {
            if !matches!(el.value().name(), "script" | "style") {
                pending.extend(node.children().rev());
            }
        } else if let Some(txt) = node.value().as_text() {
            out.push_str(txt);
        }
    }

    out
}
