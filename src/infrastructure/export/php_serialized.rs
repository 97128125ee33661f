//! Decoder for PHP `serialize()` output
//!
//! Form hosts store list answers (checkbox groups, multi-selects) in this
//! encoding. Arrays decode to JSON arrays of their values; keys are dropped.

use serde_json::{Number, Value};

/// Deepest array nesting accepted, matching serde_json's recursion limit
pub const MAX_DEPTH: usize = 128;

/// Decode a serialized value, `None` when the input is not one or nests
/// arrays deeper than [`MAX_DEPTH`]
pub fn unserialize(input: &str) -> Option<Value> {
    let mut parser = Parser {
        bytes: input.trim().as_bytes(),
        pos: 0,
        depth: 0,
    };

    let value = parser.value()?;
    (parser.pos == parser.bytes.len()).then_some(value)
}

/// Cheap check for the shape of a serialized value
pub fn looks_serialized(input: &str) -> bool {
    let trimmed = input.trim();

    if trimmed == "N;" {
        return true;
    }

    let bytes = trimmed.as_bytes();
    bytes.len() >= 4
        && matches!(bytes[0], b'a' | b's' | b'i' | b'd' | b'b')
        && bytes[1] == b':'
        && matches!(bytes[bytes.len() - 1], b';' | b'}')
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn value(&mut self) -> Option<Value> {
        match self.next()? {
            b'N' => {
                self.expect(b';')?;
                Some(Value::Null)
            }
            b'b' => {
                self.expect(b':')?;
                match self.until(b';')? {
                    "0" => Some(Value::Bool(false)),
                    "1" => Some(Value::Bool(true)),
                    _ => None,
                }
            }
            b'i' => {
                self.expect(b':')?;
                self.until(b';')?.parse::<i64>().ok().map(Value::from)
            }
            b'd' => {
                self.expect(b':')?;
                let raw = self.until(b';')?;
                let float = raw.parse::<f64>().ok()?;
                Some(
                    Number::from_f64(float)
                        .map(Value::Number)
                        .unwrap_or_else(|| Value::String(raw.to_string())),
                )
            }
            b's' => {
                self.expect(b':')?;
                let len = self.until(b':')?.parse::<usize>().ok()?;
                self.expect(b'"')?;
                let end = self.pos.checked_add(len)?;
                let text = std::str::from_utf8(self.bytes.get(self.pos..end)?).ok()?;
                self.pos = end;
                self.expect(b'"')?;
                self.expect(b';')?;
                Some(Value::String(text.to_string()))
            }
            b'a' => {
                if self.depth >= MAX_DEPTH {
                    return None;
                }

                self.expect(b':')?;
                let count = self.until(b':')?.parse::<usize>().ok()?;
                self.expect(b'{')?;

                self.depth += 1;
                let items = self.array_items(count)?;
                self.depth -= 1;

                self.expect(b'}')?;
                Some(Value::Array(items))
            }
            _ => None,
        }
    }

    fn array_items(&mut self, count: usize) -> Option<Vec<Value>> {
        let mut items = Vec::with_capacity(count.min(64));

        for _ in 0..count {
            match self.value()? {
                Value::Number(_) | Value::String(_) => {}
                _ => return None,
            }
            items.push(self.value()?);
        }

        Some(items)
    }

    fn next(&mut self) -> Option<u8> {
        let byte = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    fn expect(&mut self, byte: u8) -> Option<()> {
        (self.next()? == byte).then_some(())
    }

    fn until(&mut self, delimiter: u8) -> Option<&'a str> {
        let bytes: &'a [u8] = self.bytes;
        let rest = bytes.get(self.pos..)?;
        let offset = rest.iter().position(|&b| b == delimiter)?;
        let text = std::str::from_utf8(&rest[..offset]).ok()?;
        self.pos += offset + 1;
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unserialize_list() {
        let raw = r#"a:2:{i:0;s:3:"Red";i:1;s:4:"Blue";}"#;
        assert_eq!(unserialize(raw), Some(json!(["Red", "Blue"])));
    }

    #[test]
    fn test_unserialize_keyed_array_drops_keys() {
        let raw = r#"a:2:{s:5:"first";s:3:"Ada";s:4:"last";s:8:"Lovelace";}"#;
        assert_eq!(unserialize(raw), Some(json!(["Ada", "Lovelace"])));
    }

    #[test]
    fn test_unserialize_string_with_delimiters() {
        let raw = r#"s:7:"a;b:"c}";"#;
        assert_eq!(unserialize(raw), Some(json!("a;b:\"c}")));
    }

    #[test]
    fn test_unserialize_multibyte_length_is_bytes() {
        let raw = "s:5:\"café\";";
        assert_eq!(unserialize(raw), Some(json!("café")));
    }

    #[test]
    fn test_unserialize_scalars() {
        assert_eq!(unserialize("i:42;"), Some(json!(42)));
        assert_eq!(unserialize("b:1;"), Some(json!(true)));
        assert_eq!(unserialize("d:1.5;"), Some(json!(1.5)));
        assert_eq!(unserialize("N;"), Some(Value::Null));
    }

    #[test]
    fn test_unserialize_rejects_malformed() {
        assert_eq!(unserialize("a:2:{i:0;s:3:\"Red\";}"), None);
        assert_eq!(unserialize("s:10:\"short\";"), None);
        assert_eq!(unserialize("i:42; trailing"), None);
        assert_eq!(unserialize("plain text"), None);
    }

    fn nested(depth: usize) -> String {
        format!(
            "{}s:1:\"x\";{}",
            "a:1:{i:0;".repeat(depth),
            "}".repeat(depth)
        )
    }

    #[test]
    fn test_unserialize_nested_arrays_within_limit() {
        assert_eq!(unserialize(&nested(2)), Some(json!([["x"]])));
        assert!(unserialize(&nested(MAX_DEPTH)).is_some());
    }

    #[test]
    fn test_unserialize_rejects_excessive_nesting() {
        assert_eq!(unserialize(&nested(MAX_DEPTH + 1)), None);
        assert_eq!(unserialize(&nested(20_000)), None);
    }

    #[test]
    fn test_looks_serialized() {
        assert!(looks_serialized("a:1:{i:0;s:1:\"x\";}"));
        assert!(looks_serialized("N;"));
        assert!(!looks_serialized("hello"));
        assert!(!looks_serialized("Note: ok;"));
    }
}
