//! Canonical JSON text.
//!
//! The canonical form of a body is the JSON text produced by sorting object
//! keys lexicographically at every depth. Array order is semantic and is
//! preserved, as are explicit nulls. The canonical text is what gets
//! hashed, so two bodies that differ only in key order checksum equal.

use serde_json::Value;

use crate::error::CanonError;

/// Maximum nesting depth accepted by the canonicalizer.
///
/// `serde_json::Value` cannot be cyclic, so unbounded recursion can only
/// come from an absurdly deep body; anything past this bound is rejected as
/// malformed input rather than risking the stack.
pub const MAX_DEPTH: usize = 128;

/// Produce the canonical JSON text of a body.
pub fn canonical_json(value: &Value) -> Result<String, CanonError> {
    let mut out = String::new();
    write_canonical(value, 0, &mut out)?;
    Ok(out)
}

fn write_canonical(value: &Value, depth: usize, out: &mut String) -> Result<(), CanonError> {
    if depth > MAX_DEPTH {
        return Err(CanonError::TooDeep { max: MAX_DEPTH });
    }

    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_json_string(s, out)?,
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, depth + 1, out)?;
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_json_string(key, out)?;
                out.push(':');
                write_canonical(&map[key], depth + 1, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

fn write_json_string(s: &str, out: &mut String) -> Result<(), CanonError> {
    let quoted =
        serde_json::to_string(s).map_err(|e| CanonError::Serialization(e.to_string()))?;
    out.push_str(&quoted);
    Ok(())
}
