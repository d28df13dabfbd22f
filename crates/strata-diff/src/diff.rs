//! Patch computation.

use serde_json::Value;

use crate::op::{escape_segment, PatchOp};

/// Compute the ordered patch transforming `old` into `new`.
///
/// Matching object keys recurse; keys only in `new` emit `add`, keys only
/// in `old` emit `remove`, differing leaves emit `replace`. Arrays and
/// scalars are leaves. Operations are emitted in sorted key order at each
/// level, so the patch for a given pair of bodies is deterministic.
pub fn diff(old: &Value, new: &Value) -> Vec<PatchOp> {
    let mut ops = Vec::new();
    diff_at("", old, new, &mut ops);
    ops
}

fn diff_at(path: &str, old: &Value, new: &Value, ops: &mut Vec<PatchOp>) {
    match (old, new) {
        (Value::Object(old_map), Value::Object(new_map)) => {
            let mut old_keys: Vec<&String> = old_map.keys().collect();
            old_keys.sort();
            for key in old_keys {
                let child = format!("{path}/{}", escape_segment(key));
                match new_map.get(key) {
                    Some(new_val) => {
                        if &old_map[key] != new_val {
                            diff_at(&child, &old_map[key], new_val, ops);
                        }
                    }
                    None => ops.push(PatchOp::remove(child)),
                }
            }

            let mut new_keys: Vec<&String> = new_map.keys().collect();
            new_keys.sort();
            for key in new_keys {
                if !old_map.contains_key(key) {
                    let child = format!("{path}/{}", escape_segment(key));
                    ops.push(PatchOp::add(child, new_map[key].clone()));
                }
            }
        }
        // Arrays, scalars, and type changes are leaves: replace wholesale.
        _ => {
            if old != new {
                ops.push(PatchOp::replace(path, new.clone()));
            }
        }
    }
}
