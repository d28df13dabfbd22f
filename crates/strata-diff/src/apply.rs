//! Patch application.

use serde_json::Value;

use crate::error::{DiffError, DiffResult};
use crate::op::{escape_segment, parse_pointer, PatchKind, PatchOp};

/// Apply an ordered patch to a body, returning the transformed body.
///
/// The input body is not mutated. Fails without partial effect on the
/// returned value: the first op that cannot be applied aborts the whole
/// call.
pub fn apply(body: &Value, ops: &[PatchOp]) -> DiffResult<Value> {
    let mut result = body.clone();
    for op in ops {
        apply_one(&mut result, op)?;
    }
    Ok(result)
}

fn apply_one(doc: &mut Value, op: &PatchOp) -> DiffResult<()> {
    let segments = parse_pointer(&op.path)?;

    let Some((last, parents)) = segments.split_last() else {
        // Root pointer: the whole document is the target.
        return match op.op {
            PatchKind::Add | PatchKind::Replace => {
                *doc = required_value(op)?.clone();
                Ok(())
            }
            PatchKind::Remove => Err(DiffError::CannotRemoveRoot),
        };
    };

    let mut current = doc;
    for (i, segment) in parents.iter().enumerate() {
        current = match current {
            Value::Object(map) => {
                map.get_mut(segment).ok_or_else(|| DiffError::PathNotFound {
                    path: pointer_prefix(&segments, i + 1),
                })?
            }
            _ => {
                return Err(DiffError::NotAnObject {
                    path: pointer_prefix(&segments, i),
                })
            }
        };
    }

    let map = current
        .as_object_mut()
        .ok_or_else(|| DiffError::NotAnObject {
            path: op.path.clone(),
        })?;

    match op.op {
        PatchKind::Add => {
            map.insert(last.clone(), required_value(op)?.clone());
        }
        PatchKind::Replace => {
            if !map.contains_key(last) {
                return Err(DiffError::PathNotFound {
                    path: op.path.clone(),
                });
            }
            map.insert(last.clone(), required_value(op)?.clone());
        }
        PatchKind::Remove => {
            map.remove(last).ok_or_else(|| DiffError::PathNotFound {
                path: op.path.clone(),
            })?;
        }
    }
    Ok(())
}

fn required_value(op: &PatchOp) -> DiffResult<&Value> {
    op.value.as_ref().ok_or_else(|| DiffError::MissingValue {
        path: op.path.clone(),
    })
}

fn pointer_prefix(segments: &[String], len: usize) -> String {
    segments[..len]
        .iter()
        .map(|s| format!("/{}", escape_segment(s)))
        .collect()
}

/// Read the value at a pointer path, if present.
pub fn value_at<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_pointer(path).ok()?;
    let mut current = doc;
    for segment in &segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::diff;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn add_and_remove() {
        let body = json!({"a": 1});
        let added = apply(&body, &[PatchOp::add("/b", json!(2))]).unwrap();
        assert_eq!(added, json!({"a": 1, "b": 2}));

        let removed = apply(&added, &[PatchOp::remove("/a")]).unwrap();
        assert_eq!(removed, json!({"b": 2}));
    }

    #[test]
    fn replace_missing_key_fails() {
        let err = apply(&json!({}), &[PatchOp::replace("/x", json!(1))]).unwrap_err();
        assert!(matches!(err, DiffError::PathNotFound { .. }));
    }

    #[test]
    fn remove_missing_key_fails() {
        let err = apply(&json!({}), &[PatchOp::remove("/x")]).unwrap_err();
        assert!(matches!(err, DiffError::PathNotFound { .. }));
    }

    #[test]
    fn descend_through_scalar_fails() {
        let err = apply(&json!({"a": 1}), &[PatchOp::replace("/a/b", json!(2))]).unwrap_err();
        assert!(matches!(err, DiffError::NotAnObject { .. }));
    }

    #[test]
    fn root_replace() {
        let replaced = apply(&json!({"old": true}), &[PatchOp::replace("", json!(42))]).unwrap();
        assert_eq!(replaced, json!(42));
    }

    #[test]
    fn root_remove_is_rejected() {
        let err = apply(&json!(1), &[PatchOp::remove("")]).unwrap_err();
        assert_eq!(err, DiffError::CannotRemoveRoot);
    }

    #[test]
    fn add_without_value_fails() {
        let op = PatchOp {
            op: PatchKind::Add,
            path: "/x".into(),
            value: None,
        };
        let err = apply(&json!({}), &[op]).unwrap_err();
        assert!(matches!(err, DiffError::MissingValue { .. }));
    }

    #[test]
    fn input_body_is_untouched() {
        let body = json!({"a": 1});
        let _ = apply(&body, &[PatchOp::replace("/a", json!(9))]).unwrap();
        assert_eq!(body, json!({"a": 1}));
    }

    #[test]
    fn value_at_walks_nested_objects() {
        let body = json!({"a": {"b": {"c": 3}}});
        assert_eq!(value_at(&body, "/a/b/c"), Some(&json!(3)));
        assert_eq!(value_at(&body, ""), Some(&body));
        assert_eq!(value_at(&body, "/a/missing"), None);
        assert_eq!(value_at(&body, "/a/b/c/d"), None);
    }

    #[test]
    fn escaped_segments_resolve() {
        let body = json!({"a/b": {"~": 1}});
        assert_eq!(value_at(&body, "/a~1b/~0"), Some(&json!(1)));
    }

    #[test]
    fn roundtrip_on_choice_list_change() {
        let v1 = json!({"choices": ["open", "closed"], "label": "Status"});
        let v2 = json!({"choices": ["open", "in_progress", "closed"], "label": "State"});
        assert_eq!(apply(&v1, &diff(&v1, &v2)).unwrap(), v2);
    }

    // Strategy for arbitrary JSON object bodies a few levels deep.
    fn arb_body() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::from),
            any::<i64>().prop_map(Value::from),
            "[a-z0-9]{0,8}".prop_map(Value::from),
            prop::collection::vec(any::<i64>().prop_map(Value::from), 0..4)
                .prop_map(Value::from),
        ];
        leaf.prop_recursive(3, 32, 6, |inner| {
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| Value::from(serde_json::Map::from_iter(m)))
        })
    }

    proptest! {
        #[test]
        fn diff_then_apply_roundtrips(a in arb_body(), b in arb_body()) {
            let patch = diff(&a, &b);
            prop_assert_eq!(apply(&a, &patch).unwrap(), b);
        }

        #[test]
        fn self_diff_is_empty(a in arb_body()) {
            prop_assert!(diff(&a, &a).is_empty());
        }
    }
}
