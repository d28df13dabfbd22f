use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DiffError;

/// The kind of a patch operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatchKind {
    Add,
    Remove,
    Replace,
}

/// One ordered patch operation.
///
/// `path` is a JSON Pointer (RFC 6901): `""` addresses the document root,
/// `"/a/b"` the key `b` inside object `a`. Segments escape `~` as `~0` and
/// `/` as `~1`. `value` is present for `add`/`replace` and absent for
/// `remove`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PatchOp {
    pub op: PatchKind,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl PatchOp {
    pub fn add(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchKind::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchKind::Remove,
            path: path.into(),
            value: None,
        }
    }

    pub fn replace(path: impl Into<String>, value: Value) -> Self {
        Self {
            op: PatchKind::Replace,
            path: path.into(),
            value: Some(value),
        }
    }
}

impl fmt::Display for PatchOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.op {
            PatchKind::Add => write!(f, "add {}", self.path),
            PatchKind::Remove => write!(f, "remove {}", self.path),
            PatchKind::Replace => write!(f, "replace {}", self.path),
        }
    }
}

/// Escape one pointer segment per RFC 6901.
pub(crate) fn escape_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Unescape one pointer segment per RFC 6901.
pub(crate) fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// Split a JSON Pointer into unescaped segments.
///
/// `""` yields no segments (the root). Any other pointer must start with
/// `/`.
pub(crate) fn parse_pointer(path: &str) -> Result<Vec<String>, DiffError> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(DiffError::InvalidPointer(path.to_string()));
    };
    Ok(rest.split('/').map(unescape_segment).collect())
}

/// Returns `true` if two pointer paths address overlapping regions: equal
/// paths, or one path an ancestor of the other.
pub fn paths_overlap(a: &str, b: &str) -> bool {
    a == b || b.starts_with(&format!("{a}/")) || a.starts_with(&format!("{b}/"))
}
