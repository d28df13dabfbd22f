use serde::{Deserialize, Serialize};
use serde_json::Value;
use strata_types::{Checksum, ResourceRef};

/// One immutable snapshot of a platform resource at a platform version.
///
/// Snapshots are append-only and unique per (resource, platform version).
/// The checksum is computed over the canonical form of `body` at publish
/// time and never recomputed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlatformSnapshot {
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub platform_version: String,
    pub schema_version: String,
    pub body: Value,
    pub checksum: Checksum,
}

/// Input for publishing a snapshot; the store assigns the checksum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDraft {
    pub resource: ResourceRef,
    pub platform_version: String,
    pub schema_version: String,
    pub body: Value,
}

impl SnapshotDraft {
    pub fn new(
        resource: ResourceRef,
        platform_version: impl Into<String>,
        schema_version: impl Into<String>,
        body: Value,
    ) -> Self {
        Self {
            resource,
            platform_version: platform_version.into(),
            schema_version: schema_version.into(),
            body,
        }
    }
}
