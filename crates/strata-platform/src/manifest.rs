use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::json;
use strata_canon::CanonHasher;
use strata_diff::PatchOp;
use strata_types::{ChangeType, Checksum, ManifestId, ResourceRef, Severity};
use tracing::debug;

use crate::error::{PlatformError, PlatformResult};

/// One declared change to a resource between two platform versions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestChange {
    #[serde(flatten)]
    pub resource: ResourceRef,
    pub change_type: ChangeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_checksum: Option<Checksum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_checksum: Option<Checksum>,
    pub diff: Vec<PatchOp>,
    pub impact_level: Severity,
}

/// Declared set of platform config changes between two platform versions.
///
/// Immutable once registered; the checksum fingerprints the declared
/// change set so downstream consumers can detect tampering.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpgradeManifest {
    pub id: ManifestId,
    pub from_version: String,
    pub to_version: String,
    pub config_changes: Vec<ManifestChange>,
    pub checksum: Checksum,
}

impl UpgradeManifest {
    /// The declared change for a resource, if any.
    pub fn change_for(&self, resource: &ResourceRef) -> Option<&ManifestChange> {
        self.config_changes.iter().find(|c| &c.resource == resource)
    }
}

/// Input for registering a manifest; the store assigns id and checksum.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManifestDraft {
    pub from_version: String,
    pub to_version: String,
    pub config_changes: Vec<ManifestChange>,
}

impl ManifestDraft {
    pub fn new(from_version: impl Into<String>, to_version: impl Into<String>) -> Self {
        Self {
            from_version: from_version.into(),
            to_version: to_version.into(),
            config_changes: Vec::new(),
        }
    }
}

/// Registry of upgrade manifests.
pub trait ManifestStore: Send + Sync {
    /// Register a manifest, assigning its id and checksum.
    fn register(&self, draft: ManifestDraft) -> PlatformResult<UpgradeManifest>;

    /// Read a manifest by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &ManifestId) -> PlatformResult<Option<UpgradeManifest>>;

    /// All registered manifests, ordered by id (creation order).
    fn list(&self) -> PlatformResult<Vec<UpgradeManifest>>;
}

/// In-memory manifest registry.
pub struct InMemoryManifestStore {
    manifests: RwLock<HashMap<ManifestId, UpgradeManifest>>,
}

impl InMemoryManifestStore {
    /// Create a new empty manifest store.
    pub fn new() -> Self {
        Self {
            manifests: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryManifestStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ManifestStore for InMemoryManifestStore {
    fn register(&self, draft: ManifestDraft) -> PlatformResult<UpgradeManifest> {
        let fingerprint = json!({
            "from_version": draft.from_version,
            "to_version": draft.to_version,
            "config_changes": draft.config_changes,
        });
        let checksum = CanonHasher::MANIFEST.checksum(&fingerprint)?;

        let manifest = UpgradeManifest {
            id: ManifestId::new(),
            from_version: draft.from_version,
            to_version: draft.to_version,
            config_changes: draft.config_changes,
            checksum,
        };
        debug!(
            id = %manifest.id,
            from = %manifest.from_version,
            to = %manifest.to_version,
            changes = manifest.config_changes.len(),
            "registered upgrade manifest"
        );

        let mut map = self.manifests.write().expect("lock poisoned");
        map.insert(manifest.id, manifest.clone());
        Ok(manifest)
    }

    fn get(&self, id: &ManifestId) -> PlatformResult<Option<UpgradeManifest>> {
        let map = self.manifests.read().expect("lock poisoned");
        Ok(map.get(id).cloned())
    }

    fn list(&self) -> PlatformResult<Vec<UpgradeManifest>> {
        let map = self.manifests.read().expect("lock poisoned");
        let mut manifests: Vec<UpgradeManifest> = map.values().cloned().collect();
        manifests.sort_by_key(|m| m.id);
        Ok(manifests)
    }
}

impl std::fmt::Debug for InMemoryManifestStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.manifests.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryManifestStore")
            .field("manifest_count", &count)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json as j;

    fn change(key: &str, change_type: ChangeType) -> ManifestChange {
        ManifestChange {
            resource: ResourceRef::new("form", key),
            change_type,
            previous_checksum: None,
            new_checksum: Some(Checksum::from_hash([1; 32])),
            diff: vec![PatchOp::add("/x", j!(1))],
            impact_level: Severity::Low,
        }
    }

    #[test]
    fn register_assigns_id_and_checksum() {
        let store = InMemoryManifestStore::new();
        let mut draft = ManifestDraft::new("1.0.0", "2.0.0");
        draft.config_changes.push(change("intake", ChangeType::Modified));

        let manifest = store.register(draft).unwrap();
        assert_eq!(manifest.from_version, "1.0.0");
        assert_eq!(manifest.to_version, "2.0.0");

        let read = store.get(&manifest.id).unwrap().expect("should exist");
        assert_eq!(read, manifest);
    }

    #[test]
    fn identical_drafts_share_a_checksum_but_not_an_id() {
        let store = InMemoryManifestStore::new();
        let mut draft = ManifestDraft::new("1.0.0", "2.0.0");
        draft.config_changes.push(change("intake", ChangeType::Added));

        let a = store.register(draft.clone()).unwrap();
        let b = store.register(draft).unwrap();
        assert_eq!(a.checksum, b.checksum);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn get_missing_returns_none() {
        let store = InMemoryManifestStore::new();
        assert!(store.get(&ManifestId::new()).unwrap().is_none());
    }

    #[test]
    fn list_is_in_creation_order() {
        let store = InMemoryManifestStore::new();
        let a = store.register(ManifestDraft::new("1", "2")).unwrap();
        let b = store.register(ManifestDraft::new("2", "3")).unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, a.id);
        assert_eq!(listed[1].id, b.id);
    }

    #[test]
    fn change_for_finds_resource() {
        let store = InMemoryManifestStore::new();
        let mut draft = ManifestDraft::new("1", "2");
        draft.config_changes.push(change("a", ChangeType::Added));
        draft.config_changes.push(change("b", ChangeType::Removed));
        let manifest = store.register(draft).unwrap();

        let found = manifest.change_for(&ResourceRef::new("form", "b")).unwrap();
        assert_eq!(found.change_type, ChangeType::Removed);
        assert!(manifest.change_for(&ResourceRef::new("form", "c")).is_none());
    }
}
