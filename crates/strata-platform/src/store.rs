use std::collections::HashMap;
use std::sync::RwLock;

use strata_canon::CanonHasher;
use strata_types::ResourceRef;
use tracing::debug;

use crate::error::{PlatformError, PlatformResult};
use crate::snapshot::{PlatformSnapshot, SnapshotDraft};

/// Storage backend for platform configuration snapshots.
///
/// All implementations must satisfy these invariants:
/// - Snapshots are immutable once published; re-publishing the identical
///   body for the same coordinate is a no-op, a different body is an error.
/// - One snapshot per (config type, resource key, platform version).
/// - Reads never mutate.
pub trait PlatformStore: Send + Sync {
    /// Publish a snapshot, computing its checksum.
    ///
    /// Idempotent for identical content; fails with
    /// [`PlatformError::SnapshotImmutable`] if a different body was already
    /// published at the same coordinate.
    fn publish(&self, draft: SnapshotDraft) -> PlatformResult<PlatformSnapshot>;

    /// Read the snapshot for a resource at a platform version.
    ///
    /// Returns `Ok(None)` if no snapshot exists at that coordinate.
    fn get(&self, resource: &ResourceRef, version: &str) -> PlatformResult<Option<PlatformSnapshot>>;

    /// All snapshots published at a platform version, sorted by resource.
    fn list_for_version(&self, version: &str) -> PlatformResult<Vec<PlatformSnapshot>>;

    /// All platform versions a resource was published at, sorted.
    fn versions_of(&self, resource: &ResourceRef) -> PlatformResult<Vec<String>>;
}

/// In-memory, HashMap-based platform store.
///
/// Intended for tests and embedding. All snapshots are held in memory
/// behind a `RwLock` and cloned on read.
pub struct InMemoryPlatformStore {
    snapshots: RwLock<HashMap<(ResourceRef, String), PlatformSnapshot>>,
}

impl InMemoryPlatformStore {
    /// Create a new empty platform store.
    pub fn new() -> Self {
        Self {
            snapshots: RwLock::new(HashMap::new()),
        }
    }

    /// Number of snapshots currently stored.
    pub fn len(&self) -> usize {
        self.snapshots.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.read().expect("lock poisoned").is_empty()
    }
}

impl Default for InMemoryPlatformStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformStore for InMemoryPlatformStore {
    fn publish(&self, draft: SnapshotDraft) -> PlatformResult<PlatformSnapshot> {
        let checksum = CanonHasher::CONFIG.checksum(&draft.body)?;
        let key = (draft.resource.clone(), draft.platform_version.clone());

        let mut map = self.snapshots.write().expect("lock poisoned");
        if let Some(existing) = map.get(&key) {
            if existing.checksum == checksum {
                return Ok(existing.clone());
            }
            return Err(PlatformError::SnapshotImmutable {
                resource: draft.resource,
                version: draft.platform_version,
            });
        }

        let snapshot = PlatformSnapshot {
            resource: draft.resource,
            platform_version: draft.platform_version,
            schema_version: draft.schema_version,
            body: draft.body,
            checksum,
        };
        debug!(
            resource = %snapshot.resource,
            version = %snapshot.platform_version,
            checksum = %snapshot.checksum.short_hex(),
            "published platform snapshot"
        );
        map.insert(key, snapshot.clone());
        Ok(snapshot)
    }

    fn get(
        &self,
        resource: &ResourceRef,
        version: &str,
    ) -> PlatformResult<Option<PlatformSnapshot>> {
        let map = self.snapshots.read().expect("lock poisoned");
        Ok(map
            .get(&(resource.clone(), version.to_string()))
            .cloned())
    }

    fn list_for_version(&self, version: &str) -> PlatformResult<Vec<PlatformSnapshot>> {
        let map = self.snapshots.read().expect("lock poisoned");
        let mut snapshots: Vec<PlatformSnapshot> = map
            .values()
            .filter(|s| s.platform_version == version)
            .cloned()
            .collect();
        snapshots.sort_by(|a, b| a.resource.cmp(&b.resource));
        Ok(snapshots)
    }

    fn versions_of(&self, resource: &ResourceRef) -> PlatformResult<Vec<String>> {
        let map = self.snapshots.read().expect("lock poisoned");
        let mut versions: Vec<String> = map
            .keys()
            .filter(|(r, _)| r == resource)
            .map(|(_, v)| v.clone())
            .collect();
        versions.sort();
        Ok(versions)
    }
}

impl std::fmt::Debug for InMemoryPlatformStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryPlatformStore")
            .field("snapshot_count", &self.len())
            .finish()
    }
}
