use std::collections::HashMap;
use std::sync::RwLock;

use strata_types::{ImpactId, ManifestId, ResourceRef, TenantId};

use crate::error::{ImpactError, ImpactResult};
use crate::record::ImpactRecord;

type Scope = (TenantId, ManifestId, ResourceRef);

/// Storage for impact records.
///
/// Implementations enforce the uniqueness that makes analysis idempotent:
/// at most one record per (tenant, manifest, resource). Records are
/// created and updated, never deleted.
pub trait ImpactStore: Send + Sync {
    /// Insert or replace a record by id.
    ///
    /// Fails with [`ImpactError::DuplicateScope`] if a *different* record
    /// already occupies the same (tenant, manifest, resource) scope.
    fn put(&self, record: ImpactRecord) -> ImpactResult<ImpactRecord>;

    /// Read a record by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &ImpactId) -> ImpactResult<Option<ImpactRecord>>;

    /// The record for one (tenant, manifest, resource) scope, if any.
    fn get_by_scope(
        &self,
        tenant: &TenantId,
        manifest: &ManifestId,
        resource: &ResourceRef,
    ) -> ImpactResult<Option<ImpactRecord>>;

    /// All records for a (tenant, manifest) pair, ordered by resource.
    fn list_for_manifest(
        &self,
        tenant: &TenantId,
        manifest: &ManifestId,
    ) -> ImpactResult<Vec<ImpactRecord>>;
}

#[derive(Default)]
struct ImpactState {
    records: HashMap<ImpactId, ImpactRecord>,
    by_scope: HashMap<Scope, ImpactId>,
}

/// In-memory impact record store for tests and embedding.
pub struct InMemoryImpactStore {
    inner: RwLock<ImpactState>,
}

impl InMemoryImpactStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(ImpactState::default()),
        }
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").records.len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").records.is_empty()
    }
}

impl Default for InMemoryImpactStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ImpactStore for InMemoryImpactStore {
    fn put(&self, record: ImpactRecord) -> ImpactResult<ImpactRecord> {
        let mut state = self.inner.write().expect("lock poisoned");
        let scope: Scope = (
            record.tenant_id.clone(),
            record.manifest_id,
            record.resource.clone(),
        );

        if let Some(occupant) = state.by_scope.get(&scope) {
            if *occupant != record.id {
                return Err(ImpactError::DuplicateScope {
                    resource: record.resource,
                });
            }
        }

        state.by_scope.insert(scope, record.id);
        state.records.insert(record.id, record.clone());
        Ok(record)
    }

    fn get(&self, id: &ImpactId) -> ImpactResult<Option<ImpactRecord>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.records.get(id).cloned())
    }

    fn get_by_scope(
        &self,
        tenant: &TenantId,
        manifest: &ManifestId,
        resource: &ResourceRef,
    ) -> ImpactResult<Option<ImpactRecord>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .by_scope
            .get(&(tenant.clone(), *manifest, resource.clone()))
            .and_then(|id| state.records.get(id))
            .cloned())
    }

    fn list_for_manifest(
        &self,
        tenant: &TenantId,
        manifest: &ManifestId,
    ) -> ImpactResult<Vec<ImpactRecord>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut records: Vec<ImpactRecord> = state
            .records
            .values()
            .filter(|r| &r.tenant_id == tenant && &r.manifest_id == manifest)
            .cloned()
            .collect();
        records.sort_by(|a, b| a.resource.cmp(&b.resource));
        Ok(records)
    }
}

impl std::fmt::Debug for InMemoryImpactStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryImpactStore")
            .field("record_count", &self.len())
            .finish()
    }
}
