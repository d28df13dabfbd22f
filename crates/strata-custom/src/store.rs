use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;
use serde_json::Value;
use strata_diff::diff;
use strata_platform::PlatformStore;
use strata_types::{Actor, CustomizationId, CustomizationKind, ResourceRef, TenantId};
use tracing::debug;

use crate::customization::{Customization, CustomizationFilter, NewCustomization};
use crate::error::{CustomError, CustomResult};
use crate::governance::Governance;

/// Versioned storage for tenant customizations.
///
/// All implementations must satisfy these invariants:
/// - At most one active row per (tenant, config type, resource key).
/// - Rows are never edited in place; every update writes version N+1
///   linked via `previous_version_id` and deactivates N.
/// - `version` strictly increases along a chain, so chains cannot cycle.
/// - Writes are optimistic: a write supplying a stale version fails with
///   [`CustomError::VersionConflict`] and is never retried internally.
pub trait CustomizationStore: Send + Sync {
    /// Create the first version of a customization.
    fn create(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        input: NewCustomization,
    ) -> CustomResult<Customization>;

    /// Write version N+1 with a new body, deactivating version N.
    ///
    /// `id` must be the active row and `expected_version` the version the
    /// caller read. `diff_from_base` is recomputed against the platform
    /// body at the row's base version.
    fn update(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        id: &CustomizationId,
        body: Value,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization>;

    /// Write version N+1 that re-bases the customization onto a different
    /// platform version, used when a tenant adopts an upgrade.
    fn rebase(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        id: &CustomizationId,
        body: Value,
        base_platform_version: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization>;

    /// Deactivate the row, reverting the tenant to the platform default
    /// (or to no value at all for kind `New`).
    fn deactivate(
        &self,
        id: &CustomizationId,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization>;

    /// Read one version row by id. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &CustomizationId) -> CustomResult<Option<Customization>>;

    /// The active row for a tenant's resource, if any.
    fn active_for(
        &self,
        tenant: &TenantId,
        resource: &ResourceRef,
    ) -> CustomResult<Option<Customization>>;

    /// List rows matching a filter.
    fn list(&self, filter: &CustomizationFilter) -> CustomResult<Vec<Customization>>;

    /// The version chain starting at `id`, newest first, following
    /// `previous_version_id` to version 1.
    fn version_chain(&self, id: &CustomizationId) -> CustomResult<Vec<Customization>>;
}

#[derive(Default)]
struct CustomState {
    rows: HashMap<CustomizationId, Customization>,
    active: HashMap<(TenantId, ResourceRef), CustomizationId>,
}

/// In-memory customization store for tests and embedding.
pub struct InMemoryCustomizationStore {
    inner: RwLock<CustomState>,
}

impl InMemoryCustomizationStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(CustomState::default()),
        }
    }

    /// Number of version rows (active and inactive).
    pub fn len(&self) -> usize {
        self.inner.read().expect("lock poisoned").rows.len()
    }

    /// Returns `true` if the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.inner.read().expect("lock poisoned").rows.is_empty()
    }

    /// Shared successor-row logic for update/rebase.
    #[allow(clippy::too_many_arguments)]
    fn write_successor(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        id: &CustomizationId,
        body: Value,
        base_platform_version: Option<String>,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization> {
        let mut state = self.inner.write().expect("lock poisoned");

        let current = state
            .rows
            .get(id)
            .cloned()
            .ok_or(CustomError::NotFound { id: *id })?;
        if !current.is_active {
            return Err(CustomError::Inactive { id: *id });
        }
        if current.version != expected_version {
            return Err(CustomError::VersionConflict {
                expected: expected_version,
                current: current.version,
            });
        }

        governance
            .validate_body(&current.resource, &body)
            .map_err(|reason| CustomError::SchemaRejected { reason })?;

        let base_version = base_platform_version.or_else(|| current.base_platform_version.clone());
        let (base_checksum, diff_from_base) = match current.kind {
            CustomizationKind::New => (None, None),
            CustomizationKind::Override | CustomizationKind::Extend => {
                let version = base_version.clone().ok_or(CustomError::MissingBaseVersion {
                    kind: format!("{:?}", current.kind).to_lowercase(),
                })?;
                let snapshot = platform.get(&current.resource, &version)?.ok_or_else(|| {
                    CustomError::SnapshotRequired {
                        resource: current.resource.clone(),
                        version: version.clone(),
                    }
                })?;
                (
                    Some(snapshot.checksum),
                    Some(diff(&snapshot.body, &body)),
                )
            }
        };

        let successor = Customization {
            id: CustomizationId::new(),
            tenant_id: current.tenant_id.clone(),
            resource: current.resource.clone(),
            kind: current.kind,
            base_platform_version: base_version,
            base_checksum,
            body,
            diff_from_base,
            is_active: true,
            version: current.version + 1,
            previous_version_id: Some(current.id),
            created_by: actor.clone(),
            created_at: Utc::now(),
        };
        debug!(
            id = %successor.id,
            tenant = %successor.tenant_id,
            resource = %successor.resource,
            version = successor.version,
            "wrote customization version"
        );

        if let Some(predecessor) = state.rows.get_mut(id) {
            predecessor.is_active = false;
        }
        state.active.insert(
            (successor.tenant_id.clone(), successor.resource.clone()),
            successor.id,
        );
        state.rows.insert(successor.id, successor.clone());
        Ok(successor)
    }
}

impl Default for InMemoryCustomizationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomizationStore for InMemoryCustomizationStore {
    fn create(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        input: NewCustomization,
    ) -> CustomResult<Customization> {
        governance
            .validate_body(&input.resource, &input.body)
            .map_err(|reason| CustomError::SchemaRejected { reason })?;

        let mut state = self.inner.write().expect("lock poisoned");

        let scope = (input.tenant_id.clone(), input.resource.clone());
        if state.active.contains_key(&scope) {
            return Err(CustomError::ActiveCustomizationExists {
                tenant: input.tenant_id.to_string(),
                resource: input.resource,
            });
        }

        let (base_checksum, diff_from_base) = match input.kind {
            CustomizationKind::New => {
                // A "new" resource must not shadow a platform key.
                if let Some(version) = &input.base_platform_version {
                    if platform.get(&input.resource, version)?.is_some() {
                        return Err(CustomError::PlatformKeyCollision {
                            resource: input.resource,
                            version: version.clone(),
                        });
                    }
                }
                (None, None)
            }
            CustomizationKind::Override | CustomizationKind::Extend => {
                let version =
                    input
                        .base_platform_version
                        .clone()
                        .ok_or(CustomError::MissingBaseVersion {
                            kind: format!("{:?}", input.kind).to_lowercase(),
                        })?;
                let snapshot = platform.get(&input.resource, &version)?.ok_or_else(|| {
                    CustomError::SnapshotRequired {
                        resource: input.resource.clone(),
                        version: version.clone(),
                    }
                })?;
                if input.kind == CustomizationKind::Extend
                    && !governance.is_extensible(&input.resource)
                {
                    return Err(CustomError::NotExtensible {
                        resource: input.resource,
                    });
                }
                (
                    Some(snapshot.checksum),
                    Some(diff(&snapshot.body, &input.body)),
                )
            }
        };

        let customization = Customization {
            id: CustomizationId::new(),
            tenant_id: input.tenant_id,
            resource: input.resource,
            kind: input.kind,
            base_platform_version: input.base_platform_version,
            base_checksum,
            body: input.body,
            diff_from_base,
            is_active: true,
            version: 1,
            previous_version_id: None,
            created_by: input.created_by,
            created_at: Utc::now(),
        };
        debug!(
            id = %customization.id,
            tenant = %customization.tenant_id,
            resource = %customization.resource,
            kind = ?customization.kind,
            "created customization"
        );

        state.active.insert(scope, customization.id);
        state.rows.insert(customization.id, customization.clone());
        Ok(customization)
    }

    fn update(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        id: &CustomizationId,
        body: Value,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization> {
        self.write_successor(platform, governance, id, body, None, expected_version, actor)
    }

    fn rebase(
        &self,
        platform: &dyn PlatformStore,
        governance: &dyn Governance,
        id: &CustomizationId,
        body: Value,
        base_platform_version: &str,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization> {
        self.write_successor(
            platform,
            governance,
            id,
            body,
            Some(base_platform_version.to_string()),
            expected_version,
            actor,
        )
    }

    fn deactivate(
        &self,
        id: &CustomizationId,
        expected_version: u64,
        actor: &Actor,
    ) -> CustomResult<Customization> {
        let mut state = self.inner.write().expect("lock poisoned");

        let current = state
            .rows
            .get(id)
            .cloned()
            .ok_or(CustomError::NotFound { id: *id })?;
        if !current.is_active {
            return Err(CustomError::Inactive { id: *id });
        }
        if current.version != expected_version {
            return Err(CustomError::VersionConflict {
                expected: expected_version,
                current: current.version,
            });
        }

        let row = state.rows.get_mut(id).expect("row exists");
        row.is_active = false;
        let deactivated = row.clone();
        state
            .active
            .remove(&(deactivated.tenant_id.clone(), deactivated.resource.clone()));
        debug!(
            id = %deactivated.id,
            tenant = %deactivated.tenant_id,
            resource = %deactivated.resource,
            by = %actor,
            "deactivated customization"
        );
        Ok(deactivated)
    }

    fn get(&self, id: &CustomizationId) -> CustomResult<Option<Customization>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.rows.get(id).cloned())
    }

    fn active_for(
        &self,
        tenant: &TenantId,
        resource: &ResourceRef,
    ) -> CustomResult<Option<Customization>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state
            .active
            .get(&(tenant.clone(), resource.clone()))
            .and_then(|id| state.rows.get(id))
            .cloned())
    }

    fn list(&self, filter: &CustomizationFilter) -> CustomResult<Vec<Customization>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut rows: Vec<Customization> = state
            .rows
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        rows.sort_by_key(|c| c.id);
        Ok(rows)
    }

    fn version_chain(&self, id: &CustomizationId) -> CustomResult<Vec<Customization>> {
        let state = self.inner.read().expect("lock poisoned");
        let mut chain = Vec::new();
        let mut cursor = Some(*id);
        while let Some(current_id) = cursor {
            let row = state
                .rows
                .get(&current_id)
                .cloned()
                .ok_or(CustomError::NotFound { id: current_id })?;
            cursor = row.previous_version_id;
            chain.push(row);
        }
        Ok(chain)
    }
}

impl std::fmt::Debug for InMemoryCustomizationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCustomizationStore")
            .field("row_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governance::AllowAll;
    use serde_json::json;
    use strata_platform::{InMemoryPlatformStore, SnapshotDraft};

    fn platform_with(key: &str, version: &str, body: Value) -> InMemoryPlatformStore {
        let store = InMemoryPlatformStore::new();
        store
            .publish(SnapshotDraft::new(
                ResourceRef::new("form", key),
                version,
                "1",
                body,
            ))
            .unwrap();
        store
    }

    fn override_input(key: &str, body: Value) -> NewCustomization {
        NewCustomization {
            tenant_id: TenantId::new("acme"),
            resource: ResourceRef::new("form", key),
            kind: CustomizationKind::Override,
            base_platform_version: Some("1.0.0".into()),
            body,
            created_by: Actor::new("alice"),
        }
    }

    struct Frozen;

    impl Governance for Frozen {
        fn is_extensible(&self, _resource: &ResourceRef) -> bool {
            false
        }
        fn validate_body(&self, _resource: &ResourceRef, _body: &Value) -> Result<(), String> {
            Ok(())
        }
    }

    struct RejectAll;

    impl Governance for RejectAll {
        fn is_extensible(&self, _resource: &ResourceRef) -> bool {
            true
        }
        fn validate_body(&self, _resource: &ResourceRef, _body: &Value) -> Result<(), String> {
            Err("schema says no".into())
        }
    }

    // -----------------------------------------------------------------------
    // Create
    // -----------------------------------------------------------------------

    #[test]
    fn create_override_computes_base_fields() {
        let platform = platform_with("intake", "1.0.0", json!({"a": 1}));
        let store = InMemoryCustomizationStore::new();

        let created = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 2})))
            .unwrap();
        assert_eq!(created.version, 1);
        assert!(created.is_active);
        assert!(created.base_checksum.is_some());
        let diff = created.diff_from_base.as_ref().unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/a");
    }

    #[test]
    fn create_override_without_snapshot_fails() {
        let platform = InMemoryPlatformStore::new();
        let store = InMemoryCustomizationStore::new();
        let err = store
            .create(&platform, &AllowAll, override_input("intake", json!({})))
            .unwrap_err();
        assert!(matches!(err, CustomError::SnapshotRequired { .. }));
    }

    #[test]
    fn create_override_without_base_version_fails() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let mut input = override_input("intake", json!({}));
        input.base_platform_version = None;
        let err = store.create(&platform, &AllowAll, input).unwrap_err();
        assert!(matches!(err, CustomError::MissingBaseVersion { .. }));
    }

    #[test]
    fn duplicate_active_row_is_rejected() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        let err = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 2})))
            .unwrap_err();
        assert!(matches!(err, CustomError::ActiveCustomizationExists { .. }));
    }

    #[test]
    fn extend_requires_extensibility() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let mut input = override_input("intake", json!({"extra": 1}));
        input.kind = CustomizationKind::Extend;

        let err = store.create(&platform, &Frozen, input.clone()).unwrap_err();
        assert!(matches!(err, CustomError::NotExtensible { .. }));

        assert!(store.create(&platform, &AllowAll, input).is_ok());
    }

    #[test]
    fn new_kind_has_no_base() {
        let platform = InMemoryPlatformStore::new();
        let store = InMemoryCustomizationStore::new();
        let created = store
            .create(
                &platform,
                &AllowAll,
                NewCustomization {
                    tenant_id: TenantId::new("acme"),
                    resource: ResourceRef::new("form", "tenant_only"),
                    kind: CustomizationKind::New,
                    base_platform_version: Some("1.0.0".into()),
                    body: json!({"mine": true}),
                    created_by: Actor::new("alice"),
                },
            )
            .unwrap();
        assert!(created.base_checksum.is_none());
        assert!(created.diff_from_base.is_none());
    }

    #[test]
    fn new_kind_rejects_platform_key_collision() {
        let platform = platform_with("taken", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let err = store
            .create(
                &platform,
                &AllowAll,
                NewCustomization {
                    tenant_id: TenantId::new("acme"),
                    resource: ResourceRef::new("form", "taken"),
                    kind: CustomizationKind::New,
                    base_platform_version: Some("1.0.0".into()),
                    body: json!({}),
                    created_by: Actor::new("alice"),
                },
            )
            .unwrap_err();
        assert!(matches!(err, CustomError::PlatformKeyCollision { .. }));
    }

    #[test]
    fn governance_schema_rejection_propagates() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let err = store
            .create(&platform, &RejectAll, override_input("intake", json!({})))
            .unwrap_err();
        assert!(matches!(err, CustomError::SchemaRejected { .. }));
    }

    // -----------------------------------------------------------------------
    // Update / optimistic concurrency
    // -----------------------------------------------------------------------

    #[test]
    fn update_writes_successor_and_deactivates_predecessor() {
        let platform = platform_with("intake", "1.0.0", json!({"a": 1}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 2})))
            .unwrap();

        let v2 = store
            .update(
                &platform,
                &AllowAll,
                &v1.id,
                json!({"a": 3}),
                1,
                &Actor::new("bob"),
            )
            .unwrap();
        assert_eq!(v2.version, 2);
        assert_eq!(v2.previous_version_id, Some(v1.id));
        assert!(v2.is_active);
        assert_eq!(v2.created_by, Actor::new("bob"));

        let old = store.get(&v1.id).unwrap().unwrap();
        assert!(!old.is_active);

        let active = store
            .active_for(&TenantId::new("acme"), &ResourceRef::new("form", "intake"))
            .unwrap()
            .unwrap();
        assert_eq!(active.id, v2.id);
    }

    #[test]
    fn update_recomputes_diff_from_base() {
        let platform = platform_with("intake", "1.0.0", json!({"a": 1, "b": 2}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 9, "b": 2})))
            .unwrap();

        let v2 = store
            .update(
                &platform,
                &AllowAll,
                &v1.id,
                json!({"a": 1, "b": 7}),
                1,
                &Actor::new("bob"),
            )
            .unwrap();
        let diff = v2.diff_from_base.as_ref().unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/b");
    }

    #[test]
    fn stale_update_fails_with_current_version() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        store
            .update(&platform, &AllowAll, &v1.id, json!({"a": 2}), 1, &Actor::new("bob"))
            .unwrap();

        // Second writer still holds version 1 of a now-inactive row.
        let err = store
            .update(&platform, &AllowAll, &v1.id, json!({"a": 3}), 1, &Actor::new("carol"))
            .unwrap_err();
        assert!(matches!(err, CustomError::Inactive { .. }));
    }

    #[test]
    fn wrong_expected_version_fails() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        let err = store
            .update(&platform, &AllowAll, &v1.id, json!({"a": 2}), 7, &Actor::new("bob"))
            .unwrap_err();
        assert_eq!(
            err,
            CustomError::VersionConflict {
                expected: 7,
                current: 1
            }
        );
    }

    #[test]
    fn rebase_moves_base_version() {
        let platform = platform_with("intake", "1.0.0", json!({"a": 1}));
        platform
            .publish(SnapshotDraft::new(
                ResourceRef::new("form", "intake"),
                "2.0.0",
                "1",
                json!({"a": 1, "b": 2}),
            ))
            .unwrap();
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 5})))
            .unwrap();

        let v2 = store
            .rebase(
                &platform,
                &AllowAll,
                &v1.id,
                json!({"a": 5, "b": 2}),
                "2.0.0",
                1,
                &Actor::system(),
            )
            .unwrap();
        assert_eq!(v2.base_platform_version.as_deref(), Some("2.0.0"));
        let diff = v2.diff_from_base.as_ref().unwrap();
        assert_eq!(diff.len(), 1);
        assert_eq!(diff[0].path, "/a");
    }

    // -----------------------------------------------------------------------
    // Deactivate
    // -----------------------------------------------------------------------

    #[test]
    fn deactivate_reverts_to_platform_default() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();

        let deactivated = store.deactivate(&v1.id, 1, &Actor::new("alice")).unwrap();
        assert!(!deactivated.is_active);
        assert!(store
            .active_for(&TenantId::new("acme"), &ResourceRef::new("form", "intake"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn deactivate_twice_fails() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({})))
            .unwrap();
        store.deactivate(&v1.id, 1, &Actor::new("alice")).unwrap();
        let err = store.deactivate(&v1.id, 1, &Actor::new("alice")).unwrap_err();
        assert!(matches!(err, CustomError::Inactive { .. }));
    }

    #[test]
    fn recreate_after_deactivation_is_allowed() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        store.deactivate(&v1.id, 1, &Actor::new("alice")).unwrap();

        assert!(store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 2})))
            .is_ok());
    }

    // -----------------------------------------------------------------------
    // Chains and listing
    // -----------------------------------------------------------------------

    #[test]
    fn version_chain_walks_newest_first() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        let v2 = store
            .update(&platform, &AllowAll, &v1.id, json!({"a": 2}), 1, &Actor::new("b"))
            .unwrap();
        let v3 = store
            .update(&platform, &AllowAll, &v2.id, json!({"a": 3}), 2, &Actor::new("b"))
            .unwrap();

        let chain = store.version_chain(&v3.id).unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain[0].id, v3.id);
        assert_eq!(chain[1].id, v2.id);
        assert_eq!(chain[2].id, v1.id);
        // Version strictly decreases along the walk.
        assert!(chain.windows(2).all(|w| w[0].version > w[1].version));
    }

    #[test]
    fn list_filters_by_tenant_and_active() {
        let platform = platform_with("intake", "1.0.0", json!({}));
        let store = InMemoryCustomizationStore::new();
        let v1 = store
            .create(&platform, &AllowAll, override_input("intake", json!({"a": 1})))
            .unwrap();
        store
            .update(&platform, &AllowAll, &v1.id, json!({"a": 2}), 1, &Actor::new("b"))
            .unwrap();

        let all = store.list(&CustomizationFilter::default()).unwrap();
        assert_eq!(all.len(), 2);

        let active = store
            .list(&CustomizationFilter {
                active_only: true,
                ..CustomizationFilter::default()
            })
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].version, 2);
    }
}
