//! The per-tenant platform version marker and the upgrade gate.
//!
//! Each tenant has one versioned marker row naming the platform version it
//! currently runs. The marker moves only inside [`apply_upgrade`], and only
//! after every blocking impact record for the manifest is settled, so the
//! recorded version never gets ahead of the tenant's actual decisions.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::RwLock;

use strata_history::{ChangeKind, ChangeLog, EntityType, HistoryDraft};
use strata_impact::ImpactStore;
use strata_platform::UpgradeManifest;
use strata_types::{Actor, ImpactId, TenantId};
use tracing::info;

use crate::error::{ResolveError, ResolveResult};

/// The single versioned row recording a tenant's current platform version.
///
/// `marker_version` is the optimistic-concurrency token: every advance
/// supplies the value it read and increments it, so two concurrent
/// upgrades for one tenant cannot both win.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantVersionMarker {
    pub tenant_id: TenantId,
    pub current_version: String,
    pub marker_version: u64,
}

/// Storage for tenant version markers.
pub trait TenantVersionStore: Send + Sync {
    /// The marker for a tenant, if one was ever written.
    fn get(&self, tenant: &TenantId) -> ResolveResult<Option<TenantVersionMarker>>;

    /// Compare-and-set advance of the marker.
    ///
    /// `expected_marker` is the `marker_version` the caller read, or 0 when
    /// no marker exists yet. A tenant whose marker sits at a different
    /// platform version than `from_version` fails with
    /// [`ResolveError::VersionSkew`]; a stale `expected_marker` fails with
    /// [`ResolveError::MarkerConflict`].
    fn advance(
        &self,
        tenant: &TenantId,
        from_version: &str,
        to_version: &str,
        expected_marker: u64,
    ) -> ResolveResult<TenantVersionMarker>;
}

/// In-memory tenant version markers for tests and embedding.
pub struct InMemoryTenantVersionStore {
    markers: RwLock<HashMap<TenantId, TenantVersionMarker>>,
}

impl InMemoryTenantVersionStore {
    /// Create a new empty marker store.
    pub fn new() -> Self {
        Self {
            markers: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTenantVersionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TenantVersionStore for InMemoryTenantVersionStore {
    fn get(&self, tenant: &TenantId) -> ResolveResult<Option<TenantVersionMarker>> {
        let markers = self.markers.read().expect("lock poisoned");
        Ok(markers.get(tenant).cloned())
    }

    fn advance(
        &self,
        tenant: &TenantId,
        from_version: &str,
        to_version: &str,
        expected_marker: u64,
    ) -> ResolveResult<TenantVersionMarker> {
        let mut markers = self.markers.write().expect("lock poisoned");
        let current = markers.get(tenant);

        match current {
            None if expected_marker != 0 => Err(ResolveError::MarkerConflict {
                expected: expected_marker,
                current: 0,
            }),
            None => {
                let marker = TenantVersionMarker {
                    tenant_id: tenant.clone(),
                    current_version: to_version.to_string(),
                    marker_version: 1,
                };
                markers.insert(tenant.clone(), marker.clone());
                Ok(marker)
            }
            Some(existing) => {
                if existing.marker_version != expected_marker {
                    return Err(ResolveError::MarkerConflict {
                        expected: expected_marker,
                        current: existing.marker_version,
                    });
                }
                if existing.current_version != from_version {
                    return Err(ResolveError::VersionSkew {
                        current: existing.current_version.clone(),
                        expected: from_version.to_string(),
                    });
                }
                let marker = TenantVersionMarker {
                    tenant_id: tenant.clone(),
                    current_version: to_version.to_string(),
                    marker_version: existing.marker_version + 1,
                };
                markers.insert(tenant.clone(), marker.clone());
                Ok(marker)
            }
        }
    }
}

impl std::fmt::Debug for InMemoryTenantVersionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.markers.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryTenantVersionStore")
            .field("marker_count", &count)
            .finish()
    }
}

/// Advance a tenant onto a manifest's target platform version.
///
/// Fails with the full blocker list while any high or critical impact
/// record for this (tenant, manifest) is non-terminal, leaving all state
/// untouched. On success the marker is advanced with a compare-and-set and
/// one history entry records the move.
///
/// A tenant with no marker yet is taken to be at the manifest's
/// `from_version`; its first successful upgrade writes the initial marker.
pub fn apply_upgrade(
    impacts: &dyn ImpactStore,
    versions: &dyn TenantVersionStore,
    history: &dyn ChangeLog,
    tenant: &TenantId,
    manifest: &UpgradeManifest,
    actor: &Actor,
) -> ResolveResult<TenantVersionMarker> {
    let before = versions.get(tenant)?;
    if let Some(marker) = &before {
        if marker.current_version != manifest.from_version {
            return Err(ResolveError::VersionSkew {
                current: marker.current_version.clone(),
                expected: manifest.from_version.clone(),
            });
        }
    }

    let blockers: Vec<ImpactId> = impacts
        .list_for_manifest(tenant, &manifest.id)?
        .iter()
        .filter(|r| r.is_blocking())
        .map(|r| r.id)
        .collect();
    if !blockers.is_empty() {
        return Err(ResolveError::BlockedByImpacts { blockers });
    }

    let expected_marker = before.as_ref().map_or(0, |m| m.marker_version);
    let advanced = versions.advance(
        tenant,
        &manifest.from_version,
        &manifest.to_version,
        expected_marker,
    )?;
    info!(
        tenant = %tenant,
        from = %manifest.from_version,
        to = %manifest.to_version,
        "applied platform upgrade"
    );

    let change_kind = if before.is_some() {
        ChangeKind::Update
    } else {
        ChangeKind::Create
    };
    let mut draft = HistoryDraft::new(
        EntityType::TenantVersion,
        tenant.to_string(),
        change_kind,
        actor.clone(),
    )
    .with_after(to_state(&advanced)?);
    if let Some(marker) = before {
        draft = draft.with_before(to_state(&marker)?);
    }
    history.append(draft)?;

    Ok(advanced)
}

fn to_state<T: serde::Serialize>(value: &T) -> ResolveResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| ResolveError::Serialization(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use strata_custom::{
        AllowAll, CustomizationStore, InMemoryCustomizationStore, NewCustomization,
    };
    use strata_history::{HistoryFilter, InMemoryChangeLog};
    use strata_impact::{analyze_manifest, InMemoryImpactStore};
    use strata_platform::{
        build_manifest, InMemoryManifestStore, InMemoryPlatformStore, ManifestStore, PlatformStore,
        SnapshotDraft,
    };
    use strata_types::{CustomizationKind, ResolutionChoice, ResourceRef};

    use crate::resolver::{Resolution, Resolver};

    struct Fixture {
        platform: InMemoryPlatformStore,
        manifests: InMemoryManifestStore,
        customizations: InMemoryCustomizationStore,
        impacts: InMemoryImpactStore,
        history: InMemoryChangeLog,
        versions: InMemoryTenantVersionStore,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                platform: InMemoryPlatformStore::new(),
                manifests: InMemoryManifestStore::new(),
                customizations: InMemoryCustomizationStore::new(),
                impacts: InMemoryImpactStore::new(),
                history: InMemoryChangeLog::new(),
                versions: InMemoryTenantVersionStore::new(),
            }
        }

        fn publish(&self, key: &str, version: &str, body: serde_json::Value) {
            self.platform
                .publish(SnapshotDraft::new(
                    ResourceRef::new("form", key),
                    version,
                    "1",
                    body,
                ))
                .unwrap();
        }

        fn manifest(&self) -> UpgradeManifest {
            let draft = build_manifest(&self.platform, "1.0.0", "2.0.0").unwrap();
            self.manifests.register(draft).unwrap()
        }

        fn analyze(&self, manifest: &UpgradeManifest) {
            analyze_manifest(
                &self.platform,
                &self.customizations,
                &self.impacts,
                &self.history,
                &TenantId::new("acme"),
                manifest,
                false,
                &Actor::new("operator"),
            )
            .unwrap();
        }

        fn apply(&self, manifest: &UpgradeManifest) -> ResolveResult<TenantVersionMarker> {
            apply_upgrade(
                &self.impacts,
                &self.versions,
                &self.history,
                &TenantId::new("acme"),
                manifest,
                &Actor::new("operator"),
            )
        }
    }

    /// Publishes a resource whose removal leaves a critical open record.
    fn blocked_fixture() -> (Fixture, UpgradeManifest) {
        let fx = Fixture::new();
        fx.publish("legacy", "1.0.0", json!({"a": 1}));
        fx.publish("anchor", "1.0.0", json!({}));
        fx.publish("anchor", "2.0.0", json!({"b": 1}));
        fx.customizations
            .create(
                &fx.platform,
                &AllowAll,
                NewCustomization {
                    tenant_id: TenantId::new("acme"),
                    resource: ResourceRef::new("form", "legacy"),
                    kind: CustomizationKind::Override,
                    base_platform_version: Some("1.0.0".into()),
                    body: json!({"a": 2}),
                    created_by: Actor::new("alice"),
                },
            )
            .unwrap();
        let manifest = fx.manifest();
        fx.analyze(&manifest);
        (fx, manifest)
    }

    #[test]
    fn first_upgrade_writes_the_marker() {
        let fx = Fixture::new();
        fx.publish("intake", "1.0.0", json!({"a": 1}));
        fx.publish("intake", "2.0.0", json!({"a": 2}));
        let manifest = fx.manifest();
        fx.analyze(&manifest);

        let marker = fx.apply(&manifest).unwrap();
        assert_eq!(marker.current_version, "2.0.0");
        assert_eq!(marker.marker_version, 1);
        assert_eq!(
            fx.versions.get(&TenantId::new("acme")).unwrap(),
            Some(marker)
        );
    }

    #[test]
    fn blocked_upgrade_fails_with_no_state_change() {
        let (fx, manifest) = blocked_fixture();

        let err = fx.apply(&manifest).unwrap_err();
        let ResolveError::BlockedByImpacts { blockers } = err else {
            panic!("expected blocker list, got {err:?}");
        };
        assert_eq!(blockers.len(), 1);
        assert!(fx.versions.get(&TenantId::new("acme")).unwrap().is_none());
    }

    #[test]
    fn settling_the_blocker_unblocks_the_upgrade() {
        let (fx, manifest) = blocked_fixture();
        let blocker = fx
            .impacts
            .list_for_manifest(&TenantId::new("acme"), &manifest.id)
            .unwrap()
            .remove(0);

        let resolver = Resolver::new(
            &fx.platform,
            &fx.manifests,
            &fx.customizations,
            &AllowAll,
            &fx.impacts,
            &fx.history,
        );
        resolver
            .resolve_impact(
                &blocker.id,
                Resolution::new(ResolutionChoice::UsePlatform),
                &Actor::new("operator"),
            )
            .unwrap();

        let marker = fx.apply(&manifest).unwrap();
        assert_eq!(marker.current_version, "2.0.0");
    }

    #[test]
    fn version_skew_is_rejected() {
        let fx = Fixture::new();
        fx.publish("intake", "1.0.0", json!({"a": 1}));
        fx.publish("intake", "2.0.0", json!({"a": 2}));
        fx.publish("intake", "3.0.0", json!({"a": 3}));
        let first = fx.manifest();
        fx.analyze(&first);
        fx.apply(&first).unwrap();

        // Applying the same 1.0.0 -> 2.0.0 manifest again: the tenant has
        // moved on.
        let err = fx.apply(&first).unwrap_err();
        assert!(matches!(err, ResolveError::VersionSkew { .. }));

        // The follow-on manifest applies cleanly.
        let draft = build_manifest(&fx.platform, "2.0.0", "3.0.0").unwrap();
        let second = fx.manifests.register(draft).unwrap();
        fx.analyze(&second);
        let marker = fx.apply(&second).unwrap();
        assert_eq!(marker.current_version, "3.0.0");
        assert_eq!(marker.marker_version, 2);
    }

    #[test]
    fn stale_marker_advance_conflicts() {
        let store = InMemoryTenantVersionStore::new();
        let tenant = TenantId::new("acme");
        store.advance(&tenant, "1.0.0", "2.0.0", 0).unwrap();

        // A second writer still holding marker version 0 loses the race.
        let err = store.advance(&tenant, "2.0.0", "3.0.0", 0).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MarkerConflict {
                expected: 0,
                current: 1
            }
        );

        let marker = store.advance(&tenant, "2.0.0", "3.0.0", 1).unwrap();
        assert_eq!(marker.marker_version, 2);
    }

    #[test]
    fn upgrade_logs_history() {
        let fx = Fixture::new();
        fx.publish("intake", "1.0.0", json!({"a": 1}));
        fx.publish("intake", "2.0.0", json!({"a": 2}));
        let manifest = fx.manifest();
        fx.analyze(&manifest);
        fx.apply(&manifest).unwrap();

        let entries = fx
            .history
            .list(&HistoryFilter::for_entity(EntityType::TenantVersion, "acme"))
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].change_kind, ChangeKind::Create);
        assert_eq!(entries[0].after_state.as_ref().unwrap()["current_version"], "2.0.0");
        assert!(entries[0].before_state.is_none());
    }

    #[test]
    fn medium_severity_records_do_not_block() {
        let fx = Fixture::new();
        fx.publish("intake", "1.0.0", json!({"x": 1}));
        fx.publish("intake", "2.0.0", json!({"x": 2}));
        // Overlapping change: a conflict, but only medium severity.
        fx.customizations
            .create(
                &fx.platform,
                &AllowAll,
                NewCustomization {
                    tenant_id: TenantId::new("acme"),
                    resource: ResourceRef::new("form", "intake"),
                    kind: CustomizationKind::Override,
                    base_platform_version: Some("1.0.0".into()),
                    body: json!({"x": 7}),
                    created_by: Actor::new("alice"),
                },
            )
            .unwrap();
        let manifest = fx.manifest();
        fx.analyze(&manifest);

        let marker = fx.apply(&manifest).unwrap();
        assert_eq!(marker.current_version, "2.0.0");
    }
}
