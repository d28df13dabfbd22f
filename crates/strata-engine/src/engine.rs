use serde::Serialize;
use serde_json::Value;
use strata_custom::{
    Customization, CustomizationFilter, CustomizationStore, Governance, InMemoryCustomizationStore,
    NewCustomization,
};
use strata_diff::{diff, PatchOp};
use strata_history::{
    ChangeHistoryEntry, ChangeKind, ChangeLog, EntityType, HistoryDraft, HistoryFilter,
    InMemoryChangeLog,
};
use strata_impact::{
    analyze_manifest, AnalysisReport, ImpactRecord, ImpactStore, InMemoryImpactStore,
};
use strata_platform::{
    build_manifest, InMemoryManifestStore, InMemoryPlatformStore, ManifestDraft, ManifestStore,
    PlatformSnapshot, PlatformStore, SnapshotDraft, UpgradeManifest,
};
use strata_resolve::{
    apply_upgrade, InMemoryTenantVersionStore, Resolution, Resolver, TenantVersionMarker,
    TenantVersionStore,
};
use strata_types::{
    Actor, CustomizationId, HistoryId, ImpactId, ManifestId, ResolutionChoice, ResourceRef,
    TenantId,
};
use tracing::error;

use crate::error::{EngineError, EngineResult};

/// A customization compared against the platform snapshot it diverged
/// from.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlatformComparison {
    pub customization: Customization,
    pub platform: PlatformSnapshot,
    pub diff: Vec<PatchOp>,
}

/// The merge engine facade.
///
/// Owns one set of stores plus the governance hook and exposes the whole
/// engine surface: customization lifecycle, platform publishing, impact
/// analysis, resolution, upgrades, history, and rollback. It is the single
/// writer pairing every store mutation with its history entry, so
/// embedding callers cannot forget the audit trail.
pub struct MergeEngine {
    pub(crate) platform: InMemoryPlatformStore,
    pub(crate) manifests: InMemoryManifestStore,
    pub(crate) customizations: InMemoryCustomizationStore,
    pub(crate) impacts: InMemoryImpactStore,
    pub(crate) history: InMemoryChangeLog,
    pub(crate) versions: InMemoryTenantVersionStore,
    pub(crate) governance: Box<dyn Governance>,
}

impl MergeEngine {
    /// An engine with permissive governance; fine for tests and demos.
    pub fn new() -> Self {
        Self::with_governance(Box::new(strata_custom::AllowAll))
    }

    /// An engine consulting an external governance service for
    /// extensibility and schema checks.
    pub fn with_governance(governance: Box<dyn Governance>) -> Self {
        Self {
            platform: InMemoryPlatformStore::new(),
            manifests: InMemoryManifestStore::new(),
            customizations: InMemoryCustomizationStore::new(),
            impacts: InMemoryImpactStore::new(),
            history: InMemoryChangeLog::new(),
            versions: InMemoryTenantVersionStore::new(),
            governance,
        }
    }

    fn resolver(&self) -> Resolver<'_> {
        Resolver::new(
            &self.platform,
            &self.manifests,
            &self.customizations,
            self.governance.as_ref(),
            &self.impacts,
            &self.history,
        )
    }

    // ---- Platform publishing ----

    pub fn publish_snapshot(&self, draft: SnapshotDraft) -> EngineResult<PlatformSnapshot> {
        Ok(self.platform.publish(draft)?)
    }

    pub fn register_manifest(&self, draft: ManifestDraft) -> EngineResult<UpgradeManifest> {
        Ok(self.manifests.register(draft)?)
    }

    /// Derive and register a manifest by scanning two published versions.
    pub fn derive_manifest(&self, from: &str, to: &str) -> EngineResult<UpgradeManifest> {
        let draft = build_manifest(&self.platform, from, to)?;
        Ok(self.manifests.register(draft)?)
    }

    pub fn list_manifests(&self) -> EngineResult<Vec<UpgradeManifest>> {
        Ok(self.manifests.list()?)
    }

    pub fn get_manifest(&self, id: &ManifestId) -> EngineResult<UpgradeManifest> {
        self.manifests
            .get(id)?
            .ok_or_else(|| EngineError::NotFound(format!("manifest {id}")))
    }

    // ---- Customization lifecycle ----

    pub fn create_customization(&self, input: NewCustomization) -> EngineResult<Customization> {
        let actor = input.created_by.clone();
        let created =
            self.customizations
                .create(&self.platform, self.governance.as_ref(), input)?;
        self.history.append(
            HistoryDraft::new(
                EntityType::Customization,
                created.id.to_string(),
                ChangeKind::Create,
                actor,
            )
            .with_after(to_state(&created)?),
        )?;
        Ok(created)
    }

    pub fn update_customization(
        &self,
        id: &CustomizationId,
        body: Value,
        expected_version: u64,
        actor: &Actor,
    ) -> EngineResult<Customization> {
        let before = self.get_customization(id)?;
        let updated = self.customizations.update(
            &self.platform,
            self.governance.as_ref(),
            id,
            body,
            expected_version,
            actor,
        )?;
        self.history.append(
            HistoryDraft::new(
                EntityType::Customization,
                updated.id.to_string(),
                ChangeKind::Update,
                actor.clone(),
            )
            .with_before(to_state(&before)?)
            .with_after(to_state(&updated)?),
        )?;
        Ok(updated)
    }

    /// Deactivate a customization, reverting the tenant to the platform
    /// default (or to no value for a tenant-only resource).
    pub fn delete_customization(
        &self,
        id: &CustomizationId,
        expected_version: u64,
        actor: &Actor,
    ) -> EngineResult<Customization> {
        let before = self.get_customization(id)?;
        let deactivated = self
            .customizations
            .deactivate(id, expected_version, actor)?;
        self.history.append(
            HistoryDraft::new(
                EntityType::Customization,
                deactivated.id.to_string(),
                ChangeKind::Delete,
                actor.clone(),
            )
            .with_before(to_state(&before)?),
        )?;
        Ok(deactivated)
    }

    pub fn get_customization(&self, id: &CustomizationId) -> EngineResult<Customization> {
        self.customizations
            .get(id)?
            .ok_or_else(|| EngineError::NotFound(format!("customization {id}")))
    }

    pub fn list_customizations(
        &self,
        filter: &CustomizationFilter,
    ) -> EngineResult<Vec<Customization>> {
        Ok(self.customizations.list(filter)?)
    }

    /// The version chain for a tenant's resource, newest first. Empty when
    /// the tenant never customized the resource.
    pub fn version_history(
        &self,
        tenant: &TenantId,
        resource: &ResourceRef,
    ) -> EngineResult<Vec<Customization>> {
        let rows = self.customizations.list(&CustomizationFilter {
            tenant_id: Some(tenant.clone()),
            ..CustomizationFilter::default()
        })?;
        let Some(newest) = rows
            .into_iter()
            .filter(|c| &c.resource == resource)
            .max_by_key(|c| c.id)
        else {
            return Ok(Vec::new());
        };
        Ok(self.customizations.version_chain(&newest.id)?)
    }

    /// Compare a customization against the platform snapshot it is based
    /// on.
    ///
    /// A base pointing at no known snapshot, or a checksum disagreeing
    /// with the published one, is corruption: logged and surfaced as an
    /// integrity error, never worked around.
    pub fn compare_with_platform(
        &self,
        id: &CustomizationId,
    ) -> EngineResult<PlatformComparison> {
        let customization = self.get_customization(id)?;
        let Some(base_version) = customization.base_platform_version.clone() else {
            return Err(EngineError::State(format!(
                "customization {id} is a tenant-only resource with no platform counterpart"
            )));
        };

        let Some(platform) = self.platform.get(&customization.resource, &base_version)? else {
            error!(
                customization = %id,
                resource = %customization.resource,
                base_version = %base_version,
                "customization base points at an unpublished platform version"
            );
            return Err(EngineError::Integrity(format!(
                "customization {id} is based on {base_version}, which was never published for {}",
                customization.resource
            )));
        };
        if customization.base_checksum != Some(platform.checksum) {
            error!(
                customization = %id,
                resource = %customization.resource,
                "stored base checksum disagrees with the published snapshot"
            );
            return Err(EngineError::Integrity(format!(
                "customization {id} carries a base checksum matching no known snapshot"
            )));
        }

        let diff = diff(&platform.body, &customization.body);
        Ok(PlatformComparison {
            customization,
            platform,
            diff,
        })
    }

    // ---- Impact analysis and resolution ----

    /// Run three-way impact analysis for a tenant over a manifest.
    /// Idempotent per (tenant, manifest); see [`analyze_manifest`].
    pub fn analyze_impact(
        &self,
        tenant: &TenantId,
        manifest_id: &ManifestId,
        force: bool,
        actor: &Actor,
    ) -> EngineResult<AnalysisReport> {
        let manifest = self.get_manifest(manifest_id)?;
        Ok(analyze_manifest(
            &self.platform,
            &self.customizations,
            &self.impacts,
            &self.history,
            tenant,
            &manifest,
            force,
            actor,
        )?)
    }

    pub fn get_impact(&self, id: &ImpactId) -> EngineResult<ImpactRecord> {
        self.impacts
            .get(id)?
            .ok_or_else(|| EngineError::NotFound(format!("impact record {id}")))
    }

    pub fn list_impacts(
        &self,
        tenant: &TenantId,
        manifest_id: &ManifestId,
    ) -> EngineResult<Vec<ImpactRecord>> {
        Ok(self.impacts.list_for_manifest(tenant, manifest_id)?)
    }

    /// The candidate value a strategy would produce, without writing.
    pub fn preview_merge(
        &self,
        id: &ImpactId,
        choice: ResolutionChoice,
        custom_value: Option<Value>,
    ) -> EngineResult<Option<Value>> {
        Ok(self.resolver().preview_merge(id, choice, custom_value)?)
    }

    pub fn auto_resolve(&self, id: &ImpactId, actor: &Actor) -> EngineResult<ImpactRecord> {
        Ok(self.resolver().auto_resolve(id, actor)?)
    }

    pub fn resolve_impact(
        &self,
        id: &ImpactId,
        resolution: Resolution,
        actor: &Actor,
    ) -> EngineResult<ImpactRecord> {
        Ok(self.resolver().resolve_impact(id, resolution, actor)?)
    }

    pub fn acknowledge_impact(&self, id: &ImpactId, actor: &Actor) -> EngineResult<ImpactRecord> {
        Ok(self.resolver().acknowledge(id, actor)?)
    }

    /// Advance the tenant onto the manifest's target platform version,
    /// provided every blocking impact record is settled.
    pub fn apply_upgrade(
        &self,
        tenant: &TenantId,
        manifest_id: &ManifestId,
        actor: &Actor,
    ) -> EngineResult<TenantVersionMarker> {
        let manifest = self.get_manifest(manifest_id)?;
        Ok(apply_upgrade(
            &self.impacts,
            &self.versions,
            &self.history,
            tenant,
            &manifest,
            actor,
        )?)
    }

    /// The platform version the tenant currently runs, if an upgrade was
    /// ever applied.
    pub fn current_version(&self, tenant: &TenantId) -> EngineResult<Option<TenantVersionMarker>> {
        Ok(self.versions.get(tenant)?)
    }

    // ---- History ----

    pub fn list_history(&self, filter: &HistoryFilter) -> EngineResult<Vec<ChangeHistoryEntry>> {
        Ok(self.history.list(filter)?)
    }

    pub fn get_history(&self, id: &HistoryId) -> EngineResult<ChangeHistoryEntry> {
        self.history
            .get(id)?
            .ok_or_else(|| EngineError::NotFound(format!("history entry {id}")))
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MergeEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MergeEngine")
            .field("platform", &self.platform)
            .field("customizations", &self.customizations)
            .field("impacts", &self.impacts)
            .field("history", &self.history)
            .finish()
    }
}

pub(crate) fn to_state<T: Serialize>(value: &T) -> EngineResult<Value> {
    serde_json::to_value(value).map_err(|e| EngineError::Internal(e.to_string()))
}
