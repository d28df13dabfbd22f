//! Manifest derivation.
//!
//! Rather than hand-authoring a manifest, release tooling publishes both
//! platform versions into the store and derives the change set from them.

use std::collections::BTreeMap;

use strata_diff::diff;
use strata_types::{ChangeType, ResourceRef, Severity};

use crate::error::{PlatformError, PlatformResult};
use crate::manifest::{ManifestChange, ManifestDraft};
use crate::snapshot::PlatformSnapshot;
use crate::store::PlatformStore;

/// Derive an upgrade manifest from two published platform versions.
///
/// Resources present only in `to` are `Added`, present only in `from` are
/// `Removed`, and present in both with differing checksums are `Modified` —
/// unless the new body carries a top-level `"deprecated": true` marker, in
/// which case the entry is `Deprecated`. Impact levels follow the change
/// type: Added → low, Modified → medium, Deprecated → high,
/// Removed → critical.
pub fn build_manifest(
    store: &dyn PlatformStore,
    from: &str,
    to: &str,
) -> PlatformResult<ManifestDraft> {
    let old = index_by_resource(store.list_for_version(from)?);
    let new = index_by_resource(store.list_for_version(to)?);
    if old.is_empty() {
        return Err(PlatformError::VersionNotFound {
            version: from.to_string(),
        });
    }
    if new.is_empty() {
        return Err(PlatformError::VersionNotFound {
            version: to.to_string(),
        });
    }

    let mut draft = ManifestDraft::new(from, to);

    for (resource, old_snapshot) in &old {
        match new.get(resource) {
            Some(new_snapshot) => {
                if old_snapshot.checksum == new_snapshot.checksum {
                    continue;
                }
                let change_type = if is_deprecated(new_snapshot) {
                    ChangeType::Deprecated
                } else {
                    ChangeType::Modified
                };
                draft.config_changes.push(ManifestChange {
                    resource: resource.clone(),
                    change_type,
                    previous_checksum: Some(old_snapshot.checksum),
                    new_checksum: Some(new_snapshot.checksum),
                    diff: diff(&old_snapshot.body, &new_snapshot.body),
                    impact_level: impact_level_for(change_type),
                });
            }
            None => {
                draft.config_changes.push(ManifestChange {
                    resource: resource.clone(),
                    change_type: ChangeType::Removed,
                    previous_checksum: Some(old_snapshot.checksum),
                    new_checksum: None,
                    diff: Vec::new(),
                    impact_level: impact_level_for(ChangeType::Removed),
                });
            }
        }
    }

    for (resource, new_snapshot) in &new {
        if !old.contains_key(resource) {
            draft.config_changes.push(ManifestChange {
                resource: resource.clone(),
                change_type: ChangeType::Added,
                previous_checksum: None,
                new_checksum: Some(new_snapshot.checksum),
                diff: Vec::new(),
                impact_level: impact_level_for(ChangeType::Added),
            });
        }
    }

    Ok(draft)
}

fn index_by_resource(
    snapshots: Vec<PlatformSnapshot>,
) -> BTreeMap<ResourceRef, PlatformSnapshot> {
    snapshots
        .into_iter()
        .map(|s| (s.resource.clone(), s))
        .collect()
}

fn is_deprecated(snapshot: &PlatformSnapshot) -> bool {
    snapshot
        .body
        .get("deprecated")
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}

fn impact_level_for(change_type: ChangeType) -> Severity {
    match change_type {
        ChangeType::Added => Severity::Low,
        ChangeType::Modified => Severity::Medium,
        ChangeType::Deprecated => Severity::High,
        ChangeType::Removed => Severity::Critical,
    }
}
