//! Platform configuration store and upgrade manifests.
//!
//! The platform side of the merge engine: immutable, append-only snapshots
//! of the shared base configuration, and manifests declaring what changed
//! between two platform versions.
//!
//! # Key Types
//!
//! - [`PlatformSnapshot`] / [`SnapshotDraft`] — one immutable versioned config body
//! - [`PlatformStore`] / [`InMemoryPlatformStore`] — snapshot storage
//! - [`UpgradeManifest`] / [`ManifestChange`] — declared change set between versions
//! - [`ManifestStore`] / [`InMemoryManifestStore`] — manifest registry
//! - [`build_manifest`] — derive a manifest by scanning two published versions

pub mod builder;
pub mod error;
pub mod manifest;
pub mod snapshot;
pub mod store;

pub use builder::build_manifest;
pub use error::{PlatformError, PlatformResult};
pub use manifest::{
    InMemoryManifestStore, ManifestChange, ManifestDraft, ManifestStore, UpgradeManifest,
};
pub use snapshot::{PlatformSnapshot, SnapshotDraft};
pub use store::{InMemoryPlatformStore, PlatformStore};
