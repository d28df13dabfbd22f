//! Three-way upgrade impact analysis.
//!
//! For every resource an upgrade manifest declares changed, the analyzer
//! compares the tenant's customization (if any) against the old and new
//! platform bodies and classifies the outcome: independent changes that
//! merge automatically, genuine conflicts needing an operator, deprecated
//! or removed resources needing an explicit tenant decision, or newly
//! available resources worth surfacing.
//!
//! Analysis is idempotent per (tenant, manifest): records are keyed by
//! (tenant, manifest, resource), and re-running updates the same records
//! instead of creating duplicates. Records a tenant already settled are
//! left untouched unless explicitly forced.
//!
//! # Key Types
//!
//! - [`ImpactRecord`] / [`ConflictDetail`] — the computed impact of one change
//! - [`ImpactStore`] / [`InMemoryImpactStore`] — record storage keyed by scope
//! - [`analyze_manifest`] / [`AnalysisReport`] — the three-way comparison

pub mod analyzer;
pub mod error;
pub mod record;
pub mod store;

pub use analyzer::{analyze_manifest, AnalysisReport};
pub use error::{ImpactError, ImpactResult};
pub use record::{ConflictDetail, ImpactRecord};
pub use store::{ImpactStore, InMemoryImpactStore};
