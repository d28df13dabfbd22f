//! Resolution engine for Strata.
//!
//! Turns operator and automatic decisions about impact records into new
//! customization versions, drives the record state machine
//! (`PendingAnalysis → Analyzed → {Resolved | AutoResolved} →
//! Acknowledged`), and gates `apply_upgrade` on every blocking record
//! being settled.
//!
//! Strategy legality is a closed lookup table keyed by impact type, not a
//! trait hierarchy: the set of strategies is fixed and small, and the
//! table makes the whole legality surface reviewable in one screen.
//!
//! # Key Types
//!
//! - [`Resolver`] — preview, auto-resolve, resolve, acknowledge
//! - [`allowed_choices`] — strategy legality per impact type
//! - [`TenantVersionStore`] / [`apply_upgrade`] — the per-tenant version marker

pub mod error;
pub mod legality;
pub mod resolver;
pub mod upgrade;

pub use error::{ResolveError, ResolveResult};
pub use legality::allowed_choices;
pub use resolver::{Resolution, Resolver};
pub use upgrade::{
    apply_upgrade, InMemoryTenantVersionStore, TenantVersionMarker, TenantVersionStore,
};
