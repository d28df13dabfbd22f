//! Foundation types for Strata.
//!
//! This crate provides the identifiers, resource addressing, and
//! classification enums used throughout the Strata engine. Every other
//! Strata crate depends on `strata-types`.
//!
//! # Key Types
//!
//! - [`Checksum`] — 256-bit canonical content digest
//! - [`ResourceRef`] — (config type, resource key) address of a configurable resource
//! - [`TenantId`] / [`Actor`] — deployment scope and audit identity
//! - [`CustomizationId`] / [`ManifestId`] / [`ImpactId`] / [`HistoryId`] — UUID v7 record ids
//! - [`Severity`] — totally ordered impact severity
//! - [`ImpactType`] / [`ImpactStatus`] / [`ResolutionChoice`] — impact classification and lifecycle

pub mod checksum;
pub mod error;
pub mod ids;
pub mod kinds;
pub mod resource;
pub mod severity;

pub use checksum::Checksum;
pub use error::TypeError;
pub use ids::{Actor, CustomizationId, HistoryId, ImpactId, ManifestId, TenantId};
pub use kinds::{
    ChangeType, ConflictType, CustomizationKind, ImpactStatus, ImpactType, ResolutionChoice,
    SuggestedResolution,
};
pub use resource::ResourceRef;
pub use severity::Severity;
