//! Versioned tenant customization store.
//!
//! A customization is a tenant's override, extension, or brand-new variant
//! of a platform resource. Rows are immutable: every edit writes version
//! N+1 linked through `previous_version_id` and deactivates N, so exactly
//! one row is active per (tenant, config type, resource key) and the chain
//! doubles as the tenant's local history. Writes carry the version the
//! caller read and fail on staleness; the store never retries on the
//! caller's behalf.
//!
//! # Key Types
//!
//! - [`Customization`] / [`NewCustomization`] — one immutable version row
//! - [`CustomizationStore`] / [`InMemoryCustomizationStore`] — versioned storage
//! - [`Governance`] — external extensibility and schema checks

pub mod customization;
pub mod error;
pub mod governance;
pub mod store;

pub use customization::{Customization, CustomizationFilter, NewCustomization};
pub use error::{CustomError, CustomResult};
pub use governance::{AllowAll, Governance};
pub use store::{CustomizationStore, InMemoryCustomizationStore};
