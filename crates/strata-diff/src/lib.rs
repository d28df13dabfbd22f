//! Structural differ for Strata configuration bodies.
//!
//! Computes ordered patch operations between two JSON trees and applies
//! them back. The two laws every change to this crate must preserve:
//!
//! - round-trip: `apply(a, diff(a, b)) == b`
//! - idempotence: `diff(a, a) == []`
//!
//! Objects are diffed key-by-key, recursing on matching keys. Arrays are
//! opaque leaves: any array change is a single wholesale replacement at the
//! array's path. Positional or keyed array diffing needs tie-break rules
//! the product does not define, so it is deliberately out of scope.
//!
//! # Key Types
//!
//! - [`PatchOp`] / [`PatchKind`] — one ordered add/remove/replace operation
//! - [`diff`] / [`apply`] — compute and apply a patch
//! - [`paths_overlap`] / [`value_at`] — pointer helpers for the analyzer

pub mod apply;
pub mod diff;
pub mod error;
pub mod op;

pub use apply::{apply, value_at};
pub use diff::diff;
pub use error::{DiffError, DiffResult};
pub use op::{paths_overlap, PatchKind, PatchOp};
