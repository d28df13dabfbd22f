//! Append-only change history for Strata.
//!
//! Every mutation in the engine appends exactly one [`ChangeHistoryEntry`]
//! capturing the entity's state before and after. The log is the sole
//! source for rollback: a rollback writes a *new* version reproducing the
//! recorded before-state, it never reverts in place.
//!
//! # Key Types
//!
//! - [`ChangeHistoryEntry`] / [`HistoryDraft`] — one audit entry
//! - [`EntityType`] / [`ChangeKind`] — what changed and how
//! - [`ChangeLog`] / [`InMemoryChangeLog`] — the append-only store

pub mod entry;
pub mod error;
pub mod log;

pub use entry::{ChangeHistoryEntry, ChangeKind, EntityType, HistoryDraft, HistoryFilter};
pub use error::{HistoryError, HistoryResult};
pub use log::{ChangeLog, InMemoryChangeLog};
