//! Canonical serialization and checksumming for Strata.
//!
//! Two configuration bodies are equal for merge purposes when their
//! canonical forms hash identically. Canonicalization sorts object keys
//! recursively at every depth, preserves array order and explicit nulls,
//! and rejects pathologically deep bodies.
//!
//! # Key Types
//!
//! - [`canonical_json`] — deterministic canonical text of a JSON body
//! - [`CanonHasher`] — domain-separated BLAKE3 checksum over canonical text
//! - [`canonically_equal`] — checksum-based body equality

pub mod canonical;
pub mod error;
pub mod hasher;

pub use canonical::{canonical_json, MAX_DEPTH};
pub use error::CanonError;
pub use hasher::{canonically_equal, CanonHasher};
