use serde_json::Value;
use strata_types::Checksum;

use crate::canonical::canonical_json;
use crate::error::CanonError;

/// Domain-separated BLAKE3 checksum over canonical JSON text.
///
/// Each hasher carries a domain tag (e.g. `"strata-config-v1"`) that is
/// prepended to every hash computation, so a config body and a manifest
/// with identical canonical text still produce different checksums.
pub struct CanonHasher {
    domain: &'static str,
}

impl CanonHasher {
    /// Hasher for configuration bodies (platform snapshots, customizations).
    pub const CONFIG: Self = Self {
        domain: "strata-config-v1",
    };
    /// Hasher for upgrade manifests.
    pub const MANIFEST: Self = Self {
        domain: "strata-manifest-v1",
    };

    /// Create a hasher with a custom domain tag.
    pub const fn new(domain: &'static str) -> Self {
        Self { domain }
    }

    /// Checksum a body: canonicalize, then hash with domain separation.
    pub fn checksum(&self, value: &Value) -> Result<Checksum, CanonError> {
        let canonical = canonical_json(value)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(self.domain.as_bytes());
        hasher.update(b":");
        hasher.update(canonical.as_bytes());
        Ok(Checksum::from_hash(*hasher.finalize().as_bytes()))
    }

    /// Checksum any serializable value through its JSON form.
    pub fn checksum_of<T: serde::Serialize>(&self, value: &T) -> Result<Checksum, CanonError> {
        let json =
            serde_json::to_value(value).map_err(|e| CanonError::Serialization(e.to_string()))?;
        self.checksum(&json)
    }

    /// Verify that a body produces the expected checksum.
    pub fn verify(&self, value: &Value, expected: &Checksum) -> Result<bool, CanonError> {
        Ok(self.checksum(value)? == *expected)
    }

    /// The domain tag used by this hasher.
    pub fn domain(&self) -> &str {
        self.domain
    }
}

/// Returns `true` if two bodies are canonically equal (equal checksums).
pub fn canonically_equal(a: &Value, b: &Value) -> Result<bool, CanonError> {
    Ok(CanonHasher::CONFIG.checksum(a)? == CanonHasher::CONFIG.checksum(b)?)
}
