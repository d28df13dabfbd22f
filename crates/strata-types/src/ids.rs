//! Record identifiers.
//!
//! Mutable-chain records (customizations, impact records, history entries)
//! are identified by time-ordered UUID v7 ids so that id order roughly
//! follows creation order. Tenants and actors are external identities and
//! stay plain strings.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! uuid_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(uuid::Uuid);

        impl $name {
            /// Generate a new time-ordered id (UUID v7).
            pub fn new() -> Self {
                Self(uuid::Uuid::now_v7())
            }

            /// Create from an existing UUID.
            pub fn from_uuid(uuid: uuid::Uuid) -> Self {
                Self(uuid)
            }

            /// The underlying UUID.
            pub fn as_uuid(&self) -> &uuid::Uuid {
                &self.0
            }

            /// Short representation (first 8 characters of the UUID).
            pub fn short_id(&self) -> String {
                self.0.to_string()[..8].to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "({})"), self.short_id())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id!(
    /// Identifier of one customization version row.
    CustomizationId,
    "CustomizationId"
);

uuid_id!(
    /// Identifier of an upgrade manifest.
    ManifestId,
    "ManifestId"
);

uuid_id!(
    /// Identifier of an impact record.
    ImpactId,
    "ImpactId"
);

uuid_id!(
    /// Identifier of a change history entry.
    HistoryId,
    "HistoryId"
);

/// Identifier of a tenant deployment.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TenantId(String);

impl TenantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity performing a mutation, stamped into audit fields.
///
/// Provided by the calling identity context; the engine never invents one.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor(String);

impl Actor {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Well-known actor for engine-initiated automatic resolutions.
    pub fn system() -> Self {
        Self("system".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Actor {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        assert_ne!(CustomizationId::new(), CustomizationId::new());
        assert_ne!(ImpactId::new(), ImpactId::new());
    }

    #[test]
    fn v7_ids_are_time_ordered() {
        let a = HistoryId::new();
        let b = HistoryId::new();
        assert!(a < b);
    }

    #[test]
    fn short_id_format() {
        let id = ManifestId::new();
        assert_eq!(id.short_id().len(), 8);
    }

    #[test]
    fn serde_roundtrip() {
        let id = CustomizationId::new();
        let json = serde_json::to_string(&id).unwrap();
        let parsed: CustomizationId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn tenant_id_display() {
        let tenant = TenantId::new("acme");
        assert_eq!(tenant.to_string(), "acme");
        assert_eq!(tenant.as_str(), "acme");
    }

    #[test]
    fn system_actor() {
        assert_eq!(Actor::system().as_str(), "system");
    }
}
