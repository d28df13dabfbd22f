use std::fmt;

use serde::{Deserialize, Serialize};

/// Address of a configurable resource.
///
/// A resource is identified by its configuration type (e.g. `"form"`,
/// `"workflow"`, `"field_choices"`) and a resource key unique within that
/// type. All platform snapshots, customizations, and impact records are
/// scoped by this pair.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceRef {
    pub config_type: String,
    pub resource_key: String,
}

impl ResourceRef {
    pub fn new(config_type: impl Into<String>, resource_key: impl Into<String>) -> Self {
        Self {
            config_type: config_type.into(),
            resource_key: resource_key.into(),
        }
    }
}

impl fmt::Debug for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceRef({}/{})", self.config_type, self.resource_key)
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.config_type, self.resource_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_joins_type_and_key() {
        let r = ResourceRef::new("form", "asset.intake");
        assert_eq!(r.to_string(), "form/asset.intake");
    }

    #[test]
    fn equality_is_by_both_fields() {
        let a = ResourceRef::new("form", "x");
        let b = ResourceRef::new("workflow", "x");
        assert_ne!(a, b);
        assert_eq!(a, ResourceRef::new("form", "x"));
    }

    #[test]
    fn serde_roundtrip() {
        let r = ResourceRef::new("workflow", "onboarding");
        let json = serde_json::to_string(&r).unwrap();
        let parsed: ResourceRef = serde_json::from_str(&json).unwrap();
        assert_eq!(r, parsed);
    }
}
