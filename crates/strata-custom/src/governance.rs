use serde_json::Value;
use strata_types::ResourceRef;

/// External governance checks consumed by the store.
///
/// The engine does not own extensibility policy or schema definitions; a
/// governance service supplies both. Implementations must be side-effect
/// free — the store may call them any number of times while deciding
/// whether a write is legal.
pub trait Governance: Send + Sync {
    /// Whether the resource accepts `Extend`-kind customizations.
    fn is_extensible(&self, resource: &ResourceRef) -> bool;

    /// Validate a customization body against the resource's schema.
    ///
    /// Returns the rejection reason on failure.
    fn validate_body(&self, resource: &ResourceRef, body: &Value) -> Result<(), String>;
}

/// Permissive governance for tests and embedding: everything is extensible
/// and every body validates.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Governance for AllowAll {
    fn is_extensible(&self, _resource: &ResourceRef) -> bool {
        true
    }

    fn validate_body(&self, _resource: &ResourceRef, _body: &Value) -> Result<(), String> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn allow_all_permits_everything() {
        let resource = ResourceRef::new("form", "x");
        assert!(AllowAll.is_extensible(&resource));
        assert!(AllowAll.validate_body(&resource, &json!({"any": "thing"})).is_ok());
    }
}
