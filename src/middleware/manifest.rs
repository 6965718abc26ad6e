//! Middleware manifest for compile-time metadata.
//!
//! Generated by the `#[middleware]` attribute and used to register the type
//! under the right name without repeating it by hand.

use serde::{Deserialize, Serialize};

/// Static metadata for a middleware type.
#[derive(Debug, Clone, Serialize)]
pub struct MiddlewareManifest {
    /// Short logical name, as passed to `resolve`.
    pub name: &'static str,
    /// Type name inside a namespace (the capitalized short name).
    pub type_name: &'static str,
    /// Optional description.
    pub description: &'static str,
}

impl MiddlewareManifest {
    pub const fn new(name: &'static str, type_name: &'static str) -> Self {
        Self {
            name,
            type_name,
            description: "",
        }
    }

    pub const fn with_description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    /// Fully-qualified catalog key for this type under `namespace`.
    pub fn qualified_name(&self, namespace: &str) -> String {
        format!("{}{}", namespace, self.type_name)
    }

    pub fn to_owned(&self) -> OwnedMiddlewareManifest {
        OwnedMiddlewareManifest {
            name: self.name.to_string(),
            type_name: self.type_name.to_string(),
            description: self.description.to_string(),
        }
    }
}

/// Owned form of [`MiddlewareManifest`], for listings built at runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OwnedMiddlewareManifest {
    pub name: String,
    pub type_name: String,
    pub description: String,
}

impl From<&MiddlewareManifest> for OwnedMiddlewareManifest {
    fn from(manifest: &MiddlewareManifest) -> Self {
        manifest.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let manifest = MiddlewareManifest::new("cache", "Cache");
        assert_eq!(
            manifest.qualified_name("midway::middleware::"),
            "midway::middleware::Cache"
        );
    }

    #[test]
    fn test_manifest_serialization() {
        let manifest =
            MiddlewareManifest::new("gzip", "Gzip").with_description("Compresses bodies");
        let json = serde_json::to_string(&manifest).unwrap();
        let owned: OwnedMiddlewareManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(owned, manifest.to_owned());
        assert_eq!(owned.description, "Compresses bodies");
    }
}
