//! Registry configuration.

use crate::error::MiddlewareError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Namespace prefix registered by default.
pub const DEFAULT_NAMESPACE: &str = "midway::middleware::";

/// Configuration for a [`MiddlewareRegistry`](super::MiddlewareRegistry).
///
/// Namespaces are searched in the order listed. When `include_default` is
/// set the built-in namespace comes first, unless it also appears in
/// `namespaces`, in which case it takes that position instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Whether the built-in namespace is searched.
    pub include_default: bool,
    /// Additional namespace prefixes, in lookup order.
    pub namespaces: Vec<String>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            include_default: true,
            namespaces: Vec::new(),
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, MiddlewareError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Append a namespace to the lookup order.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespaces.push(namespace.into());
        self
    }

    pub fn include_default(mut self, include: bool) -> Self {
        self.include_default = include;
        self
    }

    /// Final lookup order described by this configuration.
    pub fn lookup_order(&self) -> Vec<String> {
        let mut order = Vec::with_capacity(self.namespaces.len() + 1);
        let listed = self.namespaces.iter().any(|ns| ns == DEFAULT_NAMESPACE);
        if self.include_default && !listed {
            order.push(DEFAULT_NAMESPACE.to_string());
        }
        order.extend(
            self.namespaces
                .iter()
                .filter(|ns| self.include_default || ns.as_str() != DEFAULT_NAMESPACE)
                .cloned(),
        );
        order
    }
}

/// Declarative description of one pipeline member.
///
/// ```rust
/// use midway::registry::MiddlewareSpec;
///
/// let spec: MiddlewareSpec =
///     serde_json::from_str(r#"{"name": "basicAuth", "args": [{"alice": "secret"}]}"#).unwrap();
/// assert_eq!(spec.name, "basicAuth");
/// assert_eq!(spec.args.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiddlewareSpec {
    /// Short logical name.
    pub name: String,
    /// Positional constructor arguments.
    #[serde(default)]
    pub args: Vec<Value>,
}

impl MiddlewareSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<Value>) -> Self {
        self.args.push(arg.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup_order() {
        assert_eq!(
            RegistryConfig::default().lookup_order(),
            vec![DEFAULT_NAMESPACE.to_string()]
        );
    }

    #[test]
    fn test_extra_namespaces_follow_default() {
        let config = RegistryConfig::new().namespace("app::mw::");
        assert_eq!(
            config.lookup_order(),
            vec![DEFAULT_NAMESPACE.to_string(), "app::mw::".to_string()]
        );
    }

    #[test]
    fn test_listing_default_moves_it() {
        let config = RegistryConfig::new()
            .namespace("app::mw::")
            .namespace(DEFAULT_NAMESPACE);
        assert_eq!(
            config.lookup_order(),
            vec!["app::mw::".to_string(), DEFAULT_NAMESPACE.to_string()]
        );
    }

    #[test]
    fn test_excluding_default() {
        let config = RegistryConfig::new()
            .include_default(false)
            .namespace(DEFAULT_NAMESPACE)
            .namespace("app::mw::");
        assert_eq!(config.lookup_order(), vec!["app::mw::".to_string()]);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = RegistryConfig::from_json(r#"{"namespaces": ["app::mw::"]}"#).unwrap();
        assert!(config.include_default);
        assert_eq!(config.namespaces, vec!["app::mw::".to_string()]);

        assert!(matches!(
            RegistryConfig::from_json("{"),
            Err(MiddlewareError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_spec_builder() {
        let spec = MiddlewareSpec::new("cache").arg("memory").arg(60);
        assert_eq!(spec.args, vec![Value::from("memory"), Value::from(60)]);
    }
}
