//! Name-based middleware resolution across ordered namespaces.

use crate::error::MiddlewareError;
use crate::middleware::{MiddlewareManifest, SharedMiddleware};
use crate::registry::config::{MiddlewareSpec, RegistryConfig, DEFAULT_NAMESPACE};
use crate::registry::constructor::Constructor;
use bytes::Bytes;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Factory that turns raw content into a body, for middlewares that need to
/// produce new bodies.
pub type StreamFactory = Arc<dyn Fn(&[u8]) -> Bytes + Send + Sync>;

/// Registry resolving short middleware names to constructed instances.
///
/// Each namespace is a prefix. Resolving `"cache"` looks up
/// `"<namespace>Cache"` in the type catalog for every namespace in
/// registration order and builds the first hit. Registering a project
/// namespace ahead of the default one therefore shadows built-in names.
///
/// The registry holds no lock. Populate it at startup through `&mut self`,
/// then share it read-only (typically behind an `Arc`).
pub struct MiddlewareRegistry {
    namespaces: Vec<String>,
    catalog: HashMap<String, Constructor>,
    stream_factory: Option<StreamFactory>,
}

impl MiddlewareRegistry {
    /// Create a registry searching only [`DEFAULT_NAMESPACE`].
    pub fn new() -> Self {
        Self::with_namespaces(vec![DEFAULT_NAMESPACE.to_string()])
    }

    /// Create a registry with no namespaces at all.
    pub fn empty() -> Self {
        Self::with_namespaces(Vec::new())
    }

    fn with_namespaces(namespaces: Vec<String>) -> Self {
        Self {
            namespaces,
            catalog: HashMap::new(),
            stream_factory: None,
        }
    }

    /// Create a registry with the lookup order described by `config`.
    pub fn from_config(config: &RegistryConfig) -> Result<Self, MiddlewareError> {
        let mut registry = Self::empty();
        for namespace in config.lookup_order() {
            registry.register_namespace(namespace)?;
        }
        Ok(registry)
    }

    /// Append a namespace to the end of the lookup order.
    ///
    /// Registering the same namespace twice is allowed and simply searches it
    /// twice.
    pub fn register_namespace(&mut self, namespace: impl Into<String>) -> Result<(), MiddlewareError> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;
        info!("Registered middleware namespace: {}", namespace);
        self.namespaces.push(namespace);
        Ok(())
    }

    /// Namespaces in lookup order.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Add a type to the catalog under its fully-qualified name.
    ///
    /// Defining a name twice replaces the earlier constructor.
    pub fn define(&mut self, qualified_name: impl Into<String>, constructor: Constructor) {
        let qualified_name = qualified_name.into();
        debug!(
            "Defined middleware type {} ({})",
            qualified_name,
            constructor.shape()
        );
        if self
            .catalog
            .insert(qualified_name.clone(), constructor)
            .is_some()
        {
            warn!("Middleware type {} was redefined", qualified_name);
        }
    }

    /// Define a type described by a manifest inside `namespace`.
    pub fn define_manifest(
        &mut self,
        namespace: &str,
        manifest: &MiddlewareManifest,
        constructor: Constructor,
    ) {
        self.define(manifest.qualified_name(namespace), constructor);
    }

    /// Whether `name` would resolve to some type.
    pub fn contains(&self, name: &str) -> bool {
        matches!(self.lookup(name), Ok(Some(_)))
    }

    /// Resolve `name` and construct it with `args`.
    ///
    /// The argument count selects the constructor form; see [`Constructor`].
    /// Errors returned by the constructor itself are passed through.
    pub fn resolve(&self, name: &str, args: Vec<Value>) -> Result<SharedMiddleware, MiddlewareError> {
        let Some((qualified, constructor)) = self.lookup(name)? else {
            warn!("Middleware {} not found in {:?}", name, self.namespaces);
            return Err(MiddlewareError::NotFound {
                name: name.to_string(),
            });
        };
        debug!(
            "Resolved middleware {} to {} with {} argument(s)",
            name,
            qualified,
            args.len()
        );
        constructor.construct(name, args)
    }

    /// Resolve one declarative pipeline member.
    pub fn resolve_spec(&self, spec: &MiddlewareSpec) -> Result<SharedMiddleware, MiddlewareError> {
        self.resolve(&spec.name, spec.args.clone())
    }

    /// Resolve every spec in order, stopping at the first failure.
    pub fn resolve_all(&self, specs: &[MiddlewareSpec]) -> Result<Vec<SharedMiddleware>, MiddlewareError> {
        specs.iter().map(|spec| self.resolve_spec(spec)).collect()
    }

    /// Replace the stream factory; `None` clears it.
    pub fn set_stream_factory(&mut self, factory: Option<StreamFactory>) {
        self.stream_factory = factory;
    }

    pub fn stream_factory(&self) -> Option<StreamFactory> {
        self.stream_factory.clone()
    }

    /// First catalog entry matching `name`, in namespace order.
    fn lookup(&self, name: &str) -> Result<Option<(String, &Constructor)>, MiddlewareError> {
        let type_name = type_name_for(name)?;
        Ok(self.namespaces.iter().find_map(|namespace| {
            let qualified = format!("{}{}", namespace, type_name);
            self.catalog
                .get(&qualified)
                .map(|constructor| (qualified, constructor))
        }))
    }
}

impl Default for MiddlewareRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MiddlewareRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.catalog.keys().collect();
        types.sort();
        f.debug_struct("MiddlewareRegistry")
            .field("namespaces", &self.namespaces)
            .field("types", &types)
            .field("stream_factory", &self.stream_factory.is_some())
            .finish()
    }
}

/// Capitalize the first character of `name`, rejecting input that has no
/// obvious type name.
fn type_name_for(name: &str) -> Result<String, MiddlewareError> {
    let invalid = |reason| MiddlewareError::InvalidName {
        name: name.to_string(),
        reason,
    };

    let mut chars = name.chars();
    let first = chars.next().ok_or_else(|| invalid("name is empty"))?;
    if !first.is_ascii_alphabetic() {
        return Err(invalid("name must start with an ASCII letter"));
    }
    if !chars.clone().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("name may only contain ASCII letters, digits and '_'"));
    }

    let mut type_name = String::with_capacity(name.len());
    type_name.push(first.to_ascii_uppercase());
    type_name.push_str(chars.as_str());
    Ok(type_name)
}

fn validate_namespace(namespace: &str) -> Result<(), MiddlewareError> {
    let valid = !namespace.is_empty()
        && namespace
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':');
    if valid {
        Ok(())
    } else {
        Err(MiddlewareError::InvalidNamespace(namespace.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Middleware, Next};

    fn passthrough(name: &'static str) -> Constructor {
        Constructor::nullary(move || {
            Ok(from_fn(name, |req, res, next: Next| async move {
                next.run(req, res).await
            }))
        })
    }

    #[test]
    fn test_type_name_capitalizes_first_letter_only() {
        assert_eq!(type_name_for("cache").unwrap(), "Cache");
        assert_eq!(type_name_for("basicAuth").unwrap(), "BasicAuth");
        assert_eq!(type_name_for("Gzip").unwrap(), "Gzip");
        assert_eq!(type_name_for("rate_limit2").unwrap(), "Rate_limit2");
    }

    #[test]
    fn test_type_name_rejects_odd_input() {
        for name in ["", "2fa", "_cache", "cache-control", "caché"] {
            assert!(
                matches!(type_name_for(name), Err(MiddlewareError::InvalidName { .. })),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_register_namespace_validates() {
        let mut registry = MiddlewareRegistry::new();
        assert!(registry.register_namespace("app::mw::").is_ok());
        assert_eq!(
            registry.register_namespace(""),
            Err(MiddlewareError::InvalidNamespace(String::new()))
        );
        assert!(registry.register_namespace("app mw").is_err());
        assert_eq!(
            registry.namespaces(),
            &[DEFAULT_NAMESPACE.to_string(), "app::mw::".to_string()]
        );
    }

    #[test]
    fn test_duplicate_namespace_is_kept() {
        let mut registry = MiddlewareRegistry::empty();
        registry.register_namespace("app::").unwrap();
        registry.register_namespace("app::").unwrap();
        assert_eq!(registry.namespaces().len(), 2);
    }

    #[test]
    fn test_resolve_uses_catalog() {
        let mut registry = MiddlewareRegistry::new();
        registry.define("midway::middleware::Cache", passthrough("cache"));

        assert!(registry.contains("cache"));
        assert!(!registry.contains("gzip"));
        assert_eq!(registry.resolve("cache", vec![]).unwrap().name(), "cache");
    }

    #[test]
    fn test_redefine_replaces_constructor() {
        let mut registry = MiddlewareRegistry::new();
        registry.define("midway::middleware::Cache", passthrough("first"));
        registry.define("midway::middleware::Cache", passthrough("second"));
        assert_eq!(registry.resolve("cache", vec![]).unwrap().name(), "second");
    }

    #[test]
    fn test_invalid_name_is_not_reported_as_missing() {
        let registry = MiddlewareRegistry::new();
        assert!(matches!(
            registry.resolve("", vec![]).err(),
            Some(MiddlewareError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_stream_factory_slot() {
        let mut registry = MiddlewareRegistry::new();
        assert!(registry.stream_factory().is_none());

        let factory: StreamFactory = Arc::new(|content: &[u8]| Bytes::copy_from_slice(content));
        registry.set_stream_factory(Some(factory));
        let body = registry.stream_factory().map(|f| f(b"hello"));
        assert_eq!(body, Some(Bytes::from_static(b"hello")));

        registry.set_stream_factory(None);
        assert!(registry.stream_factory().is_none());
    }

    #[test]
    fn test_debug_lists_types() {
        let mut registry = MiddlewareRegistry::new();
        registry.define("midway::middleware::Cache", passthrough("cache"));
        let debug = format!("{:?}", registry);
        assert!(debug.contains("midway::middleware::Cache"));
    }
}
