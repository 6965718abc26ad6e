//! Proxies driven by loosely-typed selections, e.g. values read from config.

use crate::error::MiddlewareError;
use crate::http::{Request, Response};
use crate::proxy::{ProxyMiddleware, Resolution};
use crate::registry::MiddlewareRegistry;
use serde_json::Value;
use std::sync::Arc;

/// A per-request selection as a JSON value.
///
/// - `false` skips to `next`;
/// - a string names a middleware to resolve without arguments;
/// - an object `{"name": "...", "args": [...]}` resolves with arguments.
///
/// Anything else is rejected with [`MiddlewareError::FactoryResult`].
pub type Selection = Value;

/// Build a proxy that resolves middlewares by name through `registry`,
/// using whatever `selector` picks for the current request.
///
/// Resolution runs on every invocation; constructors are called each time.
pub fn select_by_name<S>(
    registry: Arc<MiddlewareRegistry>,
    selector: S,
) -> ProxyMiddleware<impl Fn(&Request, &Response) -> Result<Resolution, MiddlewareError> + Send + Sync + 'static>
where
    S: Fn(&Request, &Response) -> Selection + Send + Sync + 'static,
{
    ProxyMiddleware::new("select", move |request: &Request, response: &Response| {
        let selection = selector(request, response);
        resolve_selection(&registry, selection)
    })
}

fn resolve_selection(
    registry: &MiddlewareRegistry,
    selection: Selection,
) -> Result<Resolution, MiddlewareError> {
    match selection {
        Value::Bool(false) => Ok(Resolution::Skip),
        Value::String(name) => registry.resolve(&name, Vec::new()).map(Resolution::Delegate),
        Value::Object(mut map) => {
            let name = match map.remove("name") {
                Some(Value::String(name)) => name,
                _ => return Err(invalid("object")),
            };
            let args = match map.remove("args") {
                None | Some(Value::Null) => Vec::new(),
                Some(Value::Array(args)) => args,
                Some(_) => return Err(invalid("object")),
            };
            registry.resolve(&name, args).map(Resolution::Delegate)
        }
        other => Err(invalid(kind_of(&other))),
    }
}

fn invalid(kind: &str) -> MiddlewareError {
    MiddlewareError::FactoryResult {
        kind: kind.to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(true) => "true",
        Value::Bool(false) => "false",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Constructor;
    use crate::middleware::{from_fn, Middleware, Next};
    use serde_json::json;

    fn registry() -> MiddlewareRegistry {
        let mut registry = MiddlewareRegistry::new();
        registry.define(
            "midway::middleware::Tag",
            Constructor::variadic(|args| {
                let label = args
                    .first()
                    .and_then(Value::as_str)
                    .unwrap_or("tag")
                    .to_string();
                Ok(from_fn(label, |req, res, next: Next| async move {
                    next.run(req, res).await
                }))
            }),
        );
        registry
    }

    fn delegate_name(resolution: Resolution) -> Option<String> {
        match resolution {
            Resolution::Delegate(mw) => Some(mw.name().to_string()),
            Resolution::Skip => None,
        }
    }

    #[test]
    fn test_false_skips() {
        let resolution = resolve_selection(&registry(), json!(false)).unwrap();
        assert!(resolution.is_skip());
    }

    #[test]
    fn test_string_resolves_without_args() {
        let resolution = resolve_selection(&registry(), json!("tag")).unwrap();
        assert_eq!(delegate_name(resolution), Some("tag".to_string()));
    }

    #[test]
    fn test_object_resolves_with_args() {
        let resolution =
            resolve_selection(&registry(), json!({"name": "tag", "args": ["gold", 1]})).unwrap();
        assert_eq!(delegate_name(resolution), Some("gold".to_string()));
    }

    #[test]
    fn test_other_values_are_rejected_with_their_kind() {
        for (value, kind) in [
            (json!(42), "number"),
            (json!(true), "true"),
            (json!(null), "null"),
            (json!(["tag"]), "array"),
            (json!({"args": []}), "object"),
            (json!({"name": "tag", "args": "x"}), "object"),
        ] {
            let err = resolve_selection(&registry(), value).unwrap_err();
            assert_eq!(
                err,
                MiddlewareError::FactoryResult {
                    kind: kind.to_string()
                }
            );
        }
    }

    #[test]
    fn test_unknown_name_is_not_found() {
        let err = resolve_selection(&registry(), json!("gzip")).unwrap_err();
        assert_eq!(
            err,
            MiddlewareError::NotFound {
                name: "gzip".to_string()
            }
        );
    }
}
