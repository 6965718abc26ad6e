//! Constructor shapes a middleware type can be registered with.

use crate::error::MiddlewareError;
use crate::middleware::SharedMiddleware;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

type NullaryFn = dyn Fn() -> Result<SharedMiddleware, MiddlewareError> + Send + Sync;
type UnaryFn = dyn Fn(Value) -> Result<SharedMiddleware, MiddlewareError> + Send + Sync;
type VariadicFn = dyn Fn(Vec<Value>) -> Result<SharedMiddleware, MiddlewareError> + Send + Sync;

/// How a catalog entry builds its middleware.
///
/// The argument count passed to `resolve` picks the form: none for
/// `Nullary`, exactly one for `Unary`, two or more for `Variadic`. A
/// `Variadic` constructor also takes zero or one argument, receiving them as
/// a (short) vector.
#[derive(Clone)]
pub enum Constructor {
    Nullary(Arc<NullaryFn>),
    Unary(Arc<UnaryFn>),
    Variadic(Arc<VariadicFn>),
}

impl Constructor {
    pub fn nullary<F>(func: F) -> Self
    where
        F: Fn() -> Result<SharedMiddleware, MiddlewareError> + Send + Sync + 'static,
    {
        Self::Nullary(Arc::new(func))
    }

    pub fn unary<F>(func: F) -> Self
    where
        F: Fn(Value) -> Result<SharedMiddleware, MiddlewareError> + Send + Sync + 'static,
    {
        Self::Unary(Arc::new(func))
    }

    pub fn variadic<F>(func: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<SharedMiddleware, MiddlewareError> + Send + Sync + 'static,
    {
        Self::Variadic(Arc::new(func))
    }

    /// Short label for the constructor form, used in logs.
    pub fn shape(&self) -> &'static str {
        match self {
            Self::Nullary(_) => "nullary",
            Self::Unary(_) => "unary",
            Self::Variadic(_) => "variadic",
        }
    }

    /// Build an instance from positional arguments.
    ///
    /// `name` only labels the arity error.
    pub fn construct(
        &self,
        name: &str,
        mut args: Vec<Value>,
    ) -> Result<SharedMiddleware, MiddlewareError> {
        match (self, args.len()) {
            (Self::Nullary(func), 0) => func(),
            (Self::Unary(func), 1) => func(args.remove(0)),
            (Self::Variadic(func), _) => func(args),
            (_, given) => Err(MiddlewareError::Arity {
                name: name.to_string(),
                given,
            }),
        }
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constructor").field(&self.shape()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Middleware, Next};
    use serde_json::json;

    fn named(name: String) -> SharedMiddleware {
        from_fn(name, |req, res, next: Next| async move { next.run(req, res).await })
    }

    #[test]
    fn test_nullary_only_takes_no_args() {
        let ctor = Constructor::nullary(|| Ok(named("plain".into())));
        assert_eq!(ctor.construct("plain", vec![]).unwrap().name(), "plain");

        let err = ctor.construct("plain", vec![json!(1)]).err().unwrap();
        assert_eq!(
            err,
            MiddlewareError::Arity {
                name: "plain".into(),
                given: 1
            }
        );
    }

    #[test]
    fn test_unary_receives_the_single_argument() {
        let ctor = Constructor::unary(|arg| {
            let level = arg.as_str().ok_or_else(|| {
                MiddlewareError::InvalidArgument("level must be a string".into())
            })?;
            Ok(named(format!("log:{}", level)))
        });

        assert_eq!(
            ctor.construct("log", vec![json!("debug")]).unwrap().name(),
            "log:debug"
        );
        assert!(matches!(
            ctor.construct("log", vec![json!(3)]).err(),
            Some(MiddlewareError::InvalidArgument(_))
        ));
        assert!(matches!(
            ctor.construct("log", vec![]).err(),
            Some(MiddlewareError::Arity { given: 0, .. })
        ));
    }

    #[test]
    fn test_variadic_keeps_argument_order() {
        let ctor = Constructor::variadic(|args| {
            let joined: Vec<String> = args.iter().map(|a| a.to_string()).collect();
            Ok(named(joined.join(",")))
        });

        let mw = ctor
            .construct("list", vec![json!(1), json!("two"), json!(3)])
            .unwrap();
        assert_eq!(mw.name(), "1,\"two\",3");
        assert_eq!(ctor.construct("list", vec![]).unwrap().name(), "");
    }
}
