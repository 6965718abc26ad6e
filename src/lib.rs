//! # Midway - middleware registry and lazy dispatch
//!
//! Midway takes care of two small jobs around request/response middleware
//! pipelines:
//!
//! 1. **Resolution by name.** A [`MiddlewareRegistry`] keeps an ordered list
//!    of namespaces and a catalog of constructors. `resolve("cache", args)`
//!    searches `<namespace>Cache` in every namespace, first match wins, and
//!    builds it with the constructor form matching the argument count.
//! 2. **Deferred binding.** [`create_proxy`] wraps a factory into a
//!    middleware that asks the factory, on every invocation and with the live
//!    request and response, whether to skip or which middleware to run.
//!
//! ## Architecture
//!
//! ```text
//! startup                                  per request
//! ───────                                  ───────────
//! MiddlewareRegistry                       executor ──▶ mw(req, res, next)
//!   namespaces: [app::mw::, midway::…]                     │
//!   catalog:    {"app::mw::Cache": ctor}                   ▼
//!        │                                 ProxyMiddleware: factory(&req, &res)
//!        ▼                                    ├─ Skip        → next(req, res)
//! resolve("cache", []) ──▶ SharedMiddleware   └─ Delegate(m) → m(req, res, next)
//! ```
//!
//! Composing many middlewares into a pipeline is left to the host; [`Next`]
//! only fixes the continuation's calling convention.
//!
//! ## Usage
//!
//! ```rust
//! use midway::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let mut registry = MiddlewareRegistry::new();
//! registry.define(
//!     "midway::middleware::PoweredBy",
//!     Constructor::unary(|value| {
//!         let value = value.as_str().unwrap_or("midway").to_string();
//!         Ok(from_fn("poweredBy", move |req, res, next: Next| {
//!             let value = value.clone();
//!             async move {
//!                 let res = next.run(req, res).await?;
//!                 Ok(res.header("X-Powered-By", value))
//!             }
//!         }))
//!     }),
//! );
//!
//! let powered_by = registry.resolve("poweredBy", vec!["midway/0.1".into()])?;
//! let only_api = create_proxy(move |req: &Request, _res: &Response| {
//!     req.path().starts_with("/api").then(|| powered_by.clone())
//! });
//!
//! let res = only_api
//!     .handle(Request::new(Method::Get, "/api/users"), Response::ok(), Next::terminal())
//!     .await?;
//! assert_eq!(res.get_header("x-powered-by"), Some("midway/0.1"));
//! # Ok::<(), MiddlewareError>(())
//! # }).unwrap();
//! ```
//!
//! ## Sharing the registry
//!
//! The registry holds no lock: mutate it during startup, then share it
//! read-only. [`registry::global`] offers a write-once process-wide slot for
//! code that cannot take the registry as a parameter.

pub mod error;
pub mod http;
pub mod middleware;
pub mod proxy;
pub mod registry;

pub use midway_macro::middleware_fn;

/// Re-export commonly used types.
pub mod prelude {
    pub use crate::error::MiddlewareError;
    pub use crate::http::{Method, Request, Response, StatusCode};
    pub use crate::middleware::{from_fn, Middleware, MiddlewareManifest, Next, SharedMiddleware};
    pub use crate::proxy::{create_proxy, select_by_name, IntoResolution, ProxyMiddleware, Resolution};
    pub use crate::registry::{
        Constructor, MiddlewareRegistry, MiddlewareSpec, RegistryConfig, DEFAULT_NAMESPACE,
    };
    pub use crate::middleware_fn;
    pub use async_trait::async_trait;
}

pub use error::MiddlewareError;
pub use http::{Request, Response};
pub use middleware::{from_fn, Middleware, Next, SharedMiddleware};
pub use proxy::{create_proxy, Resolution};
pub use registry::{Constructor, MiddlewareRegistry};
