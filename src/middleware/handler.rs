//! The middleware trait and closure adapter.

use crate::error::MiddlewareError;
use crate::http::{Request, Response};
use crate::middleware::manifest::MiddlewareManifest;
use crate::middleware::next::Next;
use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;

/// A unit of request/response processing.
///
/// A middleware receives the current request and response together with the
/// continuation to the rest of the pipeline. It may return early with its own
/// response, or call [`Next::run`] and post-process what comes back.
///
/// Errors returned from `next` should be propagated as-is; nothing in this
/// crate wraps or swallows them.
#[async_trait]
pub trait Middleware: Send + Sync {
    /// Handle one invocation.
    async fn handle(
        &self,
        request: Request,
        response: Response,
        next: Next,
    ) -> Result<Response, MiddlewareError>;

    /// Name used in logs.
    fn name(&self) -> &str;

    /// Compile-time metadata, when the type was generated with `#[middleware]`.
    fn manifest(&self) -> Option<&'static MiddlewareManifest> {
        None
    }
}

/// A middleware shared between pipelines and proxies.
pub type SharedMiddleware = Arc<dyn Middleware>;

/// Middleware backed by an async closure.
pub struct FnMiddleware<F> {
    name: String,
    func: F,
}

/// Turn an async closure into a [`SharedMiddleware`].
///
/// ```rust
/// use midway::prelude::*;
///
/// let powered_by = from_fn("powered-by", |req, res, next: Next| async move {
///     let res = next.run(req, res).await?;
///     Ok(res.header("X-Powered-By", "midway"))
/// });
/// assert_eq!(powered_by.name(), "powered-by");
/// ```
pub fn from_fn<F, Fut>(name: impl Into<String>, func: F) -> SharedMiddleware
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, MiddlewareError>> + Send + 'static,
{
    Arc::new(FnMiddleware {
        name: name.into(),
        func,
    })
}

#[async_trait]
impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, Response, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Response, MiddlewareError>> + Send + 'static,
{
    async fn handle(
        &self,
        request: Request,
        response: Response,
        next: Next,
    ) -> Result<Response, MiddlewareError> {
        (self.func)(request, response, next).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
