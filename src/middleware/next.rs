//! The `next` continuation handed to every middleware.

use crate::error::MiddlewareError;
use crate::http::{Request, Response};
use crate::middleware::handler::{Middleware, SharedMiddleware};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A heap-allocated future resolving to the rest of the pipeline's response.
pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send + 'static>>;

type Continuation =
    dyn Fn(Request, Response) -> BoxFuture<Result<Response, MiddlewareError>> + Send + Sync;

/// Continuation to the remainder of a pipeline.
///
/// `Next` is cheap to clone (one `Arc`), so a middleware can hold on to it or
/// hand it to a delegate. How continuations are chained is up to the
/// pipeline executor; this type only fixes the calling convention.
#[derive(Clone)]
pub struct Next {
    inner: Arc<Continuation>,
}

impl Next {
    /// Build a continuation from an async closure.
    pub fn new<F, Fut>(func: F) -> Self
    where
        F: Fn(Request, Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Response, MiddlewareError>> + Send + 'static,
    {
        Self {
            inner: Arc::new(
                move |request, response| -> BoxFuture<Result<Response, MiddlewareError>> {
                    Box::pin(func(request, response))
                },
            ),
        }
    }

    /// A continuation that ends the pipeline and returns the response as-is.
    pub fn terminal() -> Self {
        Self::new(|_request, response| async move { Ok(response) })
    }

    /// A continuation that runs `middleware` in front of `next`.
    pub fn through(middleware: SharedMiddleware, next: Next) -> Self {
        Self::new(move |request, response| {
            let middleware = middleware.clone();
            let next = next.clone();
            async move { middleware.handle(request, response, next).await }
        })
    }

    /// Continue with the rest of the pipeline.
    pub async fn run(&self, request: Request, response: Response) -> Result<Response, MiddlewareError> {
        (self.inner)(request, response).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}
