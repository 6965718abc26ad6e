//! Proxy middleware whose real behavior is chosen per invocation.
//!
//! A proxy wraps a factory. Every time the pipeline reaches the proxy, the
//! factory is asked, with the live request and response, what should run:
//!
//! ```text
//! proxy.handle(req, res, next)
//!   └─ factory(&req, &res)
//!        ├─ Skip         → next.run(req, res)
//!        ├─ Delegate(m)  → m.handle(req, res, next)
//!        └─ Err(e)       → Err(e)
//! ```
//!
//! Nothing is cached between invocations. A factory that wants to reuse
//! instances keeps them itself.

mod resolution;
mod select;

pub use resolution::{IntoResolution, Resolution};
pub use select::{select_by_name, Selection};

use crate::error::MiddlewareError;
use crate::http::{Request, Response};
use crate::middleware::{Middleware, Next};
use async_trait::async_trait;
use tracing::debug;

/// Middleware that defers to whatever its factory returns for each call.
pub struct ProxyMiddleware<F> {
    name: String,
    factory: F,
}

/// Wrap `factory` into a middleware resolved lazily on every invocation.
///
/// ```rust
/// use midway::prelude::*;
///
/// let admin_only = from_fn("admin-only", |_req, _res, _next| async {
///     Ok(Response::error(StatusCode::FORBIDDEN, "forbidden"))
/// });
///
/// let guard = create_proxy(move |req: &Request, _res: &Response| {
///     if req.path().starts_with("/admin") {
///         Resolution::Delegate(admin_only.clone())
///     } else {
///         Resolution::Skip
///     }
/// });
/// # let _ = guard;
/// ```
pub fn create_proxy<F, R>(factory: F) -> ProxyMiddleware<F>
where
    F: Fn(&Request, &Response) -> R + Send + Sync + 'static,
    R: IntoResolution + 'static,
{
    ProxyMiddleware::new("proxy", factory)
}

impl<F> ProxyMiddleware<F> {
    /// Create a proxy with a custom name for logs.
    pub fn new(name: impl Into<String>, factory: F) -> Self {
        Self {
            name: name.into(),
            factory,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl<F, R> Middleware for ProxyMiddleware<F>
where
    F: Fn(&Request, &Response) -> R + Send + Sync + 'static,
    R: IntoResolution + 'static,
{
    async fn handle(
        &self,
        request: Request,
        response: Response,
        next: Next,
    ) -> Result<Response, MiddlewareError> {
        let resolution = (self.factory)(&request, &response).into_resolution()?;

        match resolution {
            Resolution::Skip => {
                debug!("Proxy {} skipped for {} {}", self.name, request.method, request.url);
                next.run(request, response).await
            }
            Resolution::Delegate(middleware) => {
                debug!(
                    "Proxy {} delegating to {} for {} {}",
                    self.name,
                    middleware.name(),
                    request.method,
                    request.url
                );
                middleware.handle(request, response, next).await
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use crate::middleware::{from_fn, SharedMiddleware};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_next(calls: Arc<AtomicUsize>) -> Next {
        Next::new(move |_req, res: Response| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(res.header("X-Next", "yes"))
            }
        })
    }

    #[test]
    fn test_skip_goes_straight_to_next() {
        let next_calls = Arc::new(AtomicUsize::new(0));
        let proxy = create_proxy(|_req: &Request, _res: &Response| Resolution::Skip);

        let response = tokio_test::block_on(proxy.handle(
            Request::default(),
            Response::ok(),
            counting_next(next_calls.clone()),
        ))
        .unwrap();

        assert_eq!(response.get_header("x-next"), Some("yes"));
        assert_eq!(next_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_factory_error_stops_everything() {
        let next_calls = Arc::new(AtomicUsize::new(0));
        let proxy = create_proxy(|_req: &Request, _res: &Response| -> Result<Resolution, MiddlewareError> {
            Err(MiddlewareError::handler("factory", "boom"))
        });

        let err = tokio_test::block_on(proxy.handle(
            Request::default(),
            Response::ok(),
            counting_next(next_calls.clone()),
        ))
        .unwrap_err();

        assert_eq!(err, MiddlewareError::handler("factory", "boom"));
        assert_eq!(next_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_factory_sees_live_request() {
        let json_only: SharedMiddleware = from_fn("json", |_req, res: Response, _next| async move {
            Ok(res.header("Content-Type", "application/json"))
        });
        let proxy = create_proxy(move |req: &Request, _res: &Response| {
            (req.get_header("accept") == Some("application/json")).then(|| json_only.clone())
        })
        .named("negotiate");

        assert_eq!(proxy.name(), "negotiate");

        let json = tokio_test::block_on(proxy.handle(
            Request::new(Method::Get, "/").header("Accept", "application/json"),
            Response::ok(),
            Next::terminal(),
        ))
        .unwrap();
        assert_eq!(json.get_header("content-type"), Some("application/json"));

        let plain = tokio_test::block_on(proxy.handle(
            Request::new(Method::Get, "/"),
            Response::ok(),
            Next::terminal(),
        ))
        .unwrap();
        assert_eq!(plain.get_header("content-type"), None);
    }
}
