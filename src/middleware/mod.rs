//! Middleware calling convention: `(request, response, next) -> response`.

pub mod handler;
pub mod manifest;
pub mod next;

pub use handler::{from_fn, FnMiddleware, Middleware, SharedMiddleware};
pub use manifest::{MiddlewareManifest, OwnedMiddlewareManifest};
pub use next::{BoxFuture, Next};
