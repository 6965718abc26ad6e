//! What a proxy factory decides for one invocation.

use crate::error::MiddlewareError;
use crate::middleware::{Middleware, SharedMiddleware};
use std::fmt;

/// Outcome of a proxy factory.
#[derive(Clone)]
pub enum Resolution {
    /// Contribute nothing; continue straight to `next`.
    Skip,
    /// Run this middleware in the proxy's place.
    Delegate(SharedMiddleware),
}

impl Resolution {
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::Skip)
    }
}

impl fmt::Debug for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("Skip"),
            Self::Delegate(middleware) => f.debug_tuple("Delegate").field(&middleware.name()).finish(),
        }
    }
}

impl From<SharedMiddleware> for Resolution {
    fn from(middleware: SharedMiddleware) -> Self {
        Self::Delegate(middleware)
    }
}

/// Values a proxy factory may return.
///
/// Implemented for [`Resolution`] itself, for `Option<SharedMiddleware>`
/// (`None` skips), and for `Result`s of either, whose errors propagate out of
/// the proxy untouched.
pub trait IntoResolution {
    fn into_resolution(self) -> Result<Resolution, MiddlewareError>;
}

impl IntoResolution for Resolution {
    fn into_resolution(self) -> Result<Resolution, MiddlewareError> {
        Ok(self)
    }
}

impl IntoResolution for Option<SharedMiddleware> {
    fn into_resolution(self) -> Result<Resolution, MiddlewareError> {
        Ok(self.map_or(Resolution::Skip, Resolution::Delegate))
    }
}

impl<T: IntoResolution> IntoResolution for Result<T, MiddlewareError> {
    fn into_resolution(self) -> Result<Resolution, MiddlewareError> {
        self?.into_resolution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::{from_fn, Next};

    fn noop() -> SharedMiddleware {
        from_fn("noop", |req, res, next: Next| async move { next.run(req, res).await })
    }

    #[test]
    fn test_option_maps_none_to_skip() {
        assert!(None::<SharedMiddleware>.into_resolution().unwrap().is_skip());
        assert!(!Some(noop()).into_resolution().unwrap().is_skip());
    }

    #[test]
    fn test_result_propagates_error() {
        let failed: Result<Resolution, MiddlewareError> =
            Err(MiddlewareError::handler("factory", "lookup failed"));
        assert_eq!(
            failed.into_resolution().unwrap_err(),
            MiddlewareError::handler("factory", "lookup failed")
        );
    }

    #[test]
    fn test_debug_shows_delegate_name() {
        assert_eq!(format!("{:?}", Resolution::from(noop())), "Delegate(\"noop\")");
        assert_eq!(format!("{:?}", Resolution::Skip), "Skip");
    }
}
