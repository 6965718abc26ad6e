//! Error type shared by the registry, the proxy builder and middlewares.

use crate::http::{Response, StatusCode};

/// Errors produced while resolving or running middlewares.
///
/// `NotFound` and `FactoryResult` are terminal: they point at a configuration
/// mistake or a broken factory and are never retried. Anything a middleware
/// or `next` returns travels through the registry and proxies untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MiddlewareError {
    /// No registered namespace contains a type for the requested name.
    #[error("middleware '{name}' does not exist in any registered namespace")]
    NotFound { name: String },

    /// A dynamic selector produced something that is neither `false` nor a
    /// middleware reference.
    #[error("factory returned \"{kind}\" instead of a middleware or false")]
    FactoryResult { kind: String },

    /// The requested short name cannot be normalized into a type name.
    #[error("invalid middleware name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// A namespace prefix was empty or contained unexpected characters.
    #[error("invalid namespace '{0}'")]
    InvalidNamespace(String),

    /// The resolved type has no constructor form for the given argument count.
    #[error("middleware '{name}' cannot be constructed with {given} argument(s)")]
    Arity { name: String, given: usize },

    /// A constructor rejected its arguments.
    #[error("invalid constructor argument: {0}")]
    InvalidArgument(String),

    /// The process-wide registry was already installed.
    #[error("a global middleware registry is already installed")]
    AlreadyInstalled,

    /// Failure raised by a middleware while handling a request.
    #[error("middleware {middleware} failed: {message}")]
    Handler { middleware: String, message: String },
}

impl MiddlewareError {
    /// Create a handler failure attributed to `middleware`.
    pub fn handler(middleware: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Handler {
            middleware: middleware.into(),
            message: message.into(),
        }
    }

    /// HTTP status an error maps to when it escapes to the client.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Handler { .. } => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<serde_json::Error> for MiddlewareError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidArgument(err.to_string())
    }
}

impl From<MiddlewareError> for Response {
    fn from(err: MiddlewareError) -> Self {
        Response::error(err.status(), err.to_string())
    }
}
