//! Minimal request/response pair passed through middlewares.
//!
//! The registry and the proxy never look inside these values; they exist so
//! middlewares and their tests have something concrete to hand to `next`.

mod request;
mod response;

pub use request::{Method, Request, ATTRIBUTE_KEY};
pub use response::{Response, StatusCode};
