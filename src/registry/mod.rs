//! Resolving middlewares by short name across ordered namespaces.

pub mod config;
pub mod constructor;
pub mod global;
pub mod resolver;

pub use config::{MiddlewareSpec, RegistryConfig, DEFAULT_NAMESPACE};
pub use constructor::Constructor;
pub use resolver::{MiddlewareRegistry, StreamFactory};
