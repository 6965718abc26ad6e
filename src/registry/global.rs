//! Optional process-wide registry.
//!
//! Prefer passing a [`MiddlewareRegistry`] (or an `Arc` of one) explicitly.
//! For code that cannot thread it through, the host may install one registry
//! at startup. Installation happens at most once; after that the registry is
//! read-only for the rest of the process.

use crate::error::MiddlewareError;
use crate::registry::MiddlewareRegistry;
use std::sync::OnceLock;
use tracing::info;

static GLOBAL: OnceLock<MiddlewareRegistry> = OnceLock::new();

/// Install `registry` as the process-wide default.
pub fn install(registry: MiddlewareRegistry) -> Result<&'static MiddlewareRegistry, MiddlewareError> {
    let mut slot = Some(registry);
    let installed = GLOBAL.get_or_init(|| {
        info!("Installed global middleware registry");
        slot.take().unwrap_or_default()
    });
    if slot.is_some() {
        return Err(MiddlewareError::AlreadyInstalled);
    }
    Ok(installed)
}

/// The installed registry, if any.
pub fn registry() -> Option<&'static MiddlewareRegistry> {
    GLOBAL.get()
}
