//! Library half of the `kot` binary: commands, configuration, logging,
//! renderers and the built-in plugin catalog.

pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod system;

use kot_core::KotError;
use kot_host::PluginCatalog;

/// Catalog of plugins compiled into the binary.
pub fn catalog() -> Result<PluginCatalog, KotError> {
    let mut catalog = PluginCatalog::new();
    catalog.register("system", system::SystemPlugin)?;
    Ok(catalog)
}
