//! Static plugin catalog and loader for kot providers.

mod catalog;
mod loader;
mod manifest;
mod plugin;

pub use catalog::PluginCatalog;
pub use loader::{load_plugins, PluginSelection};
pub use manifest::{load_plugin_manifest, ManifestEntry, PluginManifest};
pub use plugin::{FnPlugin, Plugin};
