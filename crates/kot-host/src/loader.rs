use std::collections::BTreeSet;

use kot_core::errors::{ErrorInfo, KotError};
use kot_engine::Registry;
use tracing::{debug, info};

use crate::catalog::PluginCatalog;
use crate::manifest::PluginManifest;
use crate::plugin::Plugin;

/// Which plugins a load should bring in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginSelection {
    /// Loaded first, in this order. Unknown names fail the load.
    pub explicit: Vec<String>,
    /// Also load every catalog entry, sorted by entry name.
    pub discover: bool,
    /// Entry or plugin names skipped during discovery.
    pub disabled: BTreeSet<String>,
}

impl PluginSelection {
    pub fn explicit<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            explicit: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn discover_all() -> Self {
        Self {
            discover: true,
            ..Self::default()
        }
    }

    /// Folds a manifest in: enabled entries become explicit, disabled entries
    /// are excluded from discovery.
    pub fn with_manifest(mut self, manifest: &PluginManifest) -> Self {
        for name in manifest.enabled() {
            if !self.explicit.iter().any(|existing| existing == name) {
                self.explicit.push(name.to_string());
            }
        }
        self.disabled
            .extend(manifest.disabled().map(str::to_string));
        self
    }
}

fn plugin_error(code: &str, plugin: &str, message: String) -> KotError {
    KotError::Plugin(ErrorInfo::new(code, message).with_context("plugin", plugin))
}

/// Registers the selected plugins into `registry` and returns the names of
/// the plugins loaded, in load order.
///
/// A plugin reached twice (explicitly and through discovery, or under two
/// entries) registers once. Each plugin registers with its name as the
/// registry origin, so id collisions name the plugins involved.
pub fn load_plugins(
    registry: &mut Registry,
    catalog: &PluginCatalog,
    selection: &PluginSelection,
) -> Result<Vec<String>, KotError> {
    let mut queue: Vec<(&str, &dyn Plugin)> = Vec::new();
    for name in &selection.explicit {
        let plugin = catalog.get(name).ok_or_else(|| {
            plugin_error(
                "plugin.unknown",
                name,
                format!("failed to load plugin '{name}': no such plugin in the catalog"),
            )
        })?;
        queue.push((name.as_str(), plugin));
    }
    if selection.discover {
        for (entry, plugin) in catalog.discover() {
            if selection.disabled.contains(entry) || selection.disabled.contains(plugin.name()) {
                debug!(entry, "plugin disabled; skipping");
                continue;
            }
            queue.push((entry, plugin));
        }
    }

    let mut loaded: Vec<String> = Vec::new();
    for (entry, plugin) in queue {
        let name = plugin.name();
        if loaded.iter().any(|done| done == name) {
            debug!(entry, plugin = name, "plugin already loaded; skipping");
            continue;
        }
        let previous = registry.set_origin(Some(name.to_string()));
        let registered = plugin.register(registry);
        registry.set_origin(previous);
        match registered {
            Ok(()) => {}
            Err(err @ KotError::Registry(_)) => return Err(err),
            Err(err) => {
                return Err(plugin_error(
                    "plugin.load_failed",
                    name,
                    format!("failed to load plugin '{name}': {}", err.info().message),
                ))
            }
        }
        info!(entry, plugin = name, "plugin loaded");
        loaded.push(name.to_string());
    }
    Ok(loaded)
}
