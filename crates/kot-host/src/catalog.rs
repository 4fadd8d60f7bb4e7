use std::collections::BTreeMap;

use kot_core::errors::{ErrorInfo, KotError};

use crate::plugin::Plugin;

/// Named plugin entries known to the host, listed in name order.
#[derive(Default)]
pub struct PluginCatalog {
    entries: BTreeMap<String, Box<dyn Plugin>>,
}

impl PluginCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        entry: impl Into<String>,
        plugin: impl Plugin + 'static,
    ) -> Result<(), KotError> {
        let entry = entry.into();
        if self.entries.contains_key(&entry) {
            return Err(KotError::Plugin(
                ErrorInfo::new(
                    "plugin.duplicate_entry",
                    format!("plugin entry '{entry}' is already registered"),
                )
                .with_context("entry", entry),
            ));
        }
        self.entries.insert(entry, Box::new(plugin));
        Ok(())
    }

    /// Every entry as `(entry name, plugin)`, sorted by entry name.
    pub fn discover(&self) -> Vec<(&str, &dyn Plugin)> {
        self.entries
            .iter()
            .map(|(entry, plugin)| (entry.as_str(), plugin.as_ref()))
            .collect()
    }

    /// Looks a plugin up by entry name, then by plugin name.
    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.entries
            .get(name)
            .or_else(|| self.entries.values().find(|plugin| plugin.name() == name))
            .map(|plugin| plugin.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
