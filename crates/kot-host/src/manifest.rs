use std::fs;
use std::path::Path;

use kot_core::errors::{ErrorInfo, KotError};
use serde::{Deserialize, Serialize};

const fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// TOML list of `[[plugin]]` entries choosing which catalog plugins load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginManifest {
    #[serde(default, rename = "plugin")]
    pub plugins: Vec<ManifestEntry>,
}

impl PluginManifest {
    pub fn validate(&self) -> Result<(), KotError> {
        for (idx, entry) in self.plugins.iter().enumerate() {
            if entry.name.trim().is_empty() {
                return Err(KotError::Config(
                    ErrorInfo::new("plugin.manifest_name", "plugin manifest entry missing name")
                        .with_context("index", idx.to_string()),
                ));
            }
        }
        Ok(())
    }

    pub fn enabled(&self) -> impl Iterator<Item = &str> {
        self.plugins
            .iter()
            .filter(|entry| entry.enabled)
            .map(|entry| entry.name.as_str())
    }

    pub fn disabled(&self) -> impl Iterator<Item = &str> {
        self.plugins
            .iter()
            .filter(|entry| !entry.enabled)
            .map(|entry| entry.name.as_str())
    }
}

pub fn load_plugin_manifest(path: &Path) -> Result<PluginManifest, KotError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        KotError::Config(
            ErrorInfo::new(
                "plugin.read_manifest",
                format!("failed to read manifest: {err}"),
            )
            .with_context("path", path.display().to_string()),
        )
    })?;
    let manifest: PluginManifest = toml::from_str(&contents).map_err(|err| {
        KotError::Config(
            ErrorInfo::new("plugin.parse_manifest", err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    manifest.validate()?;
    Ok(manifest)
}
