use std::fs;
use std::path::{Path, PathBuf};

use kot_core::errors::{ErrorInfo, KotError};
use serde::{Deserialize, Serialize};

/// File picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "kot.toml";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Human,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub include_tags: bool,
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `KOT_LOG` is unset.
    #[serde(default = "LogConfig::default_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl LogConfig {
    fn default_level() -> String {
        "warn".to_string()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Plugins loaded explicitly, before discovery.
    #[serde(default)]
    pub enabled: Vec<String>,
    /// Load every catalog entry.
    #[serde(default = "PluginsConfig::default_discover")]
    pub discover: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manifest: Option<PathBuf>,
}

impl PluginsConfig {
    const fn default_discover() -> bool {
        true
    }
}

impl Default for PluginsConfig {
    fn default() -> Self {
        Self {
            enabled: Vec::new(),
            discover: Self::default_discover(),
            manifest: None,
        }
    }
}

/// Contents of `kot.toml`. Every table and key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
}

pub fn load_config(path: &Path) -> Result<Config, KotError> {
    let contents = fs::read_to_string(path).map_err(|err| {
        KotError::Config(
            ErrorInfo::new("config.read", format!("failed to read config: {err}"))
                .with_context("path", path.display().to_string()),
        )
    })?;
    toml::from_str(&contents).map_err(|err| {
        KotError::Config(
            ErrorInfo::new("config.parse", err.to_string())
                .with_context("path", path.display().to_string())
                .with_hint("see the [run], [log] and [plugins] tables"),
        )
    })
}

/// Loads `explicit` when given, else `kot.toml` from the working directory
/// when present, else defaults.
pub fn resolve_config(explicit: Option<&Path>) -> Result<Config, KotError> {
    match explicit {
        Some(path) => load_config(path),
        None => {
            let fallback = Path::new(DEFAULT_CONFIG_FILE);
            if fallback.is_file() {
                load_config(fallback)
            } else {
                Ok(Config::default())
            }
        }
    }
}
