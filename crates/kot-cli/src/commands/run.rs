use std::collections::BTreeSet;
use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use kot_core::KotError;
use kot_engine::{Registry, RunOptions, Runner};
use kot_host::{load_plugin_manifest, load_plugins, PluginCatalog, PluginSelection};
use tracing::info;

use crate::config::{Config, OutputFormat};
use crate::render;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Only run checks carrying at least one of these tags (comma separated).
    #[arg(long, value_delimiter = ',', value_name = "TAG")]
    pub tags: Vec<String>,
    /// Include each check's tags in the report.
    #[arg(long)]
    pub include_tags: bool,
    /// Print one line per item instead of JSON.
    #[arg(long)]
    pub human: bool,
    /// List the checks that would run and exit.
    #[arg(long)]
    pub list: bool,
    /// Load this plugin explicitly. May be repeated.
    #[arg(long = "plugin", value_name = "NAME")]
    pub plugins: Vec<String>,
    /// Plugin manifest choosing which plugins load.
    #[arg(long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,
    /// Skip catalog discovery; load only explicit plugins.
    #[arg(long)]
    pub no_discover: bool,
}

impl RunArgs {
    /// Plugin selection from flags layered over the `[plugins]` table.
    pub fn selection(&self, config: &Config) -> Result<PluginSelection, KotError> {
        let mut explicit = config.plugins.enabled.clone();
        for name in &self.plugins {
            if !explicit.contains(name) {
                explicit.push(name.clone());
            }
        }
        let mut selection = PluginSelection::explicit(explicit);
        selection.discover = config.plugins.discover && !self.no_discover;
        let manifest = self.manifest.as_ref().or(config.plugins.manifest.as_ref());
        if let Some(path) = manifest {
            let manifest = load_plugin_manifest(path)?;
            selection = selection.with_manifest(&manifest);
        }
        Ok(selection)
    }

    /// Tag filter: flags replace the configured tags when given.
    pub fn run_options(&self, config: &Config) -> RunOptions {
        let tags: BTreeSet<String> = if self.tags.is_empty() {
            config.run.tags.iter().cloned().collect()
        } else {
            self.tags.iter().map(|tag| tag.trim().to_string()).collect()
        };
        if tags.is_empty() {
            RunOptions::default()
        } else {
            RunOptions::default().with_allowed_tags(tags)
        }
    }

    pub fn format(&self, config: &Config) -> OutputFormat {
        if self.human {
            OutputFormat::Human
        } else {
            config.run.format
        }
    }
}

/// Loads plugins, then lists or runs the checks and writes the output.
pub fn execute(
    args: &RunArgs,
    config: &Config,
    catalog: &PluginCatalog,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    let mut registry = Registry::new();
    let loaded = load_plugins(&mut registry, catalog, &args.selection(config)?)?;
    info!(plugins = ?loaded, checks = registry.checks().count(), "registry ready");

    let runner = Runner::with_options(args.run_options(config));
    if args.list {
        render::render_list(&registry, &runner, out)?;
        return Ok(());
    }

    let result = runner.run(&registry).map_err(KotError::from)?;
    let report = result.to_report(args.include_tags || config.run.include_tags);
    match args.format(config) {
        OutputFormat::Json => render::render_json(&report, out)?,
        OutputFormat::Human => render::render_human(&report, out)?,
    }
    Ok(())
}
