use std::error::Error;
use std::io::Write;

use clap::Args;
use kot_host::PluginCatalog;

#[derive(Args, Debug, Default)]
pub struct PluginsArgs {
    /// Print every plugin in the catalog.
    #[arg(long)]
    pub list: bool,
}

pub fn execute(
    args: &PluginsArgs,
    catalog: &PluginCatalog,
    out: &mut impl Write,
) -> Result<(), Box<dyn Error>> {
    if !args.list {
        writeln!(out, "{} plugin(s) available; pass --list to show them", catalog.len())?;
        return Ok(());
    }
    for (entry, plugin) in catalog.discover() {
        match plugin.description() {
            Some(description) => writeln!(out, "{entry} {} - {description}", plugin.name())?,
            None => writeln!(out, "{entry} {}", plugin.name())?,
        }
    }
    Ok(())
}
