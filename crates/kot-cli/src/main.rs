use std::error::Error;
use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use kot_cli::commands::plugins::{self, PluginsArgs};
use kot_cli::commands::run::{self, RunArgs};
use kot_cli::{catalog, config, logging};

#[derive(Parser, Debug)]
#[command(name = "kot", about = "Declarative checks over facts about a system")]
struct Cli {
    /// TOML configuration; defaults to ./kot.toml when present.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Log at debug level unless KOT_LOG is set.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the registered checks and print a report.
    Run(RunArgs),
    /// Inspect the plugin catalog.
    Plugins(PluginsArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = config::resolve_config(cli.config.as_deref())?;
    logging::init_logging(&config.log, cli.verbose);
    let catalog = catalog()?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Run(args) => run::execute(&args, &config, &catalog, &mut out),
        Command::Plugins(args) => plugins::execute(&args, &catalog, &mut out),
    }
}
