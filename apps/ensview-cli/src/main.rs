//! ensview - trees, clustering and figures from pairwise distance matrices

mod cli;
mod commands;
mod config;
mod error;

use std::io;
use std::process;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ConfigAction};
use crate::config::EnsviewConfig;
use crate::error::CliResult;

fn main() {
    let cli = Cli::parse();

    // -v wins over RUST_LOG; otherwise RUST_LOG, falling back to info
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> CliResult<()> {
    // init writes the file, so it must not need one
    let config = match &cli.command {
        Commands::Config {
            action: ConfigAction::Init { .. },
        } => EnsviewConfig::default(),
        _ => EnsviewConfig::resolve(cli.config.as_deref())?,
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    commands::run(cli.command, &config, cli.config.as_deref(), &mut out)
}
