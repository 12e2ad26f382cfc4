//! Formally MAD - multi-agent tool selection by argumentation
//!
//! CLI entry point.

use std::fs;
use std::path::PathBuf;

use clap::Parser;
use eyre::{Context, Result};
use tracing::info;

use formallymad::cli::{Cli, Command, ResolveOverrides, run_resolve, semantics_listing};
use formallymad::config::Config;
use formallymad::repl;

fn setup_logging(verbose: bool) -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("formallymad")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // log to a file, stdout belongs to the REPL
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    let log_file = fs::File::create(log_dir.join("formallymad.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "Formally MAD loaded config: provider={}, model={}, workers={}",
        config.llm.provider,
        config.llm.model,
        config.workers.len()
    );

    match cli.command {
        Command::Chat => repl::run_interactive(&config, cli.verbose).await?,
        Command::Resolve {
            file,
            seed,
            permutations,
            semantics,
            parallelism,
            format,
            graph,
        } => {
            let overrides = ResolveOverrides {
                seed,
                permutations,
                semantics,
                parallelism,
            };
            print!("{}", run_resolve(&config, &file, &overrides, format, graph.as_deref())?);
        }
        Command::Semantics => print!("{}", semantics_listing()),
    }

    Ok(())
}
