//! docmirror CLI - incremental mirror of a markdown documentation site
//!
//! The binary is a thin layer over `docmirror-core`: it resolves
//! configuration, installs the logging subscriber, dispatches the subcommand
//! and maps failures to semantic exit codes (see [`error`]).

use anyhow::Result;
use clap::Parser;
use docmirror_core::MirrorConfig;

pub mod cli;
pub mod commands;
pub mod error;
pub mod utils;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::utils::initialize_logging;

/// Execute the docmirror CLI with the current arguments and environment.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the command fails.
pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    initialize_logging(&cli)?;

    let config = resolve_config(&cli)?;
    tracing::debug!(output = %config.output.dir.display(), "Resolved configuration");

    match cli.command {
        Commands::Fetch => commands::fetch::execute(&config, cli.quiet).await,
        Commands::Sync { force, max_age } => {
            commands::sync::execute(&config, force, max_age, cli.quiet).await
        },
        Commands::Topics { format } => commands::topics::execute(&config, format),
    }
}

/// Layer the config file, environment and command-line flags.
fn resolve_config(cli: &Cli) -> Result<MirrorConfig> {
    let mut config = MirrorConfig::load(cli.config.as_deref()).map_err(CliError::usage)?;
    if let Some(dir) = &cli.output {
        config.output.dir.clone_from(dir);
    }
    config.validate().map_err(CliError::usage)?;
    Ok(config)
}
