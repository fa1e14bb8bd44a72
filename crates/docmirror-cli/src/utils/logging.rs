//! Logging initialization and colour control.
//!
//! The subscriber installed here is the only tracing sink in the process;
//! library code only emits events.

use anyhow::Result;
use colored::control as color_control;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::cli::{Cli, Commands, LogFormat, OutputFormat};

/// Initialize the logging subsystem based on CLI flags.
///
/// Info logs are suppressed when a command prints JSON on stdout, unless
/// `--verbose` was given.
///
/// # Errors
///
/// Returns an error if the global tracing subscriber cannot be set.
pub fn initialize_logging(cli: &Cli) -> Result<()> {
    let machine_output = matches!(
        cli.command,
        Commands::Topics {
            format: OutputFormat::Json
        }
    );

    let level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet || machine_output {
        Level::ERROR
    } else {
        Level::INFO
    };

    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr);

    match cli.log_format {
        LogFormat::Text => {
            let no_ansi = cli.no_color || no_color_env();
            tracing::subscriber::set_global_default(builder.with_ansi(!no_ansi).finish())?;
        },
        LogFormat::Json => {
            tracing::subscriber::set_global_default(builder.json().finish())?;
        },
    }

    if cli.no_color || no_color_env() || machine_output {
        color_control::set_override(false);
    }
    Ok(())
}

fn no_color_env() -> bool {
    std::env::var_os("NO_COLOR").is_some()
}
