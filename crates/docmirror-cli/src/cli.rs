//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Mirror the documentation now
//! docmirror fetch
//!
//! # Mirror only if the local copy is older than the configured age
//! docmirror sync
//! docmirror sync --force
//!
//! # Show what the mirror holds
//! docmirror topics
//! docmirror topics --format json
//! ```
//!
//! Global options (`--config`, `--output`, verbosity, colour and log format)
//! apply to every subcommand.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Main CLI structure for the `docmirror` command
#[derive(Parser, Clone, Debug)]
#[command(name = "docmirror")]
#[command(version)]
#[command(about = "docmirror - Incremental mirror of a markdown documentation site", long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Show debug logs
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress informational messages (only show errors)
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable coloured output (also honours `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file to use instead of the default location
    #[arg(long, global = true, env = "DOCMIRROR_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output directory for mirrored documents and the manifest
    #[arg(short = 'o', long, global = true, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Log line format on stderr
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

/// Log line format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

/// Output format for listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Machine-readable JSON
    Json,
}

/// Available subcommands
#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Fetch the documentation and update the mirror
    Fetch,

    /// Fetch only when the mirror is missing or older than the configured age
    Sync {
        /// Fetch regardless of the mirror's age
        #[arg(long)]
        force: bool,

        /// Override the maximum age in hours
        #[arg(long, value_name = "HOURS")]
        max_age: Option<u32>,
    },

    /// List the topics available in the mirror
    Topics {
        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
