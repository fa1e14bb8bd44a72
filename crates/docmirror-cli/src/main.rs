//! docmirror CLI entry point.

use colored::Colorize;
use docmirror_cli::error::exit_code_from_error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match docmirror_cli::run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "Error:".red().bold());
            ExitCode::from(exit_code_from_error(&err))
        },
    }
}
