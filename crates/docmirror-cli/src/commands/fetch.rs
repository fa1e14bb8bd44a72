//! Fetch command implementation - run the mirroring pipeline once
//!
//! ```bash
//! docmirror fetch
//! docmirror fetch -o ./docs
//! ```

use anyhow::{Result, anyhow};
use colored::Colorize;
use docmirror_core::discovery::PageOrigin;
use docmirror_core::{MirrorConfig, ReconciliationEngine, RunReport};

use crate::error::CliError;

/// Execute a full fetch and print the run summary.
///
/// A run with partial failures succeeds; a run that fetched nothing is a
/// network error.
pub async fn execute(config: &MirrorConfig, quiet: bool) -> Result<()> {
    let engine = ReconciliationEngine::new(config).map_err(CliError::from)?;
    let report = engine.run().await.map_err(CliError::from)?;

    if !quiet {
        print_summary(&report);
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::network(anyhow!("No pages were fetched successfully")).into())
    }
}

/// Print the end-of-run summary to stdout.
pub fn print_summary(report: &RunReport) {
    let summary = &report.summary;
    // The changelog is fetched in addition to the discovered pages
    let attempted = summary.total_pages_discovered + 1;

    println!();
    println!("{}", "=".repeat(50));
    println!(
        "Fetch completed in {:.1}s",
        report.duration.as_secs_f64()
    );
    let origin = match report.page_origin {
        PageOrigin::Sitemap => "",
        PageOrigin::Fallback => " (fallback list)",
    };
    println!("Discovered pages: {}{origin}", summary.total_pages_discovered);
    println!(
        "Successful: {}/{} ({} updated, {} unchanged)",
        summary.pages_fetched_successfully.to_string().green(),
        attempted,
        report.updated(),
        report.unchanged()
    );

    let failed = summary.pages_failed.to_string();
    if summary.pages_failed == 0 {
        println!("Failed: {failed}");
        println!();
        println!("{}", "All pages fetched successfully!".green());
        return;
    }

    println!("Failed: {}", failed.red());
    println!();
    println!("{}", "Failed pages:".yellow());
    for page in &summary.failed_pages {
        println!("  - {page}");
    }
}
