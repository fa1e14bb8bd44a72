//! Topics command implementation - list what the mirror holds

use anyhow::Result;
use colored::Colorize;
use docmirror_core::{MirrorConfig, TopicListing, list_topics};

use crate::cli::OutputFormat;
use crate::error::CliError;

/// Execute the topics command.
pub fn execute(config: &MirrorConfig, format: OutputFormat) -> Result<()> {
    let listing =
        list_topics(&config.output.dir, &config.output.manifest_file).map_err(CliError::from)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listing)?),
        OutputFormat::Text => print_text(&listing),
    }
    Ok(())
}

fn print_text(listing: &TopicListing) {
    if listing.topics.is_empty() {
        println!("No documentation topics found.");
        return;
    }

    println!("{}", "Available documentation topics:".bold());
    println!();
    for topic in &listing.topics {
        println!("  - {topic}");
    }
    println!();
    println!("Total: {} topics", listing.topics.len());
    if let Some(at) = listing.last_updated {
        println!("Last updated: {}", at.format("%Y-%m-%d %H:%M UTC").to_string().dimmed());
    }
}
