//! Sync command implementation - fetch only when the mirror is stale
//!
//! ```bash
//! docmirror sync              # fetch if older than sync.max_age_hours
//! docmirror sync --max-age 12
//! docmirror sync --force      # always fetch
//! ```

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use docmirror_core::{ManifestStore, MirrorConfig};
use tracing::{info, warn};

use super::fetch;

/// Whether a mirror saved `age_hours` ago is still fresh.
#[must_use]
pub fn is_fresh(age_hours: f64, max_age_hours: u32) -> bool {
    age_hours < f64::from(max_age_hours)
}

/// Execute the sync command.
pub async fn execute(
    config: &MirrorConfig,
    force: bool,
    max_age: Option<u32>,
    quiet: bool,
) -> Result<()> {
    let max_age = max_age.unwrap_or(config.sync.max_age_hours);

    if force {
        info!("Forced sync, skipping age check");
    } else {
        let store = ManifestStore::new(config.manifest_path());
        match store.try_load() {
            Ok(Some(manifest)) => match manifest.age_hours(Utc::now()) {
                Some(age) if is_fresh(age, max_age) => {
                    if !quiet {
                        println!(
                            "{} Documentation is up to date (updated {} hour(s) ago)",
                            "✓".green(),
                            whole_hours(age)
                        );
                    }
                    return Ok(());
                },
                Some(age) => info!(
                    "Documentation is {} hour(s) old. Checking for updates...",
                    whole_hours(age)
                ),
                None => info!("Manifest has no update time. Checking for updates..."),
            },
            Ok(None) => info!("No local documentation found. Fetching for the first time..."),
            Err(e) => warn!("{}. Fetching fresh copy...", e),
        }
    }

    fetch::execute(config, quiet).await
}

#[allow(clippy::cast_possible_truncation)]
fn whole_hours(age: f64) -> i64 {
    age.floor() as i64
}
