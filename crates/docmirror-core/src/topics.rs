//! Listing what a mirror currently holds.

use crate::manifest::ManifestStore;
use crate::storage::{DirectoryStore, DocumentStore};
use crate::target::DOCUMENT_SUFFIX;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, warn};

/// Topics available in a mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicListing {
    /// Document identifiers without their `.md` suffix, sorted.
    pub topics: Vec<String>,
    /// When the manifest was last saved, if known.
    pub last_updated: Option<DateTime<Utc>>,
}

/// List topics from the manifest in `dir`, or from its `.md` files when the
/// manifest is missing or unreadable.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if `dir` does not exist, and a storage error
/// if the directory listing fails.
pub fn list_topics(dir: &Path, manifest_file: &str) -> Result<TopicListing> {
    if !dir.is_dir() {
        return Err(Error::NotFound(format!(
            "documentation directory {} does not exist",
            dir.display()
        )));
    }

    match ManifestStore::new(dir.join(manifest_file)).try_load() {
        Ok(Some(manifest)) => {
            debug!(entries = manifest.files.len(), "Listing topics from manifest");
            return Ok(TopicListing {
                topics: manifest.topics(),
                last_updated: manifest.last_updated,
            });
        },
        Ok(None) => debug!("No manifest, listing directory"),
        Err(e) => warn!("Ignoring unreadable manifest: {}", e),
    }

    let topics = DirectoryStore::new(dir)
        .list_documents()?
        .into_iter()
        .map(|name| {
            name.strip_suffix(DOCUMENT_SUFFIX)
                .map_or_else(|| name.clone(), str::to_string)
        })
        .collect();

    Ok(TopicListing {
        topics,
        last_updated: None,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::manifest::{Manifest, ManifestEntry};
    use chrono::TimeZone;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_lists_from_manifest() {
        let dir = TempDir::new().unwrap();
        let mut manifest = Manifest::default();
        for id in ["setup.md", "hooks.md", "changelog.md"] {
            manifest.files.insert(id.into(), ManifestEntry::default());
        }
        let saved_at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        ManifestStore::new(dir.path().join("docs_manifest.json"))
            .save(&mut manifest, saved_at)
            .unwrap();

        let listing = list_topics(dir.path(), "docs_manifest.json").unwrap();
        assert_eq!(listing.topics, vec!["changelog", "hooks", "setup"]);
        assert_eq!(listing.last_updated, Some(saved_at));
    }

    #[test]
    fn test_falls_back_to_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("overview.md"), "x").unwrap();
        fs::write(dir.path().join("sdk__migration-guide.md"), "x").unwrap();
        fs::write(dir.path().join("notes.txt"), "x").unwrap();
        fs::write(dir.path().join("docs_manifest.json"), "garbage").unwrap();

        let listing = list_topics(dir.path(), "docs_manifest.json").unwrap();
        assert_eq!(listing.topics, vec!["overview", "sdk__migration-guide"]);
        assert_eq!(listing.last_updated, None);
    }

    #[test]
    fn test_missing_directory_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = list_topics(&dir.path().join("absent"), "docs_manifest.json").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
