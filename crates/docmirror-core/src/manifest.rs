//! Persistent per-document state and run metadata.
//!
//! The manifest is a JSON file next to the mirrored documents:
//!
//! ```json
//! {
//!   "files": {
//!     "overview.md": {
//!       "original_url": "https://docs.example.com/en/docs/claude-code/overview",
//!       "original_md_url": "https://docs.example.com/en/docs/claude-code/overview.md",
//!       "hash": "9f86d081884c7d65...",
//!       "last_updated": "2025-01-15T10:30:00+00:00"
//!     }
//!   },
//!   "last_updated": "2025-01-15T10:31:12+00:00",
//!   "source": "https://docs.anthropic.com/en/docs/claude-code/",
//!   "skill": "claude-code-knowledge",
//!   "fetch_metadata": { "pages_fetched_successfully": 44, "...": "..." }
//! }
//! ```
//!
//! Loading is forgiving: a missing, unreadable or malformed file yields an
//! empty manifest, missing keys take defaults, and timestamps written without
//! an offset are read as UTC. Saving is atomic.

use crate::storage::write_atomic;
use crate::{Error, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// State recorded for one mirrored document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestEntry {
    /// Human-facing page URL.
    pub original_url: String,
    /// URL the content was fetched from.
    #[serde(alias = "original_raw_url")]
    pub original_md_url: String,
    /// Lower-case hex SHA-256 of the stored content.
    pub hash: String,
    /// When the content last changed.
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Origin marker for documents outside the documentation site.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Summary of one completed run, stored as `fetch_metadata`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSummary {
    /// When the run finished.
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_fetch_completed: Option<DateTime<Utc>>,
    /// Wall-clock duration of the run.
    pub fetch_duration_seconds: f64,
    /// Pages produced by enumeration (the changelog is not counted).
    pub total_pages_discovered: usize,
    /// Documents fetched and recorded, changelog included.
    pub pages_fetched_successfully: usize,
    /// Documents that failed.
    pub pages_failed: usize,
    /// Identifiers of the failed documents, in processing order.
    pub failed_pages: Vec<String>,
    /// Sitemap the run used.
    pub sitemap_url: String,
    /// Base address documents were fetched from.
    pub base_url: String,
    /// Entries in the saved manifest.
    pub total_files: usize,
}

impl RunSummary {
    /// Whether at least one document was fetched.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.pages_fetched_successfully > 0
    }
}

/// Full manifest contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Entries keyed by document identifier.
    pub files: BTreeMap<String, ManifestEntry>,
    /// When the manifest was last saved.
    #[serde(with = "timestamp", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Label of the mirrored corpus.
    pub source: String,
    /// Name of the consumer the mirror is built for.
    pub skill: String,
    /// Summary of the run that wrote this manifest.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetch_metadata: Option<RunSummary>,
}

impl Manifest {
    /// Empty manifest carrying corpus labels.
    #[must_use]
    pub fn new(source: impl Into<String>, skill: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            skill: skill.into(),
            ..Self::default()
        }
    }

    /// Stored hash for `id`, if any.
    #[must_use]
    pub fn hash_of(&self, id: &str) -> Option<&str> {
        self.files
            .get(id)
            .map(|entry| entry.hash.as_str())
            .filter(|hash| !hash.is_empty())
    }

    /// Identifiers without their `.md` suffix, sorted.
    #[must_use]
    pub fn topics(&self) -> Vec<String> {
        self.files
            .keys()
            .map(|id| id.strip_suffix(".md").unwrap_or(id).to_string())
            .collect()
    }

    /// Hours elapsed between the last save and `now`.
    #[must_use]
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.last_updated.map(|at| {
            #[allow(clippy::cast_precision_loss)]
            let seconds = (now - at).num_seconds() as f64;
            seconds / 3600.0
        })
    }
}

/// Lower-case hex SHA-256 of `content`.
///
/// ```rust
/// use docmirror_core::manifest::content_hash;
///
/// assert_eq!(
///     content_hash("abc"),
///     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
/// );
/// ```
#[must_use]
pub fn content_hash(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Reads and writes the manifest file.
#[derive(Debug, Clone)]
pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    /// Store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the manifest file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the manifest, treating any failure as empty prior state.
    #[must_use]
    pub fn load(&self) -> Manifest {
        match self.try_load() {
            Ok(Some(manifest)) => {
                debug!(entries = manifest.files.len(), "Loaded manifest");
                manifest
            },
            Ok(None) => Manifest::default(),
            Err(e) => {
                warn!("Failed to load manifest: {}", e);
                Manifest::default()
            },
        }
    }

    /// Load the manifest, distinguishing a missing file from a broken one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestLoad`] if the file exists but cannot be read
    /// or parsed.
    pub fn try_load(&self) -> Result<Option<Manifest>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let json = fs::read_to_string(&self.path)
            .map_err(|e| Error::ManifestLoad(format!("{}: {e}", self.path.display())))?;
        let manifest = serde_json::from_str(&json)
            .map_err(|e| Error::ManifestLoad(format!("{}: {e}", self.path.display())))?;
        Ok(Some(manifest))
    }

    /// Stamp `last_updated` with `now` and replace the stored manifest.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ManifestSave`] if the manifest cannot be serialized
    /// or written.
    pub fn save(&self, manifest: &mut Manifest, now: DateTime<Utc>) -> Result<()> {
        manifest.last_updated = Some(now);

        let json = serde_json::to_string_pretty(manifest)
            .map_err(|e| Error::ManifestSave(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| {
                Error::ManifestSave(format!("{}: {e}", parent.display()))
            })?;
        }
        write_atomic(&self.path, json.as_bytes())
            .map_err(|e| Error::ManifestSave(e.to_string()))?;

        info!(
            "Saved manifest with {} entries to {}",
            manifest.files.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Parse an RFC 3339 timestamp, or a naive ISO-8601 one read as UTC.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    debug!(timestamp = %s, "Could not parse timestamp");
    None
}

mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(super::parse_timestamp))
    }
}
