//! # docmirror-core
//!
//! Core functionality for docmirror - an incremental, sitemap-driven mirror
//! of a remote markdown documentation corpus.
//!
//! A run discovers the documentation host from a sitemap, enumerates the
//! pages to mirror, fetches each one as markdown with bounded retries,
//! validates the payload, and writes only content whose hash changed. State
//! lives in a JSON manifest next to the mirrored files, so re-runs are
//! idempotent.
//!
//! ## Architecture
//!
//! - **Discovery**: sitemap candidates, hardened XML parsing, page selection
//!   with a static fallback ([`discovery`])
//! - **Fetching**: HTTP client with cache-busting headers, retry with jittered
//!   backoff and `429` handling ([`fetcher`], [`retry`])
//! - **Validation**: content-shape screening of fetched bodies ([`validate`])
//! - **State**: manifest load/save and output document storage
//!   ([`manifest`], [`storage`])
//! - **Orchestration**: the sequential pipeline ([`reconcile`])
//!
//! ## Quick Start
//!
//! ```no_run
//! use docmirror_core::{MirrorConfig, ReconciliationEngine};
//!
//! # async fn example() -> docmirror_core::Result<()> {
//! let config = MirrorConfig::load(None)?;
//! let report = ReconciliationEngine::new(&config)?.run().await?;
//!
//! println!(
//!     "{} of {} documents fetched",
//!     report.summary.pages_fetched_successfully,
//!     report.summary.total_pages_discovered + 1
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! All operations return [`Result<T, Error>`]. The engine absorbs
//! per-document failures; only discovery failure, an empty page list and a
//! failed manifest save escape [`ReconciliationEngine::run`].

/// Configuration for sources, fetching, output and sync
pub mod config;
/// Sitemap discovery and page enumeration
pub mod discovery;
/// Error types and result aliases
pub mod error;
/// HTTP client and retrying fetcher
pub mod fetcher;
/// Manifest types and persistence
pub mod manifest;
/// The reconciliation pipeline
pub mod reconcile;
/// Retry policy and pauses
pub mod retry;
/// Output document storage
pub mod storage;
/// Document targets and identifiers
pub mod target;
/// Topic listing over a mirror
pub mod topics;
/// Markdown content validation
pub mod validate;

// Re-export commonly used types
pub use config::{FetchConfig, MirrorConfig, OutputConfig, SourceConfig, SyncConfig};
pub use error::{Error, Result, ValidationError};
pub use fetcher::{FetchedDocument, HttpClient, RetryingFetcher};
pub use manifest::{Manifest, ManifestEntry, ManifestStore, RunSummary, content_hash};
pub use reconcile::{DocumentOutcome, ReconciliationEngine, RunReport};
pub use retry::{Attempt, Pause, RetryPolicy, TokioPause};
pub use storage::{DirectoryStore, DocumentStore};
pub use target::{DocumentTarget, safe_filename};
pub use topics::{TopicListing, list_topics};
pub use validate::validate_markdown;
