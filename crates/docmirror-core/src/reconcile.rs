//! The mirroring pipeline: discover, enumerate, fetch each, reconcile, persist.
//!
//! Documents are processed strictly one after another. For each one the
//! fetched body is hashed and compared with the previous manifest; only
//! changed content is written, and `last_updated` moves only when the content
//! did. A fresh manifest is built during the run and replaces the stored one
//! at the end, so documents no longer listed by the sitemap drop out.
//!
//! Per-document failures are recorded and the run continues. Discovery
//! failure, an empty page list and a failed manifest save end the run with
//! an error; a run with zero successful fetches completes but reports
//! failure through [`RunReport::is_success`].

use crate::config::{MirrorConfig, SourceConfig};
use crate::discovery::{DiscoveredSource, PageList, PageOrigin, discover_source, enumerate_pages};
use crate::fetcher::{FetchedDocument, RetryingFetcher};
use crate::manifest::{Manifest, ManifestEntry, ManifestStore, RunSummary, content_hash};
use crate::storage::{DirectoryStore, DocumentStore};
use crate::target::DocumentTarget;
use crate::{Error, Result};
use chrono::Utc;
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};

/// Identifier recorded in `failed_pages` when the changelog cannot be fetched.
pub const CHANGELOG_FAILURE_ID: &str = "changelog";

/// `source` marker stored on the changelog's manifest entry.
pub const CHANGELOG_SOURCE: &str = "claude-code-repository";

/// What happened to one document during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    /// New or changed content was written.
    Updated {
        /// Document identifier.
        id: String,
    },
    /// Content matched the previous run.
    Unchanged {
        /// Document identifier.
        id: String,
    },
    /// The document could not be fetched, validated or stored.
    Failed {
        /// Document identifier.
        id: String,
        /// Why it failed.
        reason: String,
    },
}

impl DocumentOutcome {
    /// Identifier the outcome refers to.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Updated { id } | Self::Unchanged { id } | Self::Failed { id, .. } => id,
        }
    }

    /// Whether the document ended up recorded in the new manifest.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Counts and metadata, as written to the manifest.
    pub summary: RunSummary,
    /// Per-document outcomes in processing order, changelog last.
    pub outcomes: Vec<DocumentOutcome>,
    /// Whether the page list came from the sitemap or the fallback list.
    pub page_origin: PageOrigin,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl RunReport {
    /// A run succeeds when at least one document was fetched.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Documents whose content was written this run.
    #[must_use]
    pub fn updated(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Updated { .. }))
            .count()
    }

    /// Documents whose content matched the previous run.
    #[must_use]
    pub fn unchanged(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, DocumentOutcome::Unchanged { .. }))
            .count()
    }
}

/// Source locations recorded for a document.
struct Origin {
    page_url: String,
    raw_url: String,
    source: Option<String>,
}

/// Drives a full mirroring run.
pub struct ReconciliationEngine {
    source: SourceConfig,
    request_delay: Duration,
    fetcher: RetryingFetcher,
    store: Box<dyn DocumentStore>,
    manifests: ManifestStore,
}

impl ReconciliationEngine {
    /// Engine writing to the configured output directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &MirrorConfig) -> Result<Self> {
        Ok(Self::with_parts(
            config,
            RetryingFetcher::new(&config.fetch)?,
            Box::new(DirectoryStore::new(&config.output.dir)),
            ManifestStore::new(config.manifest_path()),
        ))
    }

    /// Engine assembled from explicit collaborators.
    #[must_use]
    pub fn with_parts(
        config: &MirrorConfig,
        fetcher: RetryingFetcher,
        store: Box<dyn DocumentStore>,
        manifests: ManifestStore,
    ) -> Self {
        Self {
            source: config.source.clone(),
            request_delay: Duration::from_millis(config.fetch.request_delay_ms),
            fetcher,
            store,
            manifests,
        }
    }

    /// Run the pipeline once.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Discovery`] when no sitemap candidate is usable,
    /// [`Error::NoDocuments`] when enumeration and fallback yield nothing,
    /// and [`Error::ManifestSave`] when the new manifest cannot be written.
    #[instrument(skip(self))]
    pub async fn run(&self) -> Result<RunReport> {
        let started = Instant::now();
        info!("Starting documentation fetch");

        let previous = self.manifests.load();
        let (discovered, pages) = self.discover().await?;

        let mut next = Manifest::new(&self.source.label, &self.source.skill);
        let mut outcomes = self.fetch_pages(&discovered, &pages, &previous, &mut next).await;

        info!("Fetching changelog...");
        outcomes.push(self.fetch_changelog(&previous, &mut next).await);

        let duration = started.elapsed();
        let summary = summarize(&outcomes, &pages, &discovered, &next, duration);
        next.fetch_metadata = Some(summary.clone());
        self.manifests.save(&mut next, Utc::now())?;

        if !summary.is_success() {
            error!("No pages were fetched successfully!");
        }

        Ok(RunReport {
            summary,
            outcomes,
            page_origin: pages.origin,
            duration,
        })
    }

    async fn discover(&self) -> Result<(DiscoveredSource, PageList)> {
        let http = self.fetcher.http();
        let discovered = discover_source(http, &self.source.sitemap_urls).await?;
        let pages = enumerate_pages(http, &discovered.sitemap_url, &self.source).await;
        if pages.is_empty() {
            error!("No documentation pages discovered!");
            return Err(Error::NoDocuments);
        }
        Ok((discovered, pages))
    }

    async fn fetch_pages(
        &self,
        discovered: &DiscoveredSource,
        pages: &PageList,
        previous: &Manifest,
        next: &mut Manifest,
    ) -> Vec<DocumentOutcome> {
        let targets = pages.targets();
        let total = targets.len();
        let mut outcomes = Vec::with_capacity(total + 1);

        for (index, target) in targets.iter().enumerate() {
            info!("Processing {}/{}: {}", index + 1, total, target.path);

            let result = self
                .fetcher
                .fetch_document(target, &discovered.base_url)
                .await
                .and_then(|doc| {
                    let origin = Origin {
                        page_url: target.page_url(&discovered.base_url),
                        raw_url: target.markdown_url(&discovered.base_url),
                        source: None,
                    };
                    self.reconcile(doc, origin, previous, next)
                });

            let outcome = result.unwrap_or_else(|e| {
                error!("Failed to process {}: {}", target.path, e);
                failed(target, &e)
            });

            let pause = outcome.is_success() && index + 1 < total;
            outcomes.push(outcome);
            if pause {
                self.fetcher.pause().pause(self.request_delay).await;
            }
        }

        outcomes
    }

    async fn fetch_changelog(&self, previous: &Manifest, next: &mut Manifest) -> DocumentOutcome {
        let result = self
            .fetcher
            .fetch_changelog(&self.source)
            .await
            .and_then(|doc| {
                let origin = Origin {
                    page_url: self.source.changelog_page_url.clone(),
                    raw_url: self.source.changelog_url.clone(),
                    source: Some(CHANGELOG_SOURCE.to_string()),
                };
                self.reconcile(doc, origin, previous, next)
            });

        result.unwrap_or_else(|e| {
            error!("Failed to fetch changelog: {}", e);
            DocumentOutcome::Failed {
                id: CHANGELOG_FAILURE_ID.to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Compare a fetched document with its previous state, persist it if
    /// needed, and record it in `next`.
    fn reconcile(
        &self,
        doc: FetchedDocument,
        origin: Origin,
        previous: &Manifest,
        next: &mut Manifest,
    ) -> Result<DocumentOutcome> {
        let id = doc.filename;
        let hash = content_hash(&doc.content);
        let prior = previous.files.get(&id);
        let changed = previous.hash_of(&id) != Some(hash.as_str());

        let (last_updated, outcome) = if changed {
            self.store.write_document(&id, &doc.content)?;
            info!("Updated: {}", id);
            (Utc::now(), DocumentOutcome::Updated { id: id.clone() })
        } else {
            if !self.store.has_document(&id) {
                warn!("Restoring missing file for unchanged document {}", id);
                self.store.write_document(&id, &doc.content)?;
            }
            info!("Unchanged: {}", id);
            let kept = prior
                .and_then(|entry| entry.last_updated)
                .unwrap_or_else(Utc::now);
            (kept, DocumentOutcome::Unchanged { id: id.clone() })
        };

        next.files.insert(
            id,
            ManifestEntry {
                original_url: origin.page_url,
                original_md_url: origin.raw_url,
                hash,
                last_updated: Some(last_updated),
                source: origin.source,
            },
        );
        Ok(outcome)
    }
}

fn failed(target: &DocumentTarget, err: &Error) -> DocumentOutcome {
    DocumentOutcome::Failed {
        id: target.filename.clone(),
        reason: err.to_string(),
    }
}

fn summarize(
    outcomes: &[DocumentOutcome],
    pages: &PageList,
    discovered: &DiscoveredSource,
    next: &Manifest,
    duration: Duration,
) -> RunSummary {
    let failed_pages: Vec<String> = outcomes
        .iter()
        .filter(|o| !o.is_success())
        .map(|o| o.id().to_string())
        .collect();

    RunSummary {
        last_fetch_completed: Some(Utc::now()),
        fetch_duration_seconds: duration.as_secs_f64(),
        total_pages_discovered: pages.len(),
        pages_fetched_successfully: outcomes.len() - failed_pages.len(),
        pages_failed: failed_pages.len(),
        failed_pages,
        sitemap_url: discovered.sitemap_url.clone(),
        base_url: discovered.base_url.clone(),
        total_files: next.files.len(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::fetcher::{CHANGELOG_FILENAME, HttpClient};
    use crate::retry::{RecordingPause, RetryPolicy};
    use chrono::{DateTime, TimeZone};
    use std::sync::Arc;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const OVERVIEW: &str = "# Overview\n\nClaude Code is an agentic coding tool.\n\n- Fast\n- Local\n";
    const HOOKS: &str = "# Hooks\n\nHooks run commands at lifecycle events.\n\n## Events\n\n- PreToolUse\n";
    const CHANGELOG: &str = "## 1.0.1\n\n- Fixed resuming sessions after a crash\n- Faster startup in large repositories\n\n## 1.0.0\n\n- Initial release with the core agent loop\n";

    struct Fixture {
        server: MockServer,
        _dir: TempDir,
        config: MirrorConfig,
    }

    impl Fixture {
        async fn new() -> Self {
            let server = MockServer::start().await;
            let dir = TempDir::new().unwrap();
            let mut config = MirrorConfig::default();
            config.source.sitemap_urls = vec![format!("{}/sitemap.xml", server.uri())];
            config.source.changelog_url = format!("{}/CHANGELOG.md", server.uri());
            config.output.dir = dir.path().join("docs");
            Self {
                server,
                _dir: dir,
                config,
            }
        }

        async fn serve(&self, route: &str, status: u16, body: &str) {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(status).set_body_string(body))
                .mount(&self.server)
                .await;
        }

        async fn serve_corpus(&self, overview: &str) {
            let uri = self.server.uri();
            let sitemap = format!(
                r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
                  <url><loc>{uri}/en/docs/claude-code/overview</loc></url>
                  <url><loc>{uri}/en/docs/claude-code/hooks/</loc></url>
                  <url><loc>{uri}/en/docs/claude-code/api/messages</loc></url>
                </urlset>"#
            );
            self.serve("/sitemap.xml", 200, &sitemap).await;
            self.serve("/en/docs/claude-code/overview.md", 200, overview).await;
            self.serve("/en/docs/claude-code/hooks.md", 200, HOOKS).await;
            self.serve("/CHANGELOG.md", 200, CHANGELOG).await;
        }

        fn engine(&self) -> (ReconciliationEngine, RecordingPause) {
            self.engine_with_store(Box::new(DirectoryStore::new(&self.config.output.dir)))
        }

        fn engine_with_store(
            &self,
            store: Box<dyn DocumentStore>,
        ) -> (ReconciliationEngine, RecordingPause) {
            let pause = RecordingPause::new();
            let policy = RetryPolicy {
                max_attempts: 2,
                ..RetryPolicy::default()
            };
            let fetcher = RetryingFetcher::with_parts(
                HttpClient::new(&self.config.fetch).unwrap(),
                policy,
                Arc::new(pause.clone()),
            );
            let engine = ReconciliationEngine::with_parts(
                &self.config,
                fetcher,
                store,
                ManifestStore::new(self.config.manifest_path()),
            );
            (engine, pause)
        }

        fn manifests(&self) -> ManifestStore {
            ManifestStore::new(self.config.manifest_path())
        }

        fn stored(&self, name: &str) -> Option<String> {
            DirectoryStore::new(&self.config.output.dir)
                .read_document(name)
                .unwrap()
        }
    }

    /// Directory store that refuses to write one document.
    struct RefusingStore {
        inner: DirectoryStore,
        refused: &'static str,
    }

    impl DocumentStore for RefusingStore {
        fn write_document(&self, name: &str, content: &str) -> Result<()> {
            if name == self.refused {
                return Err(Error::Storage(format!("no space left for {name}")));
            }
            self.inner.write_document(name, content)
        }

        fn read_document(&self, name: &str) -> Result<Option<String>> {
            self.inner.read_document(name)
        }

        fn has_document(&self, name: &str) -> bool {
            self.inner.has_document(name)
        }

        fn list_documents(&self) -> Result<Vec<String>> {
            self.inner.list_documents()
        }
    }

    fn long_ago() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_writes_everything() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let (engine, pause) = fx.engine();

        let report = engine.run().await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.page_origin, PageOrigin::Sitemap);
        assert_eq!(report.summary.total_pages_discovered, 2);
        assert_eq!(report.summary.pages_fetched_successfully, 3);
        assert_eq!(report.summary.pages_failed, 0);
        assert_eq!(report.updated(), 3);
        assert_eq!(report.outcomes.last().unwrap().id(), CHANGELOG_FILENAME);

        assert_eq!(fx.stored("overview.md").as_deref(), Some(OVERVIEW));
        assert_eq!(fx.stored("hooks.md").as_deref(), Some(HOOKS));
        assert!(fx.stored("changelog.md").unwrap().ends_with(CHANGELOG));

        // One politeness delay between the two pages, none after the last
        assert_eq!(pause.waits(), vec![Duration::from_millis(500)]);

        let manifest = fx.manifests().try_load().unwrap().unwrap();
        assert_eq!(manifest.files.len(), 3);
        assert_eq!(manifest.skill, "claude-code-knowledge");
        let overview = &manifest.files["overview.md"];
        assert_eq!(overview.hash, content_hash(OVERVIEW));
        assert_eq!(
            overview.original_md_url,
            format!("{}/en/docs/claude-code/overview.md", fx.server.uri())
        );
        let changelog = &manifest.files["changelog.md"];
        assert_eq!(changelog.source.as_deref(), Some(CHANGELOG_SOURCE));
        assert_eq!(changelog.original_md_url, fx.config.source.changelog_url);
        assert_eq!(
            manifest.fetch_metadata.as_ref().unwrap().base_url,
            fx.server.uri()
        );
    }

    #[tokio::test]
    async fn test_unchanged_content_keeps_timestamp() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let (engine, _) = fx.engine();
        engine.run().await.unwrap();

        // Backdate the stored entry so a rewrite would be visible
        let store = fx.manifests();
        let mut manifest = store.load();
        manifest.files.get_mut("overview.md").unwrap().last_updated = Some(long_ago());
        store.save(&mut manifest, Utc::now()).unwrap();

        let report = engine.run().await.unwrap();
        assert_eq!(report.unchanged(), 3);

        let after = store.load();
        let overview = &after.files["overview.md"];
        assert_eq!(overview.last_updated, Some(long_ago()));
        assert_eq!(overview.hash, content_hash(OVERVIEW));
    }

    #[tokio::test]
    async fn test_changed_content_advances_timestamp() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let (engine, _) = fx.engine();
        engine.run().await.unwrap();

        let store = fx.manifests();
        let mut manifest = store.load();
        manifest.files.get_mut("overview.md").unwrap().last_updated = Some(long_ago());
        store.save(&mut manifest, Utc::now()).unwrap();

        let revised = format!("{OVERVIEW}\n## New section\n\n- Added\n");
        fx.server.reset().await;
        fx.serve_corpus(&revised).await;

        let started = Utc::now();
        let report = engine.run().await.unwrap();
        assert!(report.outcomes.contains(&DocumentOutcome::Updated {
            id: "overview.md".into()
        }));

        let overview = &store.load().files["overview.md"];
        assert_eq!(overview.hash, content_hash(&revised));
        assert!(overview.last_updated.unwrap() >= started);
        assert_eq!(fx.stored("overview.md").as_deref(), Some(revised.as_str()));
    }

    #[tokio::test]
    async fn test_missing_file_is_restored_without_new_timestamp() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let (engine, _) = fx.engine();
        engine.run().await.unwrap();
        let before = fx.manifests().load().files["hooks.md"].last_updated;

        std::fs::remove_file(fx.config.output.dir.join("hooks.md")).unwrap();
        let report = engine.run().await.unwrap();

        assert!(report.outcomes.contains(&DocumentOutcome::Unchanged {
            id: "hooks.md".into()
        }));
        assert_eq!(fx.stored("hooks.md").as_deref(), Some(HOOKS));
        assert_eq!(fx.manifests().load().files["hooks.md"].last_updated, before);
    }

    #[tokio::test]
    async fn test_changelog_alone_makes_run_successful() {
        let fx = Fixture::new().await;
        let uri = fx.server.uri();
        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{uri}/en/docs/claude-code/overview</loc></url>
              <url><loc>{uri}/en/docs/claude-code/hooks</loc></url>
            </urlset>"#
        );
        fx.serve("/sitemap.xml", 200, &sitemap).await;
        fx.serve("/en/docs/claude-code/overview.md", 500, "").await;
        fx.serve("/en/docs/claude-code/hooks.md", 200, "<!DOCTYPE html><html></html>")
            .await;
        fx.serve("/CHANGELOG.md", 200, CHANGELOG).await;
        let (engine, pause) = fx.engine();

        let report = engine.run().await.unwrap();

        assert!(report.is_success());
        assert_eq!(report.summary.pages_fetched_successfully, 1);
        assert_eq!(report.summary.pages_failed, 2);
        assert_eq!(
            report.summary.failed_pages,
            vec!["hooks.md".to_string(), "overview.md".to_string()]
        );
        // One backoff for the 500; no politeness delay after failures
        assert_eq!(pause.waits().len(), 1);
        assert_eq!(fx.manifests().load().files.len(), 1);
    }

    #[tokio::test]
    async fn test_zero_successes_is_reported() {
        let fx = Fixture::new().await;
        let uri = fx.server.uri();
        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{uri}/en/docs/claude-code/overview</loc></url>
            </urlset>"#
        );
        fx.serve("/sitemap.xml", 200, &sitemap).await;
        fx.serve("/en/docs/claude-code/overview.md", 404, "").await;
        fx.serve("/CHANGELOG.md", 404, "").await;
        let (engine, _) = fx.engine();

        let report = engine.run().await.unwrap();

        assert!(!report.is_success());
        assert_eq!(
            report.summary.failed_pages,
            vec!["overview.md".to_string(), CHANGELOG_FAILURE_ID.to_string()]
        );
    }

    #[tokio::test]
    async fn test_documents_no_longer_listed_are_dropped() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let store = fx.manifests();
        let mut stale = Manifest::default();
        stale.files.insert(
            "removed-page.md".into(),
            ManifestEntry {
                hash: "old".into(),
                ..ManifestEntry::default()
            },
        );
        store.save(&mut stale, long_ago()).unwrap();

        let (engine, _) = fx.engine();
        engine.run().await.unwrap();

        let manifest = store.load();
        assert!(!manifest.files.contains_key("removed-page.md"));
        assert_eq!(manifest.files.len(), 3);
    }

    #[tokio::test]
    async fn test_discovery_failure_is_fatal() {
        let fx = Fixture::new().await;
        fx.serve("/sitemap.xml", 404, "").await;
        let (engine, _) = fx.engine();

        let err = engine.run().await.unwrap_err();
        assert!(matches!(err, Error::Discovery(_)));
        assert!(!fx.config.manifest_path().exists());
    }

    #[tokio::test]
    async fn test_empty_fallback_is_no_documents() {
        let mut fx = Fixture::new().await;
        fx.config.source.fallback_pages.clear();
        let uri = fx.server.uri();
        let sitemap = format!(
            r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
              <url><loc>{uri}/elsewhere</loc></url>
            </urlset>"#
        );
        fx.serve("/sitemap.xml", 200, &sitemap).await;
        let (engine, _) = fx.engine();

        assert!(matches!(engine.run().await, Err(Error::NoDocuments)));
    }

    #[tokio::test]
    async fn test_write_failure_fails_only_that_document() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        let (engine, pause) = fx.engine_with_store(Box::new(RefusingStore {
            inner: DirectoryStore::new(&fx.config.output.dir),
            refused: "hooks.md",
        }));

        let report = engine.run().await.unwrap();

        assert!(report.is_success());
        assert!(matches!(
            &report.outcomes[0],
            DocumentOutcome::Failed { id, reason } if id == "hooks.md" && reason.contains("no space left")
        ));
        assert_eq!(
            report.outcomes[1],
            DocumentOutcome::Updated {
                id: "overview.md".to_string()
            }
        );
        assert_eq!(
            report.outcomes[2],
            DocumentOutcome::Updated {
                id: CHANGELOG_FILENAME.to_string()
            }
        );
        assert_eq!(report.summary.pages_fetched_successfully, 2);
        assert_eq!(report.summary.pages_failed, 1);
        assert_eq!(report.summary.failed_pages, vec!["hooks.md".to_string()]);
        // The failed page gets no politeness delay and overview is last
        assert!(pause.waits().is_empty());

        let manifest = fx.manifests().try_load().unwrap().unwrap();
        assert!(!manifest.files.contains_key("hooks.md"));
        assert_eq!(manifest.files.len(), 2);
        assert_eq!(fx.stored("overview.md").as_deref(), Some(OVERVIEW));
        assert_eq!(fx.stored("hooks.md"), None);
    }

    #[tokio::test]
    async fn test_manifest_save_failure_is_fatal() {
        let fx = Fixture::new().await;
        fx.serve_corpus(OVERVIEW).await;
        // A non-empty directory where the manifest file belongs
        let blocker = fx.config.manifest_path();
        std::fs::create_dir_all(blocker.join("occupied")).unwrap();
        let (engine, _) = fx.engine();

        let err = engine.run().await.unwrap_err();

        assert!(matches!(err, Error::ManifestSave(_)));
        assert!(blocker.is_dir());
        // Documents were still written before the save failed
        assert_eq!(fx.stored("overview.md").as_deref(), Some(OVERVIEW));
    }
}
