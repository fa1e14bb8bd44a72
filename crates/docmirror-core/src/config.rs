//! Configuration for a mirroring run.
//!
//! Configuration is stored as TOML and layered in this order:
//!
//! 1. Built-in defaults (the Claude Code documentation corpus)
//! 2. A config file (`--config`, `DOCMIRROR_CONFIG`, or `<config dir>/config.toml`)
//! 3. Environment overrides (`DOCMIRROR_OUTPUT_DIR`)
//! 4. Command-line flags, applied by the binary
//!
//! Every field has a default, so a file only needs the keys it changes:
//!
//! ```toml
//! [source]
//! excluded_patterns = ["/api/", "/legacy/"]
//!
//! [fetch]
//! request_delay_ms = 1000
//!
//! [output]
//! dir = "/srv/mirror/docs"
//! ```
//!
//! ```rust
//! use docmirror_core::MirrorConfig;
//!
//! let config = MirrorConfig::from_toml_str("[fetch]\nmax_attempts = 5\n")?;
//! assert_eq!(config.fetch.max_attempts, 5);
//! assert_eq!(config.fetch.timeout_secs, 30);
//! # Ok::<(), docmirror_core::Error>(())
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "DOCMIRROR_CONFIG";

/// Environment variable overriding the output directory.
pub const OUTPUT_DIR_ENV: &str = "DOCMIRROR_OUTPUT_DIR";

/// Complete configuration for a mirroring run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MirrorConfig {
    /// Where documents come from.
    pub source: SourceConfig,
    /// Network behaviour.
    pub fetch: FetchConfig,
    /// Where documents go.
    pub output: OutputConfig,
    /// Staleness gate for `sync`.
    pub sync: SyncConfig,
}

/// Description of the remote corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    /// Candidate sitemap locations, tried in order.
    pub sitemap_urls: Vec<String>,
    /// Substring a sitemap URL must contain to be a documentation page.
    pub section_pattern: String,
    /// Path substrings that exclude a page.
    pub excluded_patterns: Vec<String>,
    /// Page paths used when the sitemap yields nothing.
    pub fallback_pages: Vec<String>,
    /// Raw location of the changelog.
    pub changelog_url: String,
    /// Human-facing location of the changelog.
    pub changelog_page_url: String,
    /// Value written to the manifest's `source` field.
    pub label: String,
    /// Value written to the manifest's `skill` field.
    pub skill: String,
}

/// HTTP and retry settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FetchConfig {
    /// `User-Agent` sent on every request.
    pub user_agent: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
    /// Attempts per request, including the first.
    pub max_attempts: u32,
    /// First backoff delay.
    pub base_delay_ms: u64,
    /// Backoff ceiling.
    pub max_delay_ms: u64,
    /// Wait for a `429` without `Retry-After`.
    pub default_retry_after_secs: u64,
    /// Politeness delay between successful document fetches.
    pub request_delay_ms: u64,
    /// Redirects followed per request.
    pub max_redirects: usize,
}

/// Output location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Directory receiving one file per document plus the manifest.
    pub dir: PathBuf,
    /// Manifest file name inside `dir`.
    pub manifest_file: String,
}

/// Settings for the staleness-gated `sync` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyncConfig {
    /// A mirror younger than this is considered fresh.
    pub max_age_hours: u32,
}

/// Curated list of known documentation pages, used when discovery degrades.
pub const FALLBACK_PAGES: &[&str] = &[
    "/en/docs/claude-code/overview",
    "/en/docs/claude-code/quickstart",
    "/en/docs/claude-code/setup",
    "/en/docs/claude-code/cli-reference",
    "/en/docs/claude-code/common-workflows",
    "/en/docs/claude-code/interactive-mode",
    "/en/docs/claude-code/settings",
    "/en/docs/claude-code/model-config",
    "/en/docs/claude-code/network-config",
    "/en/docs/claude-code/terminal-config",
    "/en/docs/claude-code/output-styles",
    "/en/docs/claude-code/statusline",
    "/en/docs/claude-code/hooks",
    "/en/docs/claude-code/hooks-guide",
    "/en/docs/claude-code/mcp",
    "/en/docs/claude-code/skills",
    "/en/docs/claude-code/slash-commands",
    "/en/docs/claude-code/plugins",
    "/en/docs/claude-code/plugins-reference",
    "/en/docs/claude-code/plugin-marketplaces",
    "/en/docs/claude-code/sub-agents",
    "/en/docs/claude-code/memory",
    "/en/docs/claude-code/checkpointing",
    "/en/docs/claude-code/analytics",
    "/en/docs/claude-code/monitoring-usage",
    "/en/docs/claude-code/costs",
    "/en/docs/claude-code/github-actions",
    "/en/docs/claude-code/gitlab-ci-cd",
    "/en/docs/claude-code/vs-code",
    "/en/docs/claude-code/jetbrains",
    "/en/docs/claude-code/devcontainer",
    "/en/docs/claude-code/claude-code-on-the-web",
    "/en/docs/claude-code/third-party-integrations",
    "/en/docs/claude-code/amazon-bedrock",
    "/en/docs/claude-code/google-vertex-ai",
    "/en/docs/claude-code/llm-gateway",
    "/en/docs/claude-code/iam",
    "/en/docs/claude-code/security",
    "/en/docs/claude-code/sandboxing",
    "/en/docs/claude-code/data-usage",
    "/en/docs/claude-code/legal-and-compliance",
    "/en/docs/claude-code/headless",
    "/en/docs/claude-code/troubleshooting",
    "/en/docs/claude-code/sdk/migration-guide",
];

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sitemap_urls: vec![
                "https://docs.anthropic.com/sitemap.xml".to_string(),
                "https://docs.claude.com/sitemap.xml".to_string(),
            ],
            section_pattern: "/en/docs/claude-code/".to_string(),
            excluded_patterns: ["/tool-use/", "/examples/", "/legacy/", "/api/", "/reference/"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            fallback_pages: FALLBACK_PAGES.iter().map(ToString::to_string).collect(),
            changelog_url:
                "https://raw.githubusercontent.com/anthropics/claude-code/main/CHANGELOG.md"
                    .to_string(),
            changelog_page_url: "https://github.com/anthropics/claude-code/blob/main/CHANGELOG.md"
                .to_string(),
            label: "https://docs.anthropic.com/en/docs/claude-code/".to_string(),
            skill: "claude-code-knowledge".to_string(),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Claude-Code-Knowledge-Skill/1.0".to_string(),
            timeout_secs: 30,
            max_attempts: 3,
            base_delay_ms: 2_000,
            max_delay_ms: 30_000,
            default_retry_after_secs: 60,
            request_delay_ms: 500,
            max_redirects: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        let dir = directories::ProjectDirs::from("dev", "outfitter", "docmirror").map_or_else(
            || PathBuf::from("docs"),
            |dirs| dirs.data_dir().join("docs"),
        );
        Self {
            dir,
            manifest_file: "docs_manifest.json".to_string(),
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { max_age_hours: 3 }
    }
}

impl MirrorConfig {
    /// Parse configuration from TOML text, filling gaps with defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from an explicit file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse config {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from an optional explicit file, the default
    /// config location and the environment.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };

        if let Ok(dir) = std::env::var(OUTPUT_DIR_ENV) {
            let trimmed = dir.trim();
            if !trimmed.is_empty() {
                tracing::debug!(dir = trimmed, "Output directory overridden from environment");
                config.output.dir = PathBuf::from(trimmed);
            }
        }

        Ok(config)
    }

    /// Location of the implicit config file, when the platform has one.
    #[must_use]
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "outfitter", "docmirror")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Full path of the manifest file.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.output.dir.join(&self.output.manifest_file)
    }

    /// Reject settings that would make a run meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.source.sitemap_urls.is_empty() {
            return Err(Error::Config(
                "source.sitemap_urls must list at least one candidate".into(),
            ));
        }
        if self.fetch.max_attempts == 0 {
            return Err(Error::Config("fetch.max_attempts must be at least 1".into()));
        }
        if self.fetch.base_delay_ms > self.fetch.max_delay_ms {
            return Err(Error::Config(format!(
                "fetch.base_delay_ms ({}) exceeds fetch.max_delay_ms ({})",
                self.fetch.base_delay_ms, self.fetch.max_delay_ms
            )));
        }
        if self.output.manifest_file.trim().is_empty() {
            return Err(Error::Config("output.manifest_file cannot be empty".into()));
        }
        Ok(())
    }
}
