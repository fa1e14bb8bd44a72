//! Turning a sitemap into the list of documentation pages to mirror.

use crate::config::SourceConfig;
use crate::discovery::sitemap::parse_locations;
use crate::fetcher::HttpClient;
use crate::target::DocumentTarget;
use crate::{Error, Result};
use std::collections::BTreeSet;
use tracing::{error, info, instrument, warn};
use url::Url;

/// Where the page list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOrigin {
    /// Parsed from the sitemap.
    Sitemap,
    /// The configured static list.
    Fallback,
}

/// Enumerated pages ready for fetching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageList {
    /// Normalised page paths, sorted and unique.
    pub paths: Vec<String>,
    /// How the list was obtained.
    pub origin: PageOrigin,
}

impl PageList {
    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the list has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Fetch targets for every page, in list order.
    #[must_use]
    pub fn targets(&self) -> Vec<DocumentTarget> {
        self.paths
            .iter()
            .map(|path| DocumentTarget::from_path(path))
            .collect()
    }
}

/// Fetch the sitemap and enumerate its documentation pages.
///
/// Never fails: fetch or parse errors and empty results fall back to the
/// configured static list.
#[instrument(skip(http, source))]
pub async fn enumerate_pages(http: &HttpClient, sitemap_url: &str, source: &SourceConfig) -> PageList {
    info!("Discovering documentation pages from sitemap...");

    match fetch_and_select(http, sitemap_url, source).await {
        Ok(paths) if !paths.is_empty() => {
            info!("Discovered {} documentation pages", paths.len());
            PageList {
                paths,
                origin: PageOrigin::Sitemap,
            }
        },
        Ok(_) => {
            warn!("No pages found in sitemap, using fallback list...");
            fallback(source)
        },
        Err(e) => {
            error!("Failed to discover pages from sitemap: {}", e);
            warn!("Using fallback page list...");
            fallback(source)
        },
    }
}

async fn fetch_and_select(
    http: &HttpClient,
    sitemap_url: &str,
    source: &SourceConfig,
) -> Result<Vec<String>> {
    let response = http
        .get(sitemap_url)
        .await
        .map_err(|e| Error::Enumeration(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Enumeration(format!(
            "sitemap {sitemap_url} answered HTTP {status}"
        )));
    }

    let xml = response
        .text()
        .await
        .map_err(|e| Error::Enumeration(e.to_string()))?;
    extract_pages(&xml, source)
}

/// Parse `xml` and select the documentation pages it lists.
///
/// # Errors
///
/// Returns [`Error::Enumeration`] when the sitemap cannot be parsed.
pub fn extract_pages(xml: &str, source: &SourceConfig) -> Result<Vec<String>> {
    let locations = parse_locations(xml).map_err(|e| Error::Enumeration(e.to_string()))?;
    info!("Found {} total URLs in sitemap", locations.len());
    Ok(select_pages(&locations, source))
}

/// Filter, normalise, exclude, deduplicate and sort page locations.
///
/// Only locations containing the section pattern are considered. Each path
/// loses a trailing `.html` or `/`, and paths containing any excluded pattern
/// are dropped.
#[must_use]
pub fn select_pages(locations: &[String], source: &SourceConfig) -> Vec<String> {
    let pages: BTreeSet<String> = locations
        .iter()
        .filter(|location| location.contains(&source.section_pattern))
        .filter_map(|location| location_path(location))
        .map(|path| normalize_path(&path).to_string())
        .filter(|path| {
            !source
                .excluded_patterns
                .iter()
                .any(|pattern| path.contains(pattern.as_str()))
        })
        .collect();

    pages.into_iter().collect()
}

/// Strip one trailing `.html` suffix, or failing that one trailing slash.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    path.strip_suffix(".html")
        .or_else(|| path.strip_suffix('/'))
        .unwrap_or(path)
}

fn location_path(location: &str) -> Option<String> {
    match Url::parse(location) {
        Ok(url) => Some(url.path().to_string()),
        // Relative locations are already paths.
        Err(url::ParseError::RelativeUrlWithoutBase) => Some(location.to_string()),
        Err(_) => None,
    }
}

fn fallback(source: &SourceConfig) -> PageList {
    let paths: BTreeSet<String> = source.fallback_pages.iter().cloned().collect();
    PageList {
        paths: paths.into_iter().collect(),
        origin: PageOrigin::Fallback,
    }
}
