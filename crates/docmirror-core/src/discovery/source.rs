//! Locating the sitemap and the documentation host.

use crate::discovery::sitemap::first_location;
use crate::fetcher::HttpClient;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use url::Url;

/// The sitemap that answered and the base address its pages live under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredSource {
    /// Candidate URL that produced a usable sitemap.
    pub sitemap_url: String,
    /// Scheme and host of the first listed page, e.g. `https://docs.example.com`.
    pub base_url: String,
}

/// Try each candidate in order and return the first usable one.
///
/// A candidate is usable when it answers with a success status, parses as a
/// sitemap, and lists at least one location with a scheme and host.
///
/// # Errors
///
/// Returns [`Error::Discovery`] when no candidate is usable.
#[instrument(skip(http))]
pub async fn discover_source(http: &HttpClient, candidates: &[String]) -> Result<DiscoveredSource> {
    for sitemap_url in candidates {
        info!("Trying sitemap: {}", sitemap_url);
        match probe_candidate(http, sitemap_url).await {
            Ok(Some(base_url)) => {
                info!("Found sitemap at {}, base URL: {}", sitemap_url, base_url);
                return Ok(DiscoveredSource {
                    sitemap_url: sitemap_url.clone(),
                    base_url,
                });
            },
            Ok(None) => warn!("Sitemap {} lists no usable locations", sitemap_url),
            Err(e) => warn!("Failed to fetch {}: {}", sitemap_url, e),
        }
    }

    Err(Error::Discovery(format!(
        "could not find a valid sitemap among {} candidate(s)",
        candidates.len()
    )))
}

async fn probe_candidate(http: &HttpClient, sitemap_url: &str) -> Result<Option<String>> {
    let response = http.get(sitemap_url).await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Discovery(format!("HTTP {status}")));
    }

    let xml = response.text().await?;
    match first_location(&xml)? {
        Some(location) => base_url_of(&location).map(Some),
        None => Ok(None),
    }
}

/// Scheme and host (with any explicit port) of `location`.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] for unparsable URLs and for URLs without
/// a host, such as `mailto:` links.
pub fn base_url_of(location: &str) -> Result<String> {
    let url = Url::parse(location)?;
    if url.host_str().is_none() {
        return Err(Error::InvalidUrl(format!("{location} has no host")));
    }
    Ok(url.origin().ascii_serialization())
}
