//! HTTP access and the retrying document fetcher.

use crate::config::{FetchConfig, SourceConfig};
use crate::retry::{Attempt, Pause, RetryPolicy, TokioPause};
use crate::target::DocumentTarget;
use crate::validate::validate_markdown;
use crate::{Error, Result, ValidationError};
use reqwest::header::{
    CACHE_CONTROL, EXPIRES, HeaderMap, HeaderValue, PRAGMA, RETRY_AFTER, USER_AGENT,
};
use reqwest::redirect::Policy;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Minimum trimmed length of the changelog body as served.
pub const MIN_CHANGELOG_CHARS: usize = 100;

/// Identifier the changelog is stored and recorded under.
pub const CHANGELOG_FILENAME: &str = "changelog.md";

/// HTTP client carrying the identifying and cache-busting headers sent on every request.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a client from fetch settings.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(Policy::limited(config.max_redirects))
            .default_headers(default_headers(&config.user_agent)?)
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(Error::Network)?;
        Ok(Self { client })
    }

    /// Issue a GET and hand back the response for status inspection.
    pub async fn get(&self, url: &str) -> Result<Response> {
        Ok(self.client.get(url).send().await?)
    }

    /// Single attempt at fetching `url`, classified for the retry loop.
    pub async fn attempt(&self, url: &str, policy: &RetryPolicy) -> Attempt {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(err) if err.is_builder() => return Attempt::Fatal(Error::Network(err)),
            Err(err) => return Attempt::Retryable(Error::Network(err)),
        };

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            let header = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok());
            return Attempt::RateLimited {
                wait: policy.retry_after(header),
            };
        }

        if !status.is_success() {
            return match response.error_for_status() {
                Ok(_) => Attempt::Retryable(Error::Fetch {
                    target: url.to_string(),
                    attempts: 1,
                    reason: format!("HTTP {status}"),
                }),
                Err(err) => Attempt::Retryable(Error::Network(err)),
            };
        }

        match response.text().await {
            Ok(body) => Attempt::Success(body),
            Err(err) => Attempt::Retryable(Error::Network(err)),
        }
    }
}

fn default_headers(user_agent: &str) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|e| Error::Config(format!("Invalid user agent '{user_agent}': {e}")))?,
    );
    headers.insert(
        CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
    Ok(headers)
}

/// A validated document ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    /// Identifier and output filename.
    pub filename: String,
    /// Validated body.
    pub content: String,
}

/// Fetcher with bounded retries, jittered backoff and `429` awareness.
pub struct RetryingFetcher {
    http: HttpClient,
    policy: RetryPolicy,
    pause: Arc<dyn Pause>,
}

impl RetryingFetcher {
    /// Creates a fetcher that sleeps on the tokio timer.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self::with_parts(
            HttpClient::new(config)?,
            RetryPolicy::from(config),
            Arc::new(TokioPause),
        ))
    }

    /// Assemble a fetcher from explicit parts.
    #[must_use]
    pub fn with_parts(http: HttpClient, policy: RetryPolicy, pause: Arc<dyn Pause>) -> Self {
        Self {
            http,
            policy,
            pause,
        }
    }

    /// Underlying HTTP client, shared with discovery.
    #[must_use]
    pub const fn http(&self) -> &HttpClient {
        &self.http
    }

    /// The pause used for every wait.
    #[must_use]
    pub fn pause(&self) -> Arc<dyn Pause> {
        Arc::clone(&self.pause)
    }

    /// Fetch `url`, retrying transient failures and honouring rate limits.
    ///
    /// A `429` consumes an attempt. The wait before the next attempt is the
    /// `Retry-After` value for rate limits and the jittered backoff for
    /// everything else; no wait follows the final attempt.
    #[instrument(skip(self), fields(max_attempts = self.policy.max_attempts))]
    pub async fn fetch_text(&self, url: &str, label: &str) -> Result<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut last_failure = String::from("no attempt made");

        for attempt in 0..max_attempts {
            let is_last = attempt + 1 == max_attempts;
            match self.http.attempt(url, &self.policy).await {
                Attempt::Success(body) => return Ok(body),
                Attempt::Fatal(err) => {
                    return Err(Error::Fetch {
                        target: label.to_string(),
                        attempts: attempt + 1,
                        reason: err.to_string(),
                    });
                },
                Attempt::RateLimited { wait } => {
                    last_failure = format!("rate limited (retry after {}s)", wait.as_secs());
                    if !is_last {
                        warn!("Rate limited. Waiting {} seconds...", wait.as_secs());
                        self.pause.pause(wait).await;
                    }
                },
                Attempt::Retryable(err) => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt + 1,
                        max_attempts,
                        label,
                        err
                    );
                    last_failure = err.to_string();
                    if !is_last {
                        let delay = self.policy.backoff_delay(attempt);
                        info!("Retrying in {:.1} seconds...", delay.as_secs_f64());
                        self.pause.pause(delay).await;
                    }
                },
            }
        }

        Err(Error::Fetch {
            target: label.to_string(),
            attempts: max_attempts,
            reason: last_failure,
        })
    }

    /// Fetch and validate the markdown rendition of a documentation page.
    pub async fn fetch_document(
        &self,
        target: &DocumentTarget,
        base_url: &str,
    ) -> Result<FetchedDocument> {
        let url = target.markdown_url(base_url);
        info!("Fetching: {} -> {}", url, target.filename);

        let content = self.fetch_text(&url, &target.filename).await?;
        if let Err(err) = validate_markdown(&content) {
            warn!("Content validation failed for {}: {}", target.filename, err);
            return Err(err.into());
        }

        info!(
            "Successfully fetched and validated {} ({} bytes)",
            target.filename,
            content.len()
        );
        Ok(FetchedDocument {
            filename: target.filename.clone(),
            content,
        })
    }

    /// Fetch the changelog and prefix it with an attribution header.
    pub async fn fetch_changelog(&self, source: &SourceConfig) -> Result<FetchedDocument> {
        info!("Fetching changelog: {}", source.changelog_url);

        let body = self
            .fetch_text(&source.changelog_url, CHANGELOG_FILENAME)
            .await?;

        let length = body.trim().chars().count();
        if length < MIN_CHANGELOG_CHARS {
            warn!("Changelog content too short ({} characters)", length);
            return Err(ValidationError::TooShort { length }.into());
        }

        let content = format!("{}{body}", changelog_header(&source.changelog_page_url));

        debug!("Fetched changelog ({} bytes)", content.len());
        Ok(FetchedDocument {
            filename: CHANGELOG_FILENAME.to_string(),
            content,
        })
    }
}

fn changelog_header(page_url: &str) -> String {
    format!(
        "# Claude Code Changelog\n\n\
         > **Source**: {page_url}\n\
         >\n\
         > This is the official Claude Code release changelog from the Claude Code repository.\n\n\
         ---\n\n"
    )
}
