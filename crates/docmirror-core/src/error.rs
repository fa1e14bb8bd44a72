//! Error types and handling for docmirror-core operations.
//!
//! A single [`Error`] enum covers every failure in the mirroring pipeline.
//! Variants are grouped by how the reconciliation engine treats them:
//!
//! - **Fatal for the run**: [`Error::Discovery`], [`Error::ManifestSave`],
//!   [`Error::NoDocuments`]. No base address, no targets, or state that would
//!   be silently lost.
//! - **Recovered by the engine**: [`Error::Enumeration`] (falls back to the
//!   static page list), [`Error::ManifestLoad`] (treated as empty prior
//!   state), [`Error::Fetch`] and [`Error::Validation`] (recorded as a failed
//!   document, the run continues).
//! - **Infrastructure**: I/O, network, parsing and configuration errors that
//!   the variants above wrap or that surface from setup code.
//!
//! ```rust
//! use docmirror_core::{Error, ValidationError};
//!
//! let err = Error::Validation(ValidationError::Empty);
//! assert_eq!(err.category(), "validation");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// Reasons a fetched body is rejected as documentation content.
///
/// Validation failures describe the payload, not the transport, so they are
/// never retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body was empty.
    #[error("received an empty body")]
    Empty,

    /// The server answered with an HTML page instead of plain text.
    #[error("received HTML instead of markdown")]
    Html,

    /// The trimmed body is shorter than the minimum accepted length.
    #[error("content too short ({length} characters)")]
    TooShort {
        /// Trimmed length in characters.
        length: usize,
    },

    /// Too few lines carry structural markdown markers.
    #[error("content does not look like markdown ({markers} structured lines found)")]
    Unstructured {
        /// Number of lines that carried at least one marker.
        markers: usize,
    },
}

/// The main error type for docmirror-core operations.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Wraps the underlying `reqwest::Error` so timeouts and connection
    /// failures can be told apart from HTTP status errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Parsing operation failed (sitemap XML, timestamps).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Output storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// A requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration is invalid or unreadable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// URL is malformed or has no usable origin.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// No sitemap candidate produced a usable base address.
    ///
    /// Fatal: without a base address no document URL can be built.
    #[error("Discovery failed: {0}")]
    Discovery(String),

    /// The sitemap could not be turned into a page list.
    ///
    /// Recovered by falling back to the static page list.
    #[error("Enumeration failed: {0}")]
    Enumeration(String),

    /// A document could not be fetched after exhausting its attempts.
    #[error("Failed to fetch {target} after {attempts} attempt(s): {reason}")]
    Fetch {
        /// Identifier or URL of the document.
        target: String,
        /// Attempts made before giving up.
        attempts: u32,
        /// Description of the last underlying failure.
        reason: String,
    },

    /// A fetched body was rejected by the content validator.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The previous manifest could not be read or parsed.
    #[error("Failed to load manifest: {0}")]
    ManifestLoad(String),

    /// The new manifest could not be written.
    #[error("Failed to save manifest: {0}")]
    ManifestSave(String),

    /// Discovery and fallback together produced no document targets.
    #[error("No documentation pages discovered")]
    NoDocuments,
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl Error {
    /// Check if the error might go away if the operation is retried.
    ///
    /// Timeouts, connection failures and interrupted I/O are transient.
    /// Validation failures are deterministic and report `false`, which is why
    /// the fetcher never retries them.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a string identifier for logs.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
            Self::Config(_) => "config",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
            Self::Discovery(_) => "discovery",
            Self::Enumeration(_) => "enumeration",
            Self::Fetch { .. } => "fetch",
            Self::Validation(_) => "validation",
            Self::ManifestLoad(_) => "manifest_load",
            Self::ManifestSave(_) => "manifest_save",
            Self::NoDocuments => "no_documents",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
