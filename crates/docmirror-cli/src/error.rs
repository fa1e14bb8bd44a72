//! Exit codes for the `docmirror` binary.
//!
//! Scripts and hooks that call `docmirror` branch on the exit status, so
//! every failure is mapped onto a small fixed set of codes.
//!
//! | Code | Category | Description |
//! |------|----------|-------------|
//! | 0 | Success | Run completed, possibly with some failed documents |
//! | 1 | `Internal` | Anything not covered below |
//! | 2 | `Usage` | Bad flags or an invalid config file |
//! | 3 | `NotFound` | Nothing to mirror, or no mirror to list |
//! | 5 | `Network` | Discovery failed or no document could be fetched |
//! | 7 | `Integrity` | Local state could not be written or read |
//!
//! ```bash
//! docmirror fetch
//! case $? in
//!     0) echo "Mirror updated" ;;
//!     5) echo "Remote unavailable" ;;
//!     *) echo "Mirror left as it was" ;;
//! esac
//! ```

use docmirror_core::Error as CoreError;
use std::fmt;

/// Failure class, one per exit code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorCategory {
    /// Exit code 1.
    Internal = 1,

    /// Exit code 2: rejected flags or configuration.
    Usage = 2,

    /// Exit code 3.
    ///
    /// Used when enumeration yields no pages, or when listing topics of a
    /// directory that does not exist.
    NotFound = 3,

    /// Exit code 5.
    ///
    /// Used when no sitemap candidate answers, and when a run fetches
    /// nothing at all.
    Network = 5,

    /// Exit code 7.
    ///
    /// Used when the manifest cannot be saved.
    Integrity = 7,
}

impl ErrorCategory {
    /// Process exit status.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        self as u8
    }

    /// Label used in diagnostics.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Internal => "internal failure",
            Self::Usage => "invalid usage",
            Self::NotFound => "not found",
            Self::Network => "remote unavailable",
            Self::Integrity => "local state failure",
        }
    }

    /// Category for a library error.
    #[must_use]
    pub const fn from_core(err: &CoreError) -> Self {
        match err {
            CoreError::Config(_) => Self::Usage,
            CoreError::NotFound(_) | CoreError::NoDocuments => Self::NotFound,
            CoreError::Network(_)
            | CoreError::Discovery(_)
            | CoreError::Enumeration(_)
            | CoreError::Fetch { .. }
            | CoreError::Validation(_) => Self::Network,
            CoreError::ManifestSave(_) | CoreError::ManifestLoad(_) | CoreError::Storage(_) => {
                Self::Integrity
            },
            CoreError::Io(_)
            | CoreError::Parse(_)
            | CoreError::InvalidUrl(_)
            | CoreError::Serialization(_) => Self::Internal,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Error tagged with the exit code it should produce.
#[derive(Debug)]
pub struct CliError {
    /// Exit code class.
    pub category: ErrorCategory,
    /// What went wrong.
    pub source: anyhow::Error,
}

impl CliError {
    /// Tag `source` with `category`.
    pub fn new(category: ErrorCategory, source: impl Into<anyhow::Error>) -> Self {
        Self {
            category,
            source: source.into(),
        }
    }

    /// Tag as a usage failure.
    pub fn usage(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Usage, source)
    }

    /// Tag as a network failure.
    pub fn network(source: impl Into<anyhow::Error>) -> Self {
        Self::new(ErrorCategory::Network, source)
    }

    /// Process exit status.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        self.category.exit_code()
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        Self::new(ErrorCategory::from_core(&err), err)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(self.source.as_ref())
    }
}

/// Exit status for an error returned from [`crate::run`].
///
/// A `CliError` anywhere in the chain decides; otherwise a library error
/// is categorized; anything else is internal.
#[must_use]
pub fn exit_code_from_error(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(cli_err) = cause.downcast_ref::<CliError>() {
            return cli_err.exit_code();
        }
        if let Some(core_err) = cause.downcast_ref::<CoreError>() {
            return ErrorCategory::from_core(core_err).exit_code();
        }
    }
    ErrorCategory::Internal.exit_code()
}
