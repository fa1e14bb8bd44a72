//! Document targets and the path → identifier mapping.

use serde::{Deserialize, Serialize};

/// Section prefixes stripped from a page path before it becomes a filename.
const SECTION_PREFIXES: &[&str] = &["/en/docs/claude-code/", "/docs/claude-code/", "/claude-code/"];

/// Looser marker used when none of the prefixes match.
const SECTION_MARKER: &str = "claude-code/";

/// Suffix forced onto every identifier.
pub const DOCUMENT_SUFFIX: &str = ".md";

/// A page to fetch during the current run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTarget {
    /// Normalised page path, e.g. `/en/docs/claude-code/overview`.
    pub path: String,
    /// Stable identifier and output filename, e.g. `overview.md`.
    pub filename: String,
}

impl DocumentTarget {
    /// Build a target from a normalised page path.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        Self {
            path: path.to_string(),
            filename: safe_filename(path),
        }
    }

    /// Human-facing page URL under `base_url`.
    #[must_use]
    pub fn page_url(&self, base_url: &str) -> String {
        format!("{}{}", base_url.trim_end_matches('/'), self.path)
    }

    /// Raw markdown URL under `base_url`.
    #[must_use]
    pub fn markdown_url(&self, base_url: &str) -> String {
        format!("{}{DOCUMENT_SUFFIX}", self.page_url(base_url))
    }
}

/// Derive the identifier for a page path.
///
/// The documentation section prefix is dropped, remaining slashes become
/// `__`, and the result always ends in `.md`.
///
/// ```rust
/// use docmirror_core::target::safe_filename;
///
/// assert_eq!(safe_filename("/en/docs/claude-code/overview"), "overview.md");
/// assert_eq!(safe_filename("/en/docs/claude-code/sdk/migration-guide"), "sdk__migration-guide.md");
/// ```
#[must_use]
pub fn safe_filename(path: &str) -> String {
    let relative = SECTION_PREFIXES
        .iter()
        .find_map(|prefix| path.rsplit_once(prefix).map(|(_, rest)| rest))
        .or_else(|| path.rsplit_once(SECTION_MARKER).map(|(_, rest)| rest))
        .unwrap_or(path);

    let mut name = relative.replace('/', "__");
    if !name.ends_with(DOCUMENT_SUFFIX) {
        name.push_str(DOCUMENT_SUFFIX);
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strips_section_prefixes() {
        assert_eq!(safe_filename("/en/docs/claude-code/hooks"), "hooks.md");
        assert_eq!(safe_filename("/docs/claude-code/hooks"), "hooks.md");
        assert_eq!(safe_filename("/claude-code/hooks"), "hooks.md");
        assert_eq!(safe_filename("/de/claude-code/hooks"), "hooks.md");
    }

    #[test]
    fn test_nested_paths_use_double_underscore() {
        assert_eq!(
            safe_filename("/en/docs/claude-code/sdk/migration-guide"),
            "sdk__migration-guide.md"
        );
    }

    #[test]
    fn test_unrelated_paths_keep_full_path() {
        assert_eq!(safe_filename("/guides/intro"), "__guides__intro.md");
        assert_eq!(safe_filename("intro"), "intro.md");
    }

    #[test]
    fn test_existing_suffix_not_doubled() {
        assert_eq!(safe_filename("/en/docs/claude-code/notes.md"), "notes.md");
    }

    #[test]
    fn test_urls_under_base() {
        let target = DocumentTarget::from_path("/en/docs/claude-code/overview");
        assert_eq!(target.filename, "overview.md");
        assert_eq!(
            target.page_url("https://docs.example.com/"),
            "https://docs.example.com/en/docs/claude-code/overview"
        );
        assert_eq!(
            target.markdown_url("https://docs.example.com"),
            "https://docs.example.com/en/docs/claude-code/overview.md"
        );
    }

    proptest! {
        #[test]
        fn prop_filenames_are_flat_markdown(segments in proptest::collection::vec("[a-z0-9-]{1,12}", 1..5)) {
            let path = format!("/en/docs/claude-code/{}", segments.join("/"));
            let name = safe_filename(&path);
            prop_assert!(!name.contains('/'));
            prop_assert!(name.ends_with(".md"));
            prop_assert_eq!(name, format!("{}.md", segments.join("__")));
        }
    }
}
