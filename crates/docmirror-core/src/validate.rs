//! Content-shape validation for fetched documentation.
//!
//! The documentation server answers `.md` requests with plain markdown. When
//! something upstream goes wrong it tends to answer with an HTML error page
//! or a truncated body and a `200` status, so every body is screened before
//! it is allowed to replace the local copy.
//!
//! The structural check is a heuristic, not a grammar: it asks that at least
//! [`MIN_STRUCTURED_LINES`] of the first [`SCAN_LINES`] lines carry one of
//! the [`MARKDOWN_MARKERS`].

use crate::ValidationError;

/// Minimum trimmed length, in characters, of an accepted document.
pub const MIN_CONTENT_CHARS: usize = 50;

/// Number of leading lines inspected for structural markers.
pub const SCAN_LINES: usize = 50;

/// Minimum number of inspected lines that must carry a marker.
pub const MIN_STRUCTURED_LINES: usize = 3;

/// Leading characters inspected for an `<html` root tag.
const HTML_SNIFF_CHARS: usize = 100;

/// Substrings that mark a line as structured markdown.
pub const MARKDOWN_MARKERS: &[&str] = &[
    "# ", "## ", "### ", "```", "- ", "* ", "1. ", "[", "**", "_", "> ",
];

/// Validate that `content` looks like a markdown document.
///
/// # Errors
///
/// Returns the first rule the content breaks, checked in order: empty body,
/// HTML payload, too short, too few structured lines.
///
/// # Examples
///
/// ```rust
/// use docmirror_core::validate::validate_markdown;
///
/// let doc = "# Title\n\nSome intro text that is long enough.\n\n- one\n- two\n";
/// assert!(validate_markdown(doc).is_ok());
/// assert!(validate_markdown("<!DOCTYPE html><html></html>").is_err());
/// ```
pub fn validate_markdown(content: &str) -> Result<(), ValidationError> {
    if content.is_empty() {
        return Err(ValidationError::Empty);
    }

    if looks_like_html(content) {
        return Err(ValidationError::Html);
    }

    let length = content.trim().chars().count();
    if length < MIN_CONTENT_CHARS {
        return Err(ValidationError::TooShort { length });
    }

    let markers = count_structured_lines(content);
    if markers < MIN_STRUCTURED_LINES {
        return Err(ValidationError::Unstructured { markers });
    }

    Ok(())
}

fn looks_like_html(content: &str) -> bool {
    let head = content.trim_start();
    if head
        .get(..9)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("<!doctype"))
    {
        return true;
    }

    let sniff: String = content
        .chars()
        .take(HTML_SNIFF_CHARS)
        .collect::<String>()
        .to_ascii_lowercase();
    sniff.contains("<html")
}

/// Count lines among the first [`SCAN_LINES`] that carry any marker.
pub fn count_structured_lines(content: &str) -> usize {
    content
        .lines()
        .take(SCAN_LINES)
        .filter(|line| {
            let trimmed = line.trim();
            MARKDOWN_MARKERS
                .iter()
                .any(|marker| trimmed.starts_with(marker) || line.contains(marker))
        })
        .count()
}
