//! Hardened sitemap parsing.
//!
//! Sitemaps come from a remote server we do not control, so the parser
//! refuses any document carrying a `DOCTYPE` declaration. Without a DTD there
//! is nothing to declare custom or external entities with, and any reference
//! to an undeclared entity inside a `<loc>` fails to unescape and is reported
//! as a parse error rather than expanded.
//!
//! Location extraction prefers `<url><loc>` elements bound to the sitemap
//! namespace. When a document yields none (a missing or different `xmlns`
//! is common in practice) every `<loc>` element is collected by local name.
//!
//! ```rust
//! use docmirror_core::discovery::sitemap::parse_locations;
//!
//! let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
//! <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
//!   <url><loc>https://docs.example.com/en/docs/claude-code/overview</loc></url>
//! </urlset>"#;
//!
//! let locations = parse_locations(xml).unwrap();
//! assert_eq!(locations, vec!["https://docs.example.com/en/docs/claude-code/overview"]);
//! ```

use crate::{Error, Result};
use quick_xml::NsReader;
use quick_xml::events::Event;
use quick_xml::name::{Namespace, ResolveResult};
use tracing::{debug, instrument};

/// Namespace of the sitemap protocol.
pub const SITEMAP_NAMESPACE: &[u8] = b"http://www.sitemaps.org/schemas/sitemap/0.9";

/// Where the parser currently is relative to a `<loc>` element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LocScope {
    Outside,
    /// Inside a `<loc>`; `namespaced` when it sits in a sitemap-namespace `<url>`.
    Inside { namespaced: bool },
}

/// Collect the `<loc>` values of a sitemap in document order.
///
/// # Errors
///
/// Returns [`Error::Parse`] if the document is malformed, declares a
/// `DOCTYPE`, or references an entity that cannot be resolved.
#[instrument(skip(xml), fields(xml_len = xml.len()))]
pub fn parse_locations(xml: &str) -> Result<Vec<String>> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut namespaced = Vec::new();
    let mut any = Vec::new();
    let mut url_depth = 0usize;
    let mut scope = LocScope::Outside;

    loop {
        match reader.read_resolved_event() {
            Ok((ns, Event::Start(e))) => {
                let in_sitemap_ns = is_sitemap_ns(&ns);
                match e.local_name().as_ref() {
                    b"url" if in_sitemap_ns => url_depth += 1,
                    b"loc" => {
                        scope = LocScope::Inside {
                            namespaced: in_sitemap_ns && url_depth > 0,
                        };
                    },
                    _ => {},
                }
            },
            Ok((ns, Event::End(e))) => match e.local_name().as_ref() {
                b"url" if is_sitemap_ns(&ns) => url_depth = url_depth.saturating_sub(1),
                b"loc" => scope = LocScope::Outside,
                _ => {},
            },
            Ok((_, Event::Text(t))) => {
                if let LocScope::Inside { namespaced: in_ns } = scope {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::Parse(format!("Invalid sitemap location: {e}")))?;
                    push_location(&text, in_ns, &mut namespaced, &mut any);
                }
            },
            Ok((_, Event::CData(c))) => {
                if let LocScope::Inside { namespaced: in_ns } = scope {
                    let text = String::from_utf8_lossy(&c).into_owned();
                    push_location(&text, in_ns, &mut namespaced, &mut any);
                }
            },
            Ok((_, Event::DocType(_))) => {
                return Err(Error::Parse(
                    "Sitemap declares a DOCTYPE, refusing to parse".to_string(),
                ));
            },
            Ok((_, Event::Eof)) => break,
            Err(e) => return Err(Error::Parse(format!("XML parse error: {e}"))),
            Ok(_) => {},
        }
    }

    if namespaced.is_empty() {
        debug!(count = any.len(), "No namespaced locations, using local-name matches");
        Ok(any)
    } else {
        Ok(namespaced)
    }
}

/// First location in the sitemap, using the same preference as [`parse_locations`].
///
/// # Errors
///
/// Propagates parse failures from [`parse_locations`].
pub fn first_location(xml: &str) -> Result<Option<String>> {
    Ok(parse_locations(xml)?.into_iter().next())
}

fn is_sitemap_ns(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == SITEMAP_NAMESPACE)
}

fn push_location(text: &str, in_ns: bool, namespaced: &mut Vec<String>, any: &mut Vec<String>) {
    let text = text.trim();
    if text.is_empty() {
        return;
    }
    if in_ns {
        namespaced.push(text.to_string());
    }
    any.push(text.to_string());
}
