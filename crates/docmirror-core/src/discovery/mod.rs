//! Finding the sitemap, the documentation host and the pages to mirror.
//!
//! Discovery runs once per run, in two steps:
//!
//! 1. [`discover_source`] walks the configured sitemap candidates and returns
//!    the first one that lists a page, together with that page's origin.
//! 2. [`enumerate_pages`] re-reads the sitemap and selects the documentation
//!    pages, falling back to the configured static list when the sitemap
//!    yields nothing.
//!
//! The first step failing is fatal for a run; the second never is.

pub mod pages;
pub mod sitemap;
pub mod source;

pub use pages::{PageList, PageOrigin, enumerate_pages, extract_pages, normalize_path, select_pages};
pub use sitemap::{first_location, parse_locations};
pub use source::{DiscoveredSource, base_url_of, discover_source};
