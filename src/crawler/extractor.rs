//! Pattern-based link extraction
//!
//! Links are discovered by scanning raw page text for absolute URLs, not by
//! parsing markup, so anything that looks like a URL counts: anchors, script
//! strings, plain text.

use crate::url::{in_scope, normalize, url_matches, CanonicalUrl, CrawlRoot, ScopeRule};
use std::collections::HashSet;
use tracing::debug;
use url::Url;

/// An in-scope URL found in a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Deduplication key
    pub canonical: CanonicalUrl,

    /// The expanded candidate before canonicalization; keeps the scheme the
    /// link was written with
    pub source: Url,
}

/// Extracts in-scope links from page text
///
/// Every absolute URL in `text` that passes the scope test is expanded into
/// its ancestor paths (`/a`, `/a/b`, ..., full path with query) and each
/// candidate that is itself in scope is returned once, in match order then
/// expansion order. Matches that fail to parse are skipped.
///
/// # Examples
///
/// ```
/// use sitecrawl::crawler::extract_links;
/// use sitecrawl::url::{CrawlRoot, ScopeRule};
///
/// let root = CrawlRoot::parse("http://www.example.com").unwrap();
/// let links = extract_links(
///     Some(r#"<a href="http://www.example.com/a/b/c">x</a>"#),
///     &root,
///     ScopeRule::SegmentAligned,
/// );
///
/// let found: Vec<&str> = links.iter().map(|l| l.canonical.as_str()).collect();
/// assert_eq!(
///     found,
///     vec![
///         "http://www.example.com/a",
///         "http://www.example.com/a/b",
///         "http://www.example.com/a/b/c",
///     ]
/// );
/// ```
pub fn extract_links(text: Option<&str>, root: &CrawlRoot, rule: ScopeRule) -> Vec<DiscoveredLink> {
    let Some(text) = text.filter(|t| !t.is_empty()) else {
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for matched in url_matches(text) {
        let parsed = match Url::parse(matched) {
            Ok(url) => url,
            Err(e) => {
                debug!("Dropping malformed match {}: {}", matched, e);
                continue;
            }
        };

        if !in_scope(&parsed, root, rule) {
            continue;
        }

        for candidate in expand_segments(&parsed) {
            if !in_scope(&candidate, root, rule) {
                continue;
            }

            let canonical = match normalize(candidate.as_str()) {
                Ok(canonical) => canonical,
                Err(e) => {
                    debug!("Dropping candidate {}: {}", candidate, e);
                    continue;
                }
            };

            if seen.insert(canonical.clone()) {
                links.push(DiscoveredLink {
                    canonical,
                    source: candidate,
                });
            }
        }
    }

    links
}

/// Builds one candidate per path prefix of `url`
///
/// The last candidate is the full path with its query. A URL without path
/// segments yields only itself.
fn expand_segments(url: &Url) -> Vec<Url> {
    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    if segments.is_empty() {
        let mut only = url.clone();
        only.set_fragment(None);
        return vec![only];
    }

    let mut candidates = Vec::with_capacity(segments.len());
    for depth in 1..=segments.len() {
        let mut candidate = url.clone();
        candidate.set_path(&format!("/{}", segments[..depth].join("/")));
        if depth < segments.len() {
            candidate.set_query(None);
        }
        candidate.set_fragment(None);
        candidates.push(candidate);
    }

    candidates
}
