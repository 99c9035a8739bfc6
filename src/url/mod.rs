//! URL handling module for sitecrawl
//!
//! This module provides URL canonicalization, the crawl root, and the
//! domain-scope test that decides which discovered URLs belong to a run.

mod normalize;
mod scope;

use crate::config::FetchScheme;
use crate::UrlError;
use url::Url;

// Re-export main functions
pub use normalize::{is_valid_url, normalize, same_url, url_matches, CanonicalUrl};
pub use scope::{in_scope, CrawlRoot, ScopeRule};

/// Chooses the URL actually requested for a canonical key
///
/// The canonical form always carries `http`. With [`FetchScheme::Preserve`]
/// the scheme the link was discovered with is put back, so an `https` link is
/// fetched over `https` while still deduplicating against its `http` twin.
///
/// # Examples
///
/// ```
/// use sitecrawl::config::FetchScheme;
/// use sitecrawl::url::{fetch_url_for, normalize};
///
/// let key = normalize("https://example.com/a").unwrap();
/// let url = fetch_url_for(&key, "https", FetchScheme::Preserve).unwrap();
/// assert_eq!(url.as_str(), "https://www.example.com/a");
///
/// let url = fetch_url_for(&key, "https", FetchScheme::Canonical).unwrap();
/// assert_eq!(url.as_str(), "http://www.example.com/a");
/// ```
pub fn fetch_url_for(
    canonical: &CanonicalUrl,
    source_scheme: &str,
    policy: FetchScheme,
) -> Result<Url, UrlError> {
    let mut url = canonical.to_url()?;

    if policy == FetchScheme::Preserve && source_scheme == "https" && url.scheme() == "http" {
        url.set_scheme("https")
            .map_err(|_| UrlError::Malformed(format!("{}: cannot switch scheme", canonical)))?;
    }

    Ok(url)
}
