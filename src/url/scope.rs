use super::normalize::{normalize, CanonicalUrl};
use crate::UrlError;
use serde::Deserialize;
use url::Url;

/// How candidate URLs are tested against the crawl root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScopeRule {
    /// Same canonical host and port, and the root path is a whole-segment prefix
    #[default]
    SegmentAligned,

    /// `rootHost + rootPath` contains `candidateHost + "/"` as plain text
    ///
    /// Kept for parity with crawl output produced by older tooling. It accepts
    /// any host whose name is a textual suffix of the root host.
    LegacySubstring,
}

/// The seed URL of a run, fixed for its whole lifetime
#[derive(Debug, Clone)]
pub struct CrawlRoot {
    canonical: CanonicalUrl,
    url: Url,
    seed_scheme: String,
    host: String,
    segments: Vec<String>,
}

impl CrawlRoot {
    /// Parses and canonicalizes a seed URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sitecrawl::url::CrawlRoot;
    ///
    /// let root = CrawlRoot::parse("https://example.com/Blog/").unwrap();
    /// assert_eq!(root.canonical().as_str(), "http://www.example.com/blog");
    /// assert_eq!(root.host(), "www.example.com");
    /// assert_eq!(root.seed_scheme(), "https");
    /// ```
    pub fn parse(seed: &str) -> Result<Self, UrlError> {
        let seed_url =
            Url::parse(seed.trim()).map_err(|e| UrlError::Malformed(format!("{}: {}", seed, e)))?;
        let canonical = normalize(seed)?;
        let url = canonical.to_url()?;
        let host = url
            .host_str()
            .ok_or_else(|| UrlError::Malformed(format!("{}: missing host", seed)))?
            .to_string();
        let segments = path_segments(&url);

        Ok(Self {
            canonical,
            url,
            seed_scheme: seed_url.scheme().to_string(),
            host,
            segments,
        })
    }

    /// The canonical form of the seed
    pub fn canonical(&self) -> &CanonicalUrl {
        &self.canonical
    }

    /// The canonical form of the seed, parsed
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Scheme the seed was given with, before canonicalization
    pub fn seed_scheme(&self) -> &str {
        &self.seed_scheme
    }

    /// Canonical host of the seed
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Non-empty path segments of the canonical seed
    pub fn path_segments(&self) -> &[String] {
        &self.segments
    }
}

/// Decides whether `candidate` belongs to the crawl rooted at `root`
///
/// # Examples
///
/// ```
/// use sitecrawl::url::{in_scope, CrawlRoot, ScopeRule};
/// use url::Url;
///
/// let root = CrawlRoot::parse("http://www.example.com/blog").unwrap();
/// let post = Url::parse("http://www.example.com/blog/post1").unwrap();
/// let other = Url::parse("http://other.com/blog/post1").unwrap();
///
/// assert!(in_scope(&post, &root, ScopeRule::SegmentAligned));
/// assert!(!in_scope(&other, &root, ScopeRule::SegmentAligned));
/// ```
pub fn in_scope(candidate: &Url, root: &CrawlRoot, rule: ScopeRule) -> bool {
    match rule {
        ScopeRule::SegmentAligned => segment_aligned(candidate, root),
        ScopeRule::LegacySubstring => legacy_substring(candidate, root),
    }
}

fn segment_aligned(candidate: &Url, root: &CrawlRoot) -> bool {
    let Ok(canonical) = normalize(candidate.as_str()) else {
        return false;
    };
    let Ok(url) = canonical.to_url() else {
        return false;
    };

    if url.host_str() != Some(root.host()) || url.port() != root.url().port() {
        return false;
    }

    let segments = path_segments(&url);
    segments.is_empty() || segments.starts_with(root.path_segments())
}

fn legacy_substring(candidate: &Url, root: &CrawlRoot) -> bool {
    let root_text = format!("{}{}", root.host(), root.url().path());
    let candidate_text = format!("{}/", candidate.host_str().unwrap_or_default());
    root_text.contains(&candidate_text)
}

fn path_segments(url: &Url) -> Vec<String> {
    url.path_segments()
        .map(|segments| {
            segments
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
