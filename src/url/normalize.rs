use crate::{UrlError, UrlResult};
use lazy_static::lazy_static;
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::fmt;
use url::Url;

/// Directory index filenames that are equivalent to their parent directory
const DEFAULT_DIRECTORY_INDEXES: &[&str] = &[
    "default.asp",
    "default.aspx",
    "index.htm",
    "index.html",
    "index.php",
];

/// Query marker after which everything is campaign tracking noise
const TRACKING_MARKER: &str = "utm_source=";

/// Absolute `scheme://host.tld/path` pattern used for both validation and discovery
const ABSOLUTE_URL_PATTERN: &str =
    r"(http|ftp|https)://([\w_-]+(?:(?:\.[\w_-]+)+))([\w.,@?^=%&:/~+#-]*[\w@?^=%&/~+#-])";

lazy_static! {
    static ref ABSOLUTE_URL: Regex = Regex::new(ABSOLUTE_URL_PATTERN).expect("valid regex pattern");
    static ref ABSOLUTE_URL_EXACT: Regex =
        Regex::new(&format!("^(?:{})$", ABSOLUTE_URL_PATTERN)).expect("valid regex pattern");
}

/// A URL in canonical form
///
/// Only [`normalize`] can build one, so holding a `CanonicalUrl` means the
/// string has already been through the whole pipeline. Two URLs refer to the
/// same page iff their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    /// Returns the canonical string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parses the canonical string back into a [`Url`]
    pub fn to_url(&self) -> UrlResult<Url> {
        Url::parse(&self.0).map_err(|e| UrlError::Malformed(format!("{}: {}", self.0, e)))
    }

    /// Consumes the wrapper and returns the inner string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for CanonicalUrl {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for CanonicalUrl {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Normalizes a URL into its canonical form
///
/// # Normalization Steps
///
/// 1. Percent-decode (until stable) and lowercase the whole URL
/// 2. Force `https` to `http`
/// 3. Strip trailing default directory indexes (`index.html`, `default.aspx`, ...)
/// 4. Remove the fragment
/// 5. Collapse runs of `/` in the path
/// 6. Prepend `www.` to two-label hosts
/// 7. Truncate the query at `utm_source=`, dropping the delimiter before it
/// 8. Trim trailing `?` and `/`
///
/// The output is a fixed point: `normalize(normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```
/// use sitecrawl::url::normalize;
///
/// let url = normalize("HTTPS://EXAMPLE.com/index.html").unwrap();
/// assert_eq!(url.as_str(), "http://www.example.com");
///
/// let url = normalize("http://example.com/a//b/?utm_source=x").unwrap();
/// assert_eq!(url.as_str(), "http://www.example.com/a/b");
/// ```
pub fn normalize(input: &str) -> UrlResult<CanonicalUrl> {
    let parsed = parse(input)?;

    // Step 1: decode and lowercase, then re-parse so later steps see real components
    let mut url = parse(&decode_fully(parsed.as_str()).to_lowercase())?;

    // Step 2: https and http share one cache key
    if url.scheme() == "https" {
        url.set_scheme("http")
            .map_err(|_| UrlError::Malformed(format!("{}: cannot switch scheme", input)))?;
    }

    if !url.cannot_be_a_base() {
        // Step 3
        strip_default_index(&mut url);

        // Step 4
        url.set_fragment(None);

        // Step 5
        if url.path().contains("//") {
            let collapsed = collapse_slashes(url.path());
            url.set_path(&collapsed);
        }
    } else {
        url.set_fragment(None);
    }

    // Step 6
    let prefixed = url.domain().and_then(with_www_prefix);
    if let Some(prefixed) = prefixed {
        url.set_host(Some(&prefixed))
            .map_err(|e| UrlError::Malformed(format!("{}: {}", input, e)))?;
    }

    // Step 7
    strip_tracking_query(&mut url);

    // Step 8
    let canonical = url
        .as_str()
        .trim_end_matches(|c: char| c == '?' || c == '/')
        .to_string();

    Ok(CanonicalUrl(canonical))
}

/// Checks whether the whole input looks like an absolute http, https or ftp URL
///
/// # Examples
///
/// ```
/// use sitecrawl::url::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/page"));
/// assert!(!is_valid_url("example.com/page"));
/// ```
pub fn is_valid_url(candidate: &str) -> bool {
    ABSOLUTE_URL_EXACT.is_match(candidate.trim())
}

/// Returns true when both URLs normalize to the same canonical form
///
/// A URL that cannot be parsed is never the same as anything.
pub fn same_url(a: &str, b: &str) -> bool {
    match (normalize(a), normalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Finds every absolute-URL-shaped substring of `text`, in order of appearance
pub fn url_matches(text: &str) -> impl Iterator<Item = &str> {
    ABSOLUTE_URL.find_iter(text).map(|m| m.as_str())
}

fn parse(input: &str) -> UrlResult<Url> {
    Url::parse(input.trim()).map_err(|e| UrlError::Malformed(format!("{}: {}", input, e)))
}

/// Percent-decodes until the text stops changing
///
/// Every pass that changes the text consumes at least one `%XX` triple, so
/// nested encodings like `%252541` always reach a fixed point.
fn decode_fully(raw: &str) -> String {
    let mut current = raw.to_string();
    loop {
        let decoded = percent_decode_str(&current).decode_utf8_lossy().into_owned();
        if decoded == current {
            return current;
        }
        current = decoded;
    }
}

/// Strips trailing default index segments, including stacked ones like `/index.php/default.asp`
fn strip_default_index(url: &mut Url) {
    let mut path = url.path().to_string();
    let mut stripped = false;

    while let Some((parent, last)) = path.trim_end_matches('/').rsplit_once('/') {
        if !DEFAULT_DIRECTORY_INDEXES.contains(&last) {
            break;
        }
        path = format!("{}/", parent);
        stripped = true;
    }

    if stripped {
        url.set_path(&path);
    }
}

fn collapse_slashes(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len());
    let mut previous_slash = false;

    for c in path.chars() {
        if c == '/' {
            if previous_slash {
                continue;
            }
            previous_slash = true;
        } else {
            previous_slash = false;
        }
        collapsed.push(c);
    }

    collapsed
}

fn with_www_prefix(domain: &str) -> Option<String> {
    if domain.split('.').count() == 2 && !domain.starts_with("www.") {
        Some(format!("www.{}", domain))
    } else {
        None
    }
}

fn strip_tracking_query(url: &mut Url) {
    let Some(query) = url.query() else {
        return;
    };
    let Some(idx) = query.find(TRACKING_MARKER) else {
        return;
    };

    // Drop the delimiter (`?` is already outside the query, `&` is the last char of head)
    let head = &query[..idx];
    let kept = head
        .char_indices()
        .last()
        .map(|(i, _)| head[..i].to_string())
        .unwrap_or_default();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&kept));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canonical(input: &str) -> String {
        normalize(input).unwrap().into_string()
    }

    #[test]
    fn test_index_page_and_scheme() {
        assert_eq!(
            canonical("HTTPS://EXAMPLE.com/index.html"),
            "http://www.example.com"
        );
    }

    #[test]
    fn test_double_slash_and_tracking() {
        assert_eq!(
            canonical("http://example.com/a//b/?utm_source=x"),
            "http://www.example.com/a/b"
        );
    }

    #[test]
    fn test_https_collides_with_http() {
        assert_eq!(
            canonical("https://www.example.com/page"),
            canonical("http://www.example.com/page")
        );
    }

    #[test]
    fn test_lowercases_path() {
        assert_eq!(
            canonical("http://www.example.com/Blog/Post"),
            "http://www.example.com/blog/post"
        );
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(
            canonical("http://www.example.com/a%2Fb"),
            "http://www.example.com/a/b"
        );
    }

    #[test]
    fn test_nested_percent_encoding_is_fully_decoded() {
        assert_eq!(
            canonical("http://www.example.com/%2541bc"),
            "http://www.example.com/abc"
        );
    }

    #[test]
    fn test_remove_fragment() {
        assert_eq!(
            canonical("http://www.example.com/page#Section-2"),
            "http://www.example.com/page"
        );
    }

    #[test]
    fn test_default_indexes_stripped() {
        for index in DEFAULT_DIRECTORY_INDEXES {
            let url = format!("http://www.example.com/docs/{}", index);
            assert_eq!(
                canonical(&url),
                "http://www.example.com/docs",
                "Failed to strip {}",
                index
            );
        }
    }

    #[test]
    fn test_stacked_indexes_stripped() {
        assert_eq!(
            canonical("http://www.example.com/a/index.html/index.htm"),
            "http://www.example.com/a"
        );
        assert_eq!(
            canonical("http://www.example.com/index.php/default.asp"),
            "http://www.example.com"
        );
    }

    #[test]
    fn test_deeply_nested_encoding_decoded() {
        assert_eq!(
            canonical("http://www.example.com/%25252525252525252541"),
            "http://www.example.com/a"
        );
    }

    #[test]
    fn test_index_must_be_whole_segment() {
        assert_eq!(
            canonical("http://www.example.com/blogindex.html"),
            "http://www.example.com/blogindex.html"
        );
    }

    #[test]
    fn test_index_before_trailing_slash() {
        assert_eq!(
            canonical("http://www.example.com/docs/index.php/"),
            "http://www.example.com/docs"
        );
    }

    #[test]
    fn test_www_added_to_two_label_host() {
        assert_eq!(canonical("http://example.org"), "http://www.example.org");
    }

    #[test]
    fn test_www_not_added_to_subdomain() {
        assert_eq!(
            canonical("http://blog.example.com/"),
            "http://blog.example.com"
        );
    }

    #[test]
    fn test_www_not_added_to_ip_host() {
        assert_eq!(
            canonical("http://127.0.0.1:8080/page/"),
            "http://127.0.0.1:8080/page"
        );
    }

    #[test]
    fn test_tracking_marker_mid_query() {
        assert_eq!(
            canonical("http://www.example.com/a?x=1&utm_source=feed&y=2"),
            "http://www.example.com/a?x=1"
        );
    }

    #[test]
    fn test_other_queries_kept() {
        assert_eq!(
            canonical("http://www.example.com/search?q=rust"),
            "http://www.example.com/search?q=rust"
        );
    }

    #[test]
    fn test_empty_query_trimmed() {
        assert_eq!(
            canonical("http://www.example.com/a/?"),
            "http://www.example.com/a"
        );
    }

    #[test]
    fn test_default_port_dropped() {
        assert_eq!(
            canonical("https://example.com:443/a"),
            "http://www.example.com/a"
        );
    }

    #[test]
    fn test_ftp_scheme_kept() {
        assert_eq!(
            canonical("ftp://files.example.com/pub/"),
            "ftp://files.example.com/pub"
        );
    }

    #[test]
    fn test_idempotent() {
        let inputs = [
            "HTTPS://EXAMPLE.com/index.html",
            "http://example.com/a//b/?utm_source=x",
            "http://Example.com/Path%2FTo#Section",
            "http://www.example.com/%2541bc",
            "http://www.example.com/docs/index.php/",
            "http://www.example.com/a b/c",
            "http://www.example.com/caf%C3%A9",
            "http://www.example.com/a?/",
            "http://www.example.com/a?x=1&utm_source=feed",
            "https://sub.example.co.uk:8443//x//y//",
            "ftp://files.example.com/pub/",
            "http://www.com/",
            "http://www.example.com/a/index.html/index.htm",
            "http://www.example.com/index.php/default.asp",
            "http://www.example.com/%25252525252525252541",
        ];

        for input in inputs {
            let once = canonical(input);
            let twice = canonical(&once);
            assert_eq!(once, twice, "normalize is not idempotent for {}", input);
        }
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            normalize("not a url"),
            Err(UrlError::Malformed(_))
        ));
        assert!(normalize("http://example.com:99999/").is_err());
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("http://www.example.com"));
        assert!(is_valid_url("https://example.com/a/b?c=d"));
        assert!(is_valid_url("ftp://files.example.com/pub"));
        assert!(is_valid_url("http://127.0.0.1:8080/page"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("mailto:someone@example.com"));
        assert!(!is_valid_url("http://localhost/page"));
        assert!(!is_valid_url("see http://example.com/page"));
    }

    #[test]
    fn test_same_url() {
        assert!(same_url(
            "https://EXAMPLE.com/Blog/#top",
            "http://www.example.com/blog"
        ));
        assert!(!same_url(
            "http://www.example.com/a",
            "http://www.example.com/b"
        ));
        assert!(!same_url("not a url", "not a url"));
    }

    #[test]
    fn test_url_matches_in_text() {
        let text = r#"<a href="http://www.example.com/a">a</a> and https://example.com/b."#;
        let found: Vec<&str> = url_matches(text).collect();
        assert_eq!(
            found,
            vec!["http://www.example.com/a", "https://example.com/b"]
        );
    }
}
