//! Storage module for persisting fetched pages
//!
//! This module handles writing page bodies to the destination directory:
//! - Artifact naming from the fetched URL
//! - The placeholder written for empty bodies
//! - The `Storage` capability and its filesystem backend

mod filesystem;
mod traits;

pub use filesystem::FileStorage;
pub use traits::{Storage, StorageError, StorageResult};

use url::Url;

/// Content written in place of an empty response body
pub const EMPTY_BODY_PLACEHOLDER: &str = "No content found in this url!!";

/// Stem used when a URL has no path segment to name the file after
const INDEX_STEM: &str = "index";

/// Identifies a persisted artifact: the page's host plus its last path segment
///
/// Artifacts are keyed by location, not content, so two URLs that share a
/// host and last segment map to the same file.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    host: String,
    segment: String,
}

impl ArtifactKey {
    /// Builds the key for a fetched URL
    ///
    /// # Examples
    ///
    /// ```
    /// use sitecrawl::storage::ArtifactKey;
    /// use url::Url;
    ///
    /// let key = ArtifactKey::from_url(&Url::parse("http://www.example.com/blog/post1").unwrap());
    /// assert_eq!(key.file_name(), "www.example.com-post1.html");
    ///
    /// let key = ArtifactKey::from_url(&Url::parse("http://www.example.com/files/a.pdf").unwrap());
    /// assert_eq!(key.file_name(), "www.example.com-a.pdf");
    ///
    /// let key = ArtifactKey::from_url(&Url::parse("http://www.example.com").unwrap());
    /// assert_eq!(key.file_name(), "www.example.com-index.html");
    /// ```
    pub fn from_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or("unknown-host").to_string();
        let segment = url
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .unwrap_or(INDEX_STEM)
            .to_string();

        Self { host, segment }
    }

    /// Host part of the key
    pub fn host(&self) -> &str {
        &self.host
    }

    /// File name inside the destination directory
    ///
    /// Characters that are unsafe in file names become `_`. A segment without
    /// an extension gets `.html`.
    pub fn file_name(&self) -> String {
        let mut name = format!("{}-{}", sanitize(&self.host), sanitize(&self.segment));
        if !self.segment.contains('.') {
            name.push_str(".html");
        }
        name
    }
}

/// Chooses the bytes written for a response body
pub fn artifact_body(body: Option<&str>) -> &[u8] {
    match body {
        Some(text) if !text.is_empty() => text.as_bytes(),
        _ => EMPTY_BODY_PLACEHOLDER.as_bytes(),
    }
}

fn sanitize(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
