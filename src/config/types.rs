use crate::url::{CrawlRoot, ScopeRule};
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure for sitecrawl
///
/// Every key has a default, so an absent or partial file is valid.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Number of fetches allowed in flight at once
    pub workers: u32,

    /// Per-request timeout in seconds, 6 to 10
    pub request_timeout_secs: u64,

    /// Deepest link level that is still fetched (the seed is depth 0)
    pub max_depth: u32,

    /// Upper bound on fetches per run
    pub max_pages: u32,

    /// Order in which queued URLs are handed to workers
    pub queue_order: QueueOrder,

    /// Domain-scope test applied to discovered links
    pub scope_rule: ScopeRule,

    /// Scheme used when requesting a canonical URL
    pub fetch_scheme: FetchScheme,

    /// Abort in-flight fetches on cancellation instead of letting them finish
    pub abort_in_flight: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            request_timeout_secs: 10,
            max_depth: 16,
            max_pages: 10_000,
            queue_order: QueueOrder::default(),
            scope_rule: ScopeRule::default(),
            fetch_scheme: FetchScheme::default(),
            abort_in_flight: false,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct UserAgentConfig {
    /// Name of the crawler
    pub crawler_name: String,

    /// Version of the crawler
    pub crawler_version: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "sitecrawl".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Frontier ordering policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueueOrder {
    /// Newest discoveries first, in the order they were found on the page
    #[default]
    DepthFirst,

    /// Oldest discoveries first (breadth-first)
    Fifo,

    /// Lowest depth first, ties broken by discovery order
    ShallowestFirst,
}

/// Which scheme is used on the wire for a canonical URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchScheme {
    /// Request with the scheme the link was discovered with
    #[default]
    Preserve,

    /// Request the canonical form verbatim (always `http`)
    Canonical,
}

/// Whether discovered links are followed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlMode {
    /// Fetch every newly discovered in-scope URL (`-r`)
    Recursive,

    /// Only record what the root page links to (`-n`)
    SingleLevel,
}

impl CrawlMode {
    /// Parses the command-line mode token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "-r" => Some(Self::Recursive),
            "-n" => Some(Self::SingleLevel),
            _ => None,
        }
    }

    /// The command-line token for this mode
    pub fn token(&self) -> &'static str {
        match self {
            Self::Recursive => "-r",
            Self::SingleLevel => "-n",
        }
    }
}

/// The four positional command-line tokens, unvalidated
#[derive(Debug, Clone)]
pub struct StartArgs {
    pub start_command: String,
    pub mode: String,
    pub root_url: String,
    pub destination: PathBuf,
}

/// Validated per-run settings derived from [`StartArgs`]
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: CrawlMode,
    pub root: CrawlRoot,
    pub destination: PathBuf,
}
