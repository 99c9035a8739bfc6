//! sitecrawl: a seed-scoped web crawler
//!
//! This crate fetches a seed page, discovers absolute links in the raw page
//! text, keeps the ones that fall under the seed's domain and path, and
//! optionally follows them. Every URL is reduced to a canonical form that
//! serves as both the fetch key and the deduplication key, so each page is
//! fetched at most once per run.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod storage;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for sitecrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Startup(#[from] StartupError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Startup validation failures; all of them abort the run before any fetch
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("The command to start the program is not valid!")]
    InvalidStartCommand(String),

    #[error("The url is not valid!")]
    InvalidUrl(String),

    #[error("The entered mode is not valid")]
    InvalidMode(String),

    #[error("The entered destination url is not valid")]
    InvalidDestination(PathBuf),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Malformed URL: {0}")]
    Malformed(String),
}

/// Result type alias for sitecrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{Config, CrawlMode};
pub use state::{PageState, RunState, VisitedSet};
pub use crate::url::{is_valid_url, normalize, same_url, CanonicalUrl, CrawlRoot, ScopeRule};
