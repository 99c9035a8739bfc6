//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - GET requests with a per-request timeout
//! - Redirect following
//! - Error classification

use crate::config::UserAgentConfig;
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Maximum redirect hops followed for a single request
pub const MAX_REDIRECTS: usize = 10;

/// A completed HTTP exchange, whatever its status
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// HTTP status code
    pub status: u16,
    /// Reason phrase for the status code
    pub reason: String,
    /// Final URL after redirects
    pub final_url: Url,
    /// Page body; `None` when the response carried no content
    pub body: Option<String>,
}

impl FetchResponse {
    /// Whether the status code is in the 2xx range
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Errors that abandon one fetch
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Request to {url} failed: {message}")]
    Transport { url: String, message: String },

    #[error("{url} answered {status} {reason}")]
    Status {
        url: String,
        status: u16,
        reason: String,
    },
}

impl FetchError {
    /// Classifies a reqwest failure
    pub fn from_reqwest(url: &Url, error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                message: error.to_string(),
            }
        }
    }

    /// Builds the failure for a non-success response
    pub fn from_response(response: &FetchResponse) -> Self {
        Self::Status {
            url: response.final_url.to_string(),
            status: response.status,
            reason: response.reason.clone(),
        }
    }
}

/// Capability to GET a URL
///
/// The crawler only depends on this trait, so tests can count or script
/// fetches without a network.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issues a GET for `url`, giving up after `timeout`
    ///
    /// Any HTTP status, success or not, is returned as `Ok`. Errors are
    /// reserved for exchanges that never produced a status.
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sitecrawl::config::UserAgentConfig;
/// use sitecrawl::crawler::build_http_client;
///
/// let client = build_http_client(&UserAgentConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`Fetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wraps an already configured client
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client from the user agent configuration and wraps it
    pub fn from_config(config: &UserAgentConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(build_http_client(config)?))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();
        let reason = status.canonical_reason().unwrap_or("").to_string();

        let text = response
            .text()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;
        let body = if text.is_empty() { None } else { Some(text) };

        Ok(FetchResponse {
            status: status.as_u16(),
            reason,
            final_url,
            body,
        })
    }
}
