//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` capability
//! - Pattern-based link extraction with segment expansion
//! - The crawl frontier
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod scheduler;

pub use coordinator::Coordinator;
pub use extractor::{extract_links, DiscoveredLink};
pub use fetcher::{
    build_http_client, FetchError, FetchResponse, Fetcher, HttpFetcher, MAX_REDIRECTS,
};
pub use scheduler::{QueuedUrl, Scheduler};

use crate::config::{validate, validate_start_args, Config, StartArgs};
use crate::output::CrawlReport;
use crate::state::CancellationFlag;
use crate::storage::FileStorage;
use std::sync::Arc;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration ranges
/// 2. Validate the start tokens (command, URL, mode, destination)
/// 3. Open the destination directory as storage
/// 4. Build the HTTP client
/// 5. Fetch, extract and schedule until the frontier drains or `cancel` is raised
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `args` - The positional start tokens
/// * `cancel` - Flag that stops the run early when raised
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The run happened; individual pages may still have failed
/// * `Err(CrawlError)` - Configuration or startup was rejected and nothing was fetched
pub async fn run_crawl(
    config: &Config,
    args: &StartArgs,
    cancel: CancellationFlag,
) -> crate::Result<CrawlReport> {
    validate(config)?;
    let settings = validate_start_args(args)?;
    let storage = FileStorage::new(&settings.destination)?;
    let fetcher = HttpFetcher::from_config(&config.user_agent)?;

    let coordinator = Coordinator::new(
        settings,
        config.crawler.clone(),
        Arc::new(fetcher),
        Arc::new(storage),
    )
    .with_cancellation(cancel);

    Ok(coordinator.run().await)
}
