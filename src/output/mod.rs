//! Output module for console status and crawl summaries
//!
//! This module handles:
//! - The `Resolving...` / `Response...` lines printed around every fetch
//! - The per-run `CrawlReport`
//! - End-of-run statistics

mod report;
pub mod stats;
mod status;

pub use report::{CrawlReport, FailureRecord};
pub use stats::{compute_statistics, print_statistics, CrawlStatistics};
pub use status::{print_resolving, print_response, resolving_line, response_line};
