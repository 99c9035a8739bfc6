//! End-of-run statistics
//!
//! This module provides functionality for condensing a `CrawlReport` into
//! summary numbers and printing them.

use crate::output::CrawlReport;
use crate::state::PageState;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Pages that reached a terminal state
    pub total_pages: u64,

    /// Pages fetched and scheduled
    pub processed: u64,

    /// Pages whose fetch failed
    pub failed: u64,

    /// Pages dropped from the frontier by cancellation
    pub skipped: u64,

    /// New in-scope URLs discovered
    pub discovered: u64,

    /// Bodies written to the destination directory
    pub persisted: u64,

    /// Bodies that could not be written
    pub persist_failures: u64,

    /// URLs left unfetched because of `max-depth` or `max-pages`
    pub limit_skips: u64,
}

/// Summarizes a report
pub fn compute_statistics(report: &CrawlReport) -> CrawlStatistics {
    CrawlStatistics {
        total_pages: report.pages_by_state.values().sum(),
        processed: report.count(PageState::Processed),
        failed: report.count(PageState::Failed),
        skipped: report.count(PageState::Skipped),
        discovered: report.discovered.len() as u64,
        persisted: report.persisted,
        persist_failures: report.persist_failures,
        limit_skips: report.skipped_depth + report.skipped_page_limit,
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `report` - The finished run to display
pub fn print_statistics(report: &CrawlReport) {
    let stats = compute_statistics(report);

    println!();
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Root: {} ({})", report.root, report.mode.token());
    println!("  Run state: {}", report.state);
    println!("  Started: {}", report.started_at.to_rfc3339());
    if let Some(finished) = report.finished_at {
        println!("  Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    println!("Pages:");
    println!("  Fetched: {}", report.fetched);
    println!("  Processed: {}", stats.processed);
    println!("  Failed: {}", stats.failed);
    if stats.skipped > 0 {
        println!("  Skipped (cancelled): {}", stats.skipped);
    }
    println!("  Discovered: {}", stats.discovered);
    println!(
        "  Persisted: {} ({} failed)",
        stats.persisted, stats.persist_failures
    );
    println!();

    if stats.limit_skips > 0 {
        println!("Limits:");
        println!("  Beyond max-depth: {}", report.skipped_depth);
        println!("  Beyond max-pages: {}", report.skipped_page_limit);
        println!();
    }

    if !report.failures.is_empty() {
        println!("Failures ({}):", report.failures.len());
        for failure in &report.failures {
            println!("  - {}: {}", failure.url, failure.reason);
        }
        println!();
    }

    let success_rate = if stats.total_pages > 0 {
        (stats.processed as f64 / stats.total_pages as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully processed)",
        success_rate, stats.processed, stats.total_pages
    );
}
