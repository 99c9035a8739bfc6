//! Per-run crawl record

use crate::config::CrawlMode;
use crate::state::{PageState, RunState};
use crate::url::CanonicalUrl;
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// One fetch that did not produce a usable page
#[derive(Debug, Clone)]
pub struct FailureRecord {
    pub url: String,
    pub reason: String,
}

/// Everything a finished run has to say about itself
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Canonical seed URL
    pub root: CanonicalUrl,
    pub mode: CrawlMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub state: RunState,

    /// Terminal state counts, one entry per page that reached one
    pub pages_by_state: HashMap<PageState, u64>,

    /// Fetches that returned any HTTP status
    pub fetched: u64,

    /// New in-scope URLs accepted by the visited set, in acceptance order
    pub discovered: Vec<CanonicalUrl>,

    pub failures: Vec<FailureRecord>,
    pub persisted: u64,
    pub persist_failures: u64,

    /// URLs accepted but not queued because they were past `max-depth`
    pub skipped_depth: u64,

    /// URLs accepted but not queued because `max-pages` was reached
    pub skipped_page_limit: u64,
}

impl CrawlReport {
    /// Starts an empty report for a run that is about to begin
    pub fn new(root: CanonicalUrl, mode: CrawlMode) -> Self {
        Self {
            root,
            mode,
            started_at: Utc::now(),
            finished_at: None,
            state: RunState::Idle,
            pages_by_state: HashMap::new(),
            fetched: 0,
            discovered: Vec::new(),
            failures: Vec::new(),
            persisted: 0,
            persist_failures: 0,
            skipped_depth: 0,
            skipped_page_limit: 0,
        }
    }

    /// Counts a page reaching a terminal state
    pub fn record_page(&mut self, state: PageState) {
        *self.pages_by_state.entry(state).or_insert(0) += 1;
    }

    /// Number of pages that ended in `state`
    pub fn count(&self, state: PageState) -> u64 {
        self.pages_by_state.get(&state).copied().unwrap_or(0)
    }

    /// Marks the run finished
    pub fn finish(&mut self, state: RunState) {
        self.state = state;
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Whether cancellation cut the run short
    pub fn is_partial(&self) -> bool {
        matches!(self.state, RunState::Done { partial: true })
    }
}
