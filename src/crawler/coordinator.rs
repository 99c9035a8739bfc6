//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Seeding the frontier and the visited set with the root
//! - Running a fixed-size pool of page workers
//! - Feeding newly discovered links back into the frontier
//! - Enforcing depth and page limits
//! - Handling cancellation

use crate::config::{CrawlMode, CrawlerConfig, FetchScheme, RunSettings};
use crate::crawler::extractor::extract_links;
use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::scheduler::{QueuedUrl, Scheduler};
use crate::output::{print_resolving, print_response, CrawlReport, FailureRecord};
use crate::state::{CancellationFlag, PageState, RunState, VisitedSet};
use crate::storage::{artifact_body, ArtifactKey, Storage};
use crate::url::{fetch_url_for, CanonicalUrl, CrawlRoot, ScopeRule};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace, warn};
use url::Url;

/// Main crawler coordinator structure
///
/// One coordinator drives exactly one run. The visited set lives as long as
/// the coordinator, so a second run needs a second coordinator.
pub struct Coordinator {
    settings: RunSettings,
    config: CrawlerConfig,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    visited: Arc<VisitedSet>,
    cancel: CancellationFlag,
}

/// Everything a page worker needs, shared by all workers of a run
struct PageContext {
    root: CrawlRoot,
    scope_rule: ScopeRule,
    fetch_scheme: FetchScheme,
    timeout: Duration,
    abort_in_flight: bool,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    visited: Arc<VisitedSet>,
    cancel: CancellationFlag,
}

/// What a worker reports back for one page
struct PageOutcome {
    page: QueuedUrl,
    state: PageState,
    fetched: bool,
    failure: Option<FailureRecord>,
    persisted: Option<bool>,
    /// Links seen for the first time in this run, with the URL to request
    accepted: Vec<(CanonicalUrl, Url)>,
}

impl PageOutcome {
    fn new(page: QueuedUrl) -> Self {
        Self {
            page,
            state: PageState::Queued,
            fetched: false,
            failure: None,
            persisted: None,
            accepted: Vec::new(),
        }
    }

    fn advance(&mut self, next: PageState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal page transition {} -> {}",
            self.state,
            next
        );
        trace!("{}: {} -> {}", self.page.canonical, self.state, next);
        self.state = next;
    }

    fn fail(mut self, url: &Url, reason: String) -> Self {
        warn!("Fetch failed for {}: {}", url, reason);
        self.failure = Some(FailureRecord {
            url: url.to_string(),
            reason,
        });
        self.advance(PageState::Failed);
        self
    }
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `settings` - The validated root, mode and destination
    /// * `config` - The crawler configuration
    /// * `fetcher` - Fetch capability
    /// * `storage` - Storage capability
    pub fn new(
        settings: RunSettings,
        config: CrawlerConfig,
        fetcher: Arc<dyn Fetcher>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            settings,
            config,
            fetcher,
            storage,
            visited: Arc::new(VisitedSet::new()),
            cancel: CancellationFlag::new(),
        }
    }

    /// Replaces the run's cancellation flag with an externally owned one
    pub fn with_cancellation(mut self, cancel: CancellationFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// A handle to the run's cancellation flag
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancel.clone()
    }

    /// The run's visited set
    pub fn visited(&self) -> Arc<VisitedSet> {
        Arc::clone(&self.visited)
    }

    /// Runs the main crawl loop
    ///
    /// The root is fetched first. Every page a worker finishes hands back its
    /// newly seen links; in recursive mode they are queued unless they are
    /// past a limit, in single-level mode they are only recorded. The loop
    /// ends when nothing is queued or in flight, or once cancellation is
    /// observed and the in-flight work has drained.
    ///
    /// Failures of individual pages are recorded in the report and never end
    /// the run early.
    pub async fn run(self) -> CrawlReport {
        let root = self.settings.root.clone();
        let mode = self.settings.mode;
        let mut report = CrawlReport::new(root.canonical().clone(), mode);

        debug_assert!(report.state.can_transition_to(RunState::Running));
        report.state = RunState::Running;

        info!(
            "Starting {} crawl of {} with {} workers",
            mode.token(),
            root.canonical(),
            self.config.workers
        );

        let context = Arc::new(PageContext {
            root: root.clone(),
            scope_rule: self.config.scope_rule,
            fetch_scheme: self.config.fetch_scheme,
            timeout: Duration::from_secs(self.config.request_timeout_secs),
            abort_in_flight: self.config.abort_in_flight,
            fetcher: Arc::clone(&self.fetcher),
            storage: Arc::clone(&self.storage),
            visited: Arc::clone(&self.visited),
            cancel: self.cancel.clone(),
        });

        let mut scheduler = Scheduler::new(self.config.queue_order);

        // A page that links to itself must not trigger a second root fetch
        self.visited.test_and_insert(root.canonical());
        let root_fetch = fetch_url_for(root.canonical(), root.seed_scheme(), self.config.fetch_scheme)
            .unwrap_or_else(|_| root.url().clone());
        scheduler.push(root.canonical().clone(), root_fetch, 0);
        let mut queued_total: u32 = 1;

        let workers = self.config.workers.max(1) as usize;
        let mut tasks = JoinSet::new();

        loop {
            while tasks.len() < workers && !self.cancel.is_cancelled() {
                let Some(page) = scheduler.pop() else {
                    break;
                };
                debug!("Dispatching {} (depth {})", page.canonical, page.depth);
                tasks.spawn(process_page(Arc::clone(&context), page));
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok(outcome) => {
                    self.absorb(outcome, &mut scheduler, &mut report, &mut queued_total);
                }
                Err(e) => {
                    error!("Page worker did not complete: {}", e);
                    report.record_page(PageState::Failed);
                }
            }
        }

        for page in scheduler.drain() {
            trace!("{}: {} -> {}", page.canonical, PageState::Queued, PageState::Skipped);
            report.record_page(PageState::Skipped);
        }

        let partial = self.cancel.is_cancelled();
        report.finish(RunState::Done { partial });

        info!(
            "Crawl {}: {} fetched, {} failed, {} discovered",
            report.state,
            report.fetched,
            report.count(PageState::Failed),
            report.discovered.len()
        );

        report
    }

    /// Folds one finished page into the report and queues its links
    fn absorb(
        &self,
        outcome: PageOutcome,
        scheduler: &mut Scheduler,
        report: &mut CrawlReport,
        queued_total: &mut u32,
    ) {
        report.record_page(outcome.state);
        if outcome.fetched {
            report.fetched += 1;
        }
        if let Some(failure) = outcome.failure {
            report.failures.push(failure);
        }
        match outcome.persisted {
            Some(true) => report.persisted += 1,
            Some(false) => report.persist_failures += 1,
            None => {}
        }

        let depth = outcome.page.depth + 1;
        let mut batch = Vec::new();

        for (canonical, fetch_url) in outcome.accepted {
            report.discovered.push(canonical.clone());

            if self.settings.mode == CrawlMode::SingleLevel {
                continue;
            }

            if depth > self.config.max_depth {
                debug!("Not queueing {}: depth {} exceeds limit", canonical, depth);
                report.skipped_depth += 1;
            } else if *queued_total >= self.config.max_pages {
                debug!("Not queueing {}: page limit reached", canonical);
                report.skipped_page_limit += 1;
            } else {
                *queued_total += 1;
                batch.push((canonical, fetch_url));
            }
        }

        if !batch.is_empty() {
            scheduler.push_batch(batch, depth);
        }
    }
}

/// Fetches, persists and extracts one page
async fn process_page(ctx: Arc<PageContext>, page: QueuedUrl) -> PageOutcome {
    let mut outcome = PageOutcome::new(page);

    if ctx.cancel.is_cancelled() {
        outcome.advance(PageState::Skipped);
        return outcome;
    }

    outcome.advance(PageState::Fetching);
    let url = outcome.page.fetch_url.clone();
    print_resolving(&url);

    let fetch = ctx.fetcher.fetch(&url, ctx.timeout);
    let result = if ctx.abort_in_flight {
        tokio::select! {
            result = fetch => Some(result),
            _ = ctx.cancel.cancelled() => None,
        }
    } else {
        Some(fetch.await)
    };

    let response = match result {
        None => return outcome.fail(&url, "aborted by cancellation".to_string()),
        Some(Err(e)) => return outcome.fail(&url, e.to_string()),
        Some(Ok(response)) => response,
    };

    outcome.fetched = true;
    print_response(&response);

    if !response.is_success() {
        let reason = FetchError::from_response(&response).to_string();
        return outcome.fail(&url, reason);
    }

    // Named after where the content was actually served from
    let key = ArtifactKey::from_url(&response.final_url);
    match ctx
        .storage
        .persist(&key, artifact_body(response.body.as_deref()))
        .await
    {
        Ok(path) => {
            debug!("Saved {} to {}", response.final_url, path.display());
            outcome.persisted = Some(true);
        }
        Err(e) => {
            warn!("Could not save {}: {}", response.final_url, e);
            outcome.persisted = Some(false);
        }
    }

    outcome.advance(PageState::Extracting);
    let links = extract_links(response.body.as_deref(), &ctx.root, ctx.scope_rule);

    outcome.advance(PageState::Scheduling);
    for link in links {
        if !ctx.visited.test_and_insert(&link.canonical) {
            trace!("Already seen {}", link.canonical);
            continue;
        }

        match fetch_url_for(&link.canonical, link.source.scheme(), ctx.fetch_scheme) {
            Ok(fetch_url) => outcome.accepted.push((link.canonical, fetch_url)),
            Err(e) => debug!("Cannot request {}: {}", link.canonical, e),
        }
    }

    outcome.advance(PageState::Processed);
    outcome
}
