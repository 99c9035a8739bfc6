/// Page and run state definitions for tracking crawl progress
///
/// A page moves through fetch, extract and schedule on one worker; the run as a
/// whole is either waiting to start, running, or finished.
use std::fmt;

/// Represents the current state of a page in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    // ===== Active States =====
    /// Page is in the frontier waiting for a worker
    Queued,

    /// Page request is in flight
    Fetching,

    /// Links are being pulled out of the fetched body
    Extracting,

    /// Extracted links are being checked against the visited set
    Scheduling,

    // ===== Terminal States =====
    /// Page was fetched and its links scheduled
    Processed,

    /// Fetch failed (transport error, timeout, or non-success status)
    Failed,

    /// Page was never fetched because the run was cancelled
    Skipped,
}

impl PageState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Failed | Self::Skipped)
    }

    /// Returns true if `next` is a legal successor of this state
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(
            (self, next),
            (Self::Queued, Self::Fetching)
                | (Self::Queued, Self::Skipped)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracting, Self::Scheduling)
                | (Self::Scheduling, Self::Processed)
        )
    }

    /// Short lowercase label used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Scheduling => "scheduling",
            Self::Processed => "processed",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        }
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a whole crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunState {
    /// Startup validation has not finished yet
    Idle,

    /// At least one page is queued or in flight
    Running,

    /// No work remains; `partial` is set when cancellation cut the run short
    Done { partial: bool },

    /// Startup validation rejected the run; nothing was fetched
    Failed,
}

impl RunState {
    /// Returns true once the run can no longer change state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Failed)
    }

    /// Returns true if `next` is a legal successor of this state
    ///
    /// `Failed` is only reachable from `Idle`: once fetching starts, every
    /// failure has a local recovery and the run ends in `Done`.
    pub fn can_transition_to(&self, next: RunState) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Running)
                | (Self::Idle, Self::Failed)
                | (Self::Running, Self::Done { .. })
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::Running => f.write_str("running"),
            Self::Done { partial: false } => f.write_str("done"),
            Self::Done { partial: true } => f.write_str("done (partial)"),
            Self::Failed => f.write_str("failed"),
        }
    }
}
