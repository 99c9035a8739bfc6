//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `PageState`: lifecycle of one page (queued, fetching, extracting, scheduling, ...)
//! - `RunState`: lifecycle of a whole run (idle, running, done, failed)
//! - `VisitedSet`: canonical URLs already scheduled in the current run
//! - `CancellationFlag`: run-scoped stop signal checked before every fetch

mod cancel;
mod page_state;
mod visited;

// Re-export main types
pub use cancel::CancellationFlag;
pub use page_state::{PageState, RunState};
pub use visited::VisitedSet;
