//! Per-fetch console status lines
//!
//! These go to stdout with `println!` rather than through `tracing`: the two
//! lines are the user-facing progress display and must appear regardless of
//! the log filter.

use crate::crawler::FetchResponse;
use url::Url;

/// Formats the line printed before a request is issued
pub fn resolving_line(url: &Url) -> String {
    format!("Resolving... {}", url)
}

/// Formats the line printed once a status is known
pub fn response_line(response: &FetchResponse) -> String {
    format!("Response... {} {}", response.status, response.reason)
}

/// Prints `Resolving... <url>`
pub fn print_resolving(url: &Url) {
    println!("{}", resolving_line(url));
}

/// Prints `Response... <code> <reason>`
pub fn print_response(response: &FetchResponse) {
    println!("{}", response_line(response));
}
