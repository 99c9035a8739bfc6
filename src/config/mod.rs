//! Configuration module for sitecrawl
//!
//! This module handles the optional TOML tuning file and the validation of the
//! four positional start tokens.
//!
//! # Example
//!
//! ```no_run
//! use sitecrawl::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sitecrawl.toml")).unwrap();
//! println!("Crawler will use {} workers", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlMode, CrawlerConfig, FetchScheme, QueueOrder, RunSettings, StartArgs,
    UserAgentConfig,
};

// Re-export parser and validation functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::{validate, validate_start_args, START_COMMAND};
