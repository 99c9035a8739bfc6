//! sitecrawl main entry point
//!
//! This is the command-line interface for the sitecrawl seed-scoped crawler.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use sitecrawl::config::{load_config_with_hash, Config, StartArgs};
use sitecrawl::crawler::run_crawl;
use sitecrawl::output::print_statistics;
use sitecrawl::state::CancellationFlag;
use sitecrawl::CrawlError;
use tracing_subscriber::EnvFilter;

/// sitecrawl: fetch a site section and everything it links to
///
/// Usage: sitecrawl wcraw (-r|-n) <ROOT_URL> <DESTINATION>
///
/// `-r` follows every in-scope link recursively; `-n` fetches the root only
/// and records what it links to. Fetched pages are written to DESTINATION,
/// which must already exist.
#[derive(Parser, Debug)]
#[command(name = "sitecrawl")]
#[command(version)]
#[command(about = "A seed-scoped web crawler", long_about = None)]
struct Cli {
    /// Start command, must be `wcraw`
    #[arg(value_name = "COMMAND")]
    start_command: String,

    /// Crawl mode: `-r` (recursive) or `-n` (root page only)
    #[arg(value_name = "MODE", allow_hyphen_values = true)]
    mode: String,

    /// URL the crawl starts from and is scoped to
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Existing directory that receives fetched pages
    #[arg(value_name = "DESTINATION")]
    destination: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::debug!("No configuration file given, using defaults");
            Config::default()
        }
    };

    let args = StartArgs {
        start_command: cli.start_command,
        mode: cli.mode,
        root_url: cli.root_url,
        destination: cli.destination,
    };

    let cancel = CancellationFlag::new();
    spawn_interrupt_handler(cancel.clone());

    match run_crawl(&config, &args, cancel).await {
        Ok(report) => {
            if !cli.quiet {
                print_statistics(&report);
            }
            Ok(())
        }
        Err(CrawlError::Startup(e)) => {
            println!("{}", e);
            tracing::debug!("Startup rejected: {:?}", e);
            std::process::exit(2);
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitecrawl=info,warn"),
            1 => EnvFilter::new("sitecrawl=debug,info"),
            2 => EnvFilter::new("sitecrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Raises `cancel` on the first Ctrl-C
fn spawn_interrupt_handler(cancel: CancellationFlag) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::warn!("Interrupt received, finishing in-flight pages");
                cancel.cancel();
            }
            Err(e) => tracing::error!("Could not listen for Ctrl-C: {}", e),
        }
    });
}
