use crate::config::types::{Config, CrawlMode, CrawlerConfig, RunSettings, StartArgs, UserAgentConfig};
use crate::url::{is_valid_url, CrawlRoot};
use crate::{ConfigError, ConfigResult, StartupError};

/// The literal first token that starts a crawl
pub const START_COMMAND: &str = "wcraw";

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    if !(6..=10).contains(&config.request_timeout_secs) {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 6 and 10, got {}",
            config.request_timeout_secs
        )));
    }

    if config.max_depth < 1 {
        return Err(ConfigError::Validation(format!(
            "max-depth must be >= 1, got {}",
            config.max_depth
        )));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the positional start tokens, in command, URL, mode, destination order
///
/// Nothing touches the network here; the only side effect is checking that the
/// destination directory exists.
pub fn validate_start_args(args: &StartArgs) -> Result<RunSettings, StartupError> {
    if args.start_command != START_COMMAND {
        return Err(StartupError::InvalidStartCommand(args.start_command.clone()));
    }

    let root = CrawlRoot::parse(&args.root_url)
        .map_err(|_| StartupError::InvalidUrl(args.root_url.clone()))?;
    if !is_valid_url(root.canonical().as_str()) {
        return Err(StartupError::InvalidUrl(args.root_url.clone()));
    }

    let mode =
        CrawlMode::from_token(&args.mode).ok_or_else(|| StartupError::InvalidMode(args.mode.clone()))?;

    if !args.destination.is_dir() {
        return Err(StartupError::InvalidDestination(args.destination.clone()));
    }

    Ok(RunSettings {
        mode,
        root,
        destination: args.destination.clone(),
    })
}
