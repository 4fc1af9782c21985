use crate::config::types::{Config, CrawlerConfig, ExclusionConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound on the request rate; the crawl is meant to be polite
const MAX_REQUESTS_PER_SECOND: f64 = 100.0;

/// Upper bound on how far the context resolver walks up the tree
const MAX_CONTEXT_ANCESTOR_DEPTH: usize = 20;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_exclusions(&config.exclusions)?;
    Ok(())
}

/// Validates the root URL supplied on the command line
///
/// The root must be an absolute HTTP(S) URL with a host. It is returned
/// lower-cased, which is the form every comparison in the crawl uses.
///
/// # Arguments
///
/// * `raw` - The URL as typed by the operator
///
/// # Returns
///
/// * `Ok(String)` - The lower-cased root URL
/// * `Err(ConfigError)` - The URL is not a crawlable site root
pub fn validate_root_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();
    let url = Url::parse(trimmed).map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} must use http or https, got {}",
            raw,
            url.scheme()
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!("{} has no host", raw)));
    }

    Ok(trimmed.to_lowercase())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    // max_depth >= 0 is always true for u32, so no check needed

    if !(config.requests_per_second > 0.0 && config.requests_per_second <= MAX_REQUESTS_PER_SECOND)
    {
        return Err(ConfigError::Validation(format!(
            "requests_per_second must be in (0, {}], got {}",
            MAX_REQUESTS_PER_SECOND, config.requests_per_second
        )));
    }

    if config.context_ancestor_depth < 1 || config.context_ancestor_depth > MAX_CONTEXT_ANCESTOR_DEPTH
    {
        return Err(ConfigError::Validation(format!(
            "context_ancestor_depth must be between 1 and {}, got {}",
            MAX_CONTEXT_ANCESTOR_DEPTH, config.context_ancestor_depth
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.value.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent cannot be empty".to_string(),
        ));
    }

    if config.value.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(format!(
            "user agent must not contain control characters, got '{}'",
            config.value.escape_debug()
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the excluded extension list
fn validate_exclusions(config: &ExclusionConfig) -> Result<(), ConfigError> {
    for ext in &config.extensions {
        if ext.is_empty() {
            return Err(ConfigError::Validation(
                "excluded extensions cannot contain empty entries".to_string(),
            ));
        }

        if ext.starts_with('.') {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must be given without the leading dot",
                ext
            )));
        }

        if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ConfigError::Validation(format!(
                "excluded extension '{}' must be alphanumeric",
                ext
            )));
        }
    }

    Ok(())
}
