use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub max_depth: Option<u32>,
    pub requests_per_second: Option<f64>,
    pub output_directory: Option<String>,
}

/// Builds the effective configuration for a run
///
/// Starts from the file at `path` (or the built-in defaults when no file is
/// given), applies the command-line overrides and validates the result.
///
/// # Arguments
///
/// * `path` - Optional path to a TOML configuration file
/// * `overrides` - Values supplied on the command line
///
/// # Returns
///
/// * `Ok(Config)` - The validated configuration
/// * `Err(ConfigError)` - Failed to load the file or the merged values are invalid
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use email_harvester::config::{resolve_config, ConfigOverrides};
///
/// let config = resolve_config(Some(Path::new("harvester.toml")), &ConfigOverrides::default()).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn resolve_config(
    path: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<Config, ConfigError> {
    let mut config = match path {
        Some(path) => read_config_file(path)?,
        None => Config::default(),
    };

    if let Some(depth) = overrides.max_depth {
        config.crawler.max_depth = depth;
    }
    if let Some(rate) = overrides.requests_per_second {
        config.crawler.requests_per_second = rate;
    }
    if let Some(dir) = &overrides.output_directory {
        config.output.directory = dir.clone();
    }

    validate(&config)?;
    Ok(config)
}

/// Reads and parses a TOML configuration file without validating it
fn read_config_file(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
