//! Configuration module for Email-Harvester
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file and merging command-line overrides into it.
//!
//! # Example
//!
//! ```no_run
//! use email_harvester::config::{resolve_config, ConfigOverrides};
//! use std::path::Path;
//!
//! let overrides = ConfigOverrides::default();
//! let config = resolve_config(Some(Path::new("harvester.toml")), &overrides).unwrap();
//! println!("Crawler will use max depth: {}", config.crawler.max_depth);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, ExclusionConfig, OutputConfig, UserAgentConfig,
    DEFAULT_EXCLUDED_EXTENSIONS,
};

// Re-export parser functions
pub use parser::{resolve_config, ConfigOverrides};
pub use validation::{validate, validate_root_url};
