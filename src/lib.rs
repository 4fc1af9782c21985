//! Email-Harvester: a resumable single-site email crawler
//!
//! This crate implements a breadth-first crawler that walks one website,
//! records every email address it finds together with a short context
//! snippet, and keeps append-only logs so repeated runs continue where the
//! previous one stopped.

pub mod config;
pub mod crawler;
pub mod email;
pub mod output;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Email-Harvester operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unable to reach {url}: {reason}")]
    RootUnreachable { url: String, reason: String },

    #[error("Unable to crawl {url} - {status} {reason}")]
    RootStatus {
        url: String,
        status: u16,
        reason: String,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid root URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Empty link")]
    Empty,
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, RunSummary};
pub use email::{from_mailto, match_all};
pub use storage::LogStore;
pub use url::{is_in_scope, normalize};
