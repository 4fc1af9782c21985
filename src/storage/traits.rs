//! Storage traits and error types
//!
//! This module defines the trait interface for the persisted crawl state and
//! associated error types.

use crate::storage::EmailRecord;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error on {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("Log {path} is missing its '{column}' column")]
    MissingColumn { path: String, column: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for the persisted crawl state
///
/// The state is two append-only logs: the URLs already visited and the
/// email addresses already recorded. Keys are compared lower-cased, and a
/// key that is already known is never written twice.
pub trait Storage {
    // ===== Visited URLs =====

    /// Records a URL as visited
    ///
    /// # Arguments
    ///
    /// * `url` - The normalized URL
    ///
    /// # Returns
    ///
    /// `true` if a row was appended, `false` if the URL was already known
    fn record_visit(&mut self, url: &str) -> StorageResult<bool>;

    /// Checks whether a URL was visited in this or an earlier run
    fn is_visited(&self, url: &str) -> bool;

    /// Number of distinct URLs known to be visited
    fn visited_count(&self) -> usize;

    // ===== Email Addresses =====

    /// Records an email address with its link text, context and source page
    ///
    /// # Returns
    ///
    /// `true` if a row was appended, `false` if the address was already known
    fn record_email(&mut self, record: &EmailRecord) -> StorageResult<bool>;

    /// Checks whether an address was recorded in this or an earlier run
    fn is_known_email(&self, email: &str) -> bool;

    /// Number of distinct addresses held in memory
    fn known_email_count(&self) -> usize;

    /// Number of rows in the persisted email log, read from disk
    fn email_count(&self) -> StorageResult<u64>;
}
