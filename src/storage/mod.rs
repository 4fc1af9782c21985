//! Storage module for persisting crawl progress
//!
//! This module handles the two append-only logs that double as the crawl's
//! output and its resume state:
//! - The history log of visited URLs
//! - The email log of recorded addresses with their context

mod log_store;
mod traits;

pub use log_store::{log_file_stem, log_paths, LogStore};
pub use traits::{Storage, StorageError, StorageResult};

/// One row of the email log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRecord {
    /// The address as found on the page
    pub email: String,
    /// Visible text of the link (the address itself for free-text finds)
    pub link_text: String,
    /// Short description derived from the surrounding page
    pub context: String,
    /// The page the address was found on
    pub source_url: String,
}
