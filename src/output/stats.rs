//! Statistics for a crawl and for the persisted logs
//!
//! This module provides the per-page link and email counters, the
//! end-of-run summary, and the `--stats` view computed from the logs.

use crate::storage::{Storage, StorageResult};
use std::fmt;
use std::time::Duration;

/// Link and email counters for a single page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageStats {
    /// Every anchor with an `href`
    pub total_links: u64,

    /// Links queued for the first time
    pub new_links: u64,

    /// Links already visited in this or an earlier run
    pub prior_links: u64,

    /// Links rejected by normalization, scope, extension or depth
    pub excluded_links: u64,

    /// Addresses recorded for the first time
    pub new_emails: u64,

    /// `mailto:` addresses that were already on record
    pub duplicate_emails: u64,
}

impl fmt::Display for PageStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} total links, {} newly discovered, {} already crawled, {} excluded, \
             {} new emails found, {} existing emails skipped",
            self.total_links,
            self.new_links,
            self.prior_links,
            self.excluded_links,
            self.new_emails,
            self.duplicate_emails
        )
    }
}

/// Outcome of a crawl run
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// URLs recorded as visited during this run
    pub new_urls_visited: u64,

    /// URLs already in the history log when the run started
    pub previously_visited: u64,

    /// Pages fetched and parsed during this run
    pub pages_crawled: u64,

    /// Rows in the email log after the run, read from disk
    pub total_emails: u64,

    /// Addresses recorded during this run
    pub new_emails: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,

    /// Whether the run stopped early on cancellation
    pub cancelled: bool,
}

/// Formats a duration as days, hours, minutes and seconds
///
/// # Examples
///
/// ```
/// use email_harvester::output::format_duration;
/// use std::time::Duration;
///
/// assert_eq!(
///     format_duration(Duration::from_secs(90_061)),
///     "1 days, 1 hrs, 1 mins and 1 secs"
/// );
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    format!(
        "{} days, {} hrs, {} mins and {} secs",
        days, hours, minutes, seconds
    )
}

/// Prints the end-of-run summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    if summary.cancelled {
        println!("Crawl cancelled; progress so far is saved.");
    }
    println!("-----------------------------------");
    println!("Crawled {} new URLs", summary.new_urls_visited);
    println!("{} URLs were crawled previously", summary.previously_visited);
    println!(
        "Found {} emails ({} new this run)",
        summary.total_emails, summary.new_emails
    );
    println!("Duration: {}", format_duration(summary.elapsed));
    println!("-----------------------------------");
}

/// Counts held in the persisted logs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStatistics {
    /// Distinct URLs in the history log
    pub visited_urls: u64,

    /// Distinct addresses in the email log
    pub known_emails: u64,

    /// Rows in the email log
    pub email_rows: u64,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(LogStatistics)` - Successfully loaded statistics
/// * `Err(StorageError)` - Failed to read the email log
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<LogStatistics> {
    Ok(LogStatistics {
        visited_urls: storage.visited_count() as u64,
        known_emails: storage.known_email_count() as u64,
        email_rows: storage.email_count()?,
    })
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &LogStatistics) {
    println!("=== Harvest Statistics ===\n");
    println!("  URLs visited: {}", stats.visited_urls);
    println!("  Email addresses: {}", stats.known_emails);
    println!("  Email log rows: {}", stats.email_rows);

    let per_page = if stats.visited_urls > 0 {
        stats.known_emails as f64 / stats.visited_urls as f64
    } else {
        0.0
    };
    println!("  Addresses per visited URL: {:.2}", per_page);
}
