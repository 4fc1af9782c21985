//! Output module for crawl summaries and reports
//!
//! This module handles:
//! - Per-page link and email counters
//! - The end-of-run summary
//! - Statistics read back from the persisted logs

pub mod stats;

pub use stats::{
    format_duration, load_statistics, print_run_summary, print_statistics, LogStatistics,
    PageStats, RunSummary,
};
