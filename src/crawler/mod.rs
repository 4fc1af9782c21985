//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with content-type gating
//! - HTML parsing for anchors, title and visible text
//! - The breadth-first frontier and rate limiting
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use parser::{anchor_href, anchor_text, ParsedPage};
pub use scheduler::{Frontier, FrontierEntry, RateLimiter};

pub use crate::output::RunSummary;
