//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the crawling process, including:
//! - Opening the persisted logs and resuming from them
//! - Managing the breadth-first frontier
//! - Coordinating rate limiting, fetching and parsing
//! - Routing every anchor to the email log or the frontier
//! - Handling cancellation

use crate::config::{validate, validate_root_url, Config};
use crate::crawler::parser::{anchor_href, anchor_text, ParsedPage};
use crate::crawler::scheduler::{Frontier, FrontierEntry, RateLimiter};
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::email::{from_mailto, match_all, resolve_context, title_context};
use crate::output::{PageStats, RunSummary};
use crate::storage::{EmailRecord, LogStore, Storage};
use crate::url::{classify_link, is_in_scope, normalize, LinkKind};
use crate::HarvestError;
use reqwest::Client;
use scraper::ElementRef;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Config,
    root_url: String,
    store: LogStore,
    frontier: Frontier,
    limiter: RateLimiter,
    client: Client,
    cancel: CancellationToken,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Opens (or creates) the logs for `root_url` in the configured output
    /// directory and loads the previously visited URLs and recorded emails.
    ///
    /// # Arguments
    ///
    /// * `config` - The crawl configuration; rejected if it fails validation
    /// * `root_url` - The site to crawl; defines the crawl scope
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid configuration or root URL, unreadable logs, or HTTP client failure
    pub fn new(config: Config, root_url: &str) -> Result<Self, HarvestError> {
        validate(&config)?;
        let root_url = validate_root_url(root_url)?;
        let store = LogStore::open(&root_url, Path::new(&config.output.directory))?;
        let client = build_http_client(&config)?;
        let limiter = RateLimiter::new(config.crawler.requests_per_second);

        Ok(Self {
            config,
            root_url,
            store,
            frontier: Frontier::new(),
            limiter,
            client,
            cancel: CancellationToken::new(),
        })
    }

    /// A handle that stops the crawl when cancelled
    ///
    /// The crawl finishes the page it is processing, keeps everything already
    /// written to the logs and returns a summary marked as cancelled.
    ///
    /// URLs still queued at that point were written to the history log when
    /// they were discovered, so a later run treats them as visited and never
    /// fetches them.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// The normalized root URL
    pub fn root_url(&self) -> &str {
        &self.root_url
    }

    /// The persisted logs backing this crawl
    pub fn store(&self) -> &LogStore {
        &self.store
    }

    /// Runs the main crawl loop
    ///
    /// This is the core crawling logic that:
    /// 1. Seeds the frontier with the root URL
    /// 2. Takes the oldest URL from the frontier
    /// 3. Waits for the rate limiter, then fetches the page
    /// 4. Records new email addresses and queues new in-scope links
    /// 5. Repeats until the frontier is empty or the run is cancelled
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The crawl completed or was cancelled
    /// * `Err(HarvestError)` - The root URL could not be crawled, or a log write failed
    pub async fn run(&mut self) -> Result<RunSummary, HarvestError> {
        let start_time = Instant::now();
        let previously_visited = self.store.visited_count() as u64;
        let starting_emails = self.store.known_email_count() as u64;

        tracing::info!(
            "Starting crawl of {} with {} URLs already crawled and {} emails on record",
            self.root_url,
            previously_visited,
            starting_emails
        );

        let root = self.root_url.clone();
        self.store.record_visit(&root)?;
        self.frontier.push(FrontierEntry {
            url: root,
            remaining_depth: self.config.crawler.max_depth,
        });

        let mut pages_crawled = 0u64;
        let mut cancelled = false;
        let mut is_root = true;

        while let Some(entry) = self.frontier.pop() {
            if self.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let result = match self.fetch(&entry.url).await {
                Some(result) => result,
                None => {
                    cancelled = true;
                    break;
                }
            };

            if std::mem::replace(&mut is_root, false) {
                self.verify_root(&result)?;
            }

            match result {
                FetchResult::Page {
                    final_url,
                    status_code,
                    body,
                    ..
                } => {
                    if final_url != entry.url {
                        tracing::debug!("{} redirected to {}", entry.url, final_url);
                    }
                    if !(200..300).contains(&status_code) {
                        tracing::debug!("{} returned status {}", entry.url, status_code);
                    }

                    let stats = self.process_page(&entry, &body)?;
                    pages_crawled += 1;

                    tracing::info!(
                        "Completed crawling {} ({} levels from root): {}",
                        entry.url,
                        self.config.crawler.max_depth - entry.remaining_depth,
                        stats
                    );
                }

                FetchResult::ContentMismatch { content_type, .. } => {
                    tracing::warn!(
                        "Skipping {}: expected HTML, got '{}'",
                        entry.url,
                        content_type
                    );
                }

                FetchResult::NetworkError { error } => {
                    tracing::warn!("Request error for {}: {}", entry.url, error);
                }
            }
        }

        if cancelled {
            tracing::info!(
                "Crawl cancelled with {} URLs left in the frontier",
                self.frontier.len()
            );
        } else {
            tracing::info!("Frontier is empty, crawl complete");
        }

        let summary = RunSummary {
            new_urls_visited: self.store.visited_count() as u64 - previously_visited,
            previously_visited,
            pages_crawled,
            total_emails: self.store.email_count()?,
            new_emails: self.store.known_email_count() as u64 - starting_emails,
            elapsed: start_time.elapsed(),
            cancelled,
        };

        tracing::info!(
            "Crawl finished: {} pages crawled, {} new emails in {:?}",
            summary.pages_crawled,
            summary.new_emails,
            summary.elapsed
        );

        Ok(summary)
    }

    /// Waits for the rate limiter, then fetches a URL
    ///
    /// Returns None if the crawl was cancelled before the response arrived.
    async fn fetch(&mut self, url: &str) -> Option<FetchResult> {
        if !self.limiter.throttle(&self.cancel).await {
            return None;
        }

        tracing::debug!("Fetching {}", url);
        tokio::select! {
            _ = self.cancel.cancelled() => None,
            result = fetch_url(&self.client, url) => Some(result),
        }
    }

    /// Fails the run unless the root URL answered with a success status
    fn verify_root(&self, result: &FetchResult) -> Result<(), HarvestError> {
        match result {
            FetchResult::NetworkError { error } => Err(HarvestError::RootUnreachable {
                url: self.root_url.clone(),
                reason: error.clone(),
            }),
            FetchResult::Page {
                status_code,
                reason,
                ..
            }
            | FetchResult::ContentMismatch {
                status_code,
                reason,
                ..
            } if !result.is_success() => Err(HarvestError::RootStatus {
                url: self.root_url.clone(),
                status: *status_code,
                reason: reason.clone(),
            }),
            _ => Ok(()),
        }
    }

    /// Processes the body of a fetched HTML page
    ///
    /// The parsed document is confined to this synchronous call.
    fn process_page(
        &mut self,
        entry: &FrontierEntry,
        body: &str,
    ) -> Result<PageStats, HarvestError> {
        let page = ParsedPage::parse(body);
        let mut stats = PageStats::default();

        for anchor in page.anchors() {
            let href = match anchor_href(&anchor) {
                Some(href) => href,
                None => continue,
            };
            stats.total_links += 1;

            match classify_link(href) {
                LinkKind::Mailto => {
                    self.handle_mailto(anchor, href, page.title(), entry, &mut stats)?
                }
                LinkKind::Page => self.handle_page_link(href, entry, &mut stats)?,
                LinkKind::Fragment | LinkKind::PseudoProtocol => {
                    tracing::trace!("Ignoring link {} on {}", href, entry.url);
                }
            }
        }

        self.scan_text(&page, entry, &mut stats)?;

        Ok(stats)
    }

    /// Records the address behind a `mailto:` anchor
    fn handle_mailto(
        &mut self,
        anchor: ElementRef<'_>,
        href: &str,
        title: Option<&str>,
        entry: &FrontierEntry,
        stats: &mut PageStats,
    ) -> Result<(), HarvestError> {
        let email = match from_mailto(href) {
            Some(email) => email,
            None => {
                tracing::debug!("Empty mailto link on {}", entry.url);
                return Ok(());
            }
        };

        if self.store.is_known_email(&email) {
            tracing::debug!("Skipping existing email {}", email);
            stats.duplicate_emails += 1;
            return Ok(());
        }

        let record = EmailRecord {
            context: resolve_context(anchor, title, self.config.crawler.context_ancestor_depth),
            link_text: anchor_text(&anchor),
            source_url: entry.url.clone(),
            email,
        };

        if self.store.record_email(&record)? {
            tracing::info!("Found new email {} ({})", record.email, record.context);
            stats.new_emails += 1;
        }

        Ok(())
    }

    /// Queues a page link if it is new, in scope and within the depth ceiling
    fn handle_page_link(
        &mut self,
        href: &str,
        entry: &FrontierEntry,
        stats: &mut PageStats,
    ) -> Result<(), HarvestError> {
        let url = match normalize(href, &entry.url, &self.root_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Excluding {} on {}: {}", href, entry.url, e);
                stats.excluded_links += 1;
                return Ok(());
            }
        };

        if !is_in_scope(&url, &self.root_url, &self.config.exclusions.extensions) {
            tracing::debug!("Excluding out-of-scope URL {}", url);
            stats.excluded_links += 1;
            return Ok(());
        }

        if entry.remaining_depth == 0 {
            tracing::debug!("Depth ceiling reached, not following {}", url);
            stats.excluded_links += 1;
            return Ok(());
        }

        if self.store.is_visited(&url) {
            stats.prior_links += 1;
            return Ok(());
        }

        self.store.record_visit(&url)?;
        self.frontier.push(FrontierEntry {
            url,
            remaining_depth: entry.remaining_depth - 1,
        });
        stats.new_links += 1;

        Ok(())
    }

    /// Records addresses that appear in the visible text of a page
    fn scan_text(
        &mut self,
        page: &ParsedPage,
        entry: &FrontierEntry,
        stats: &mut PageStats,
    ) -> Result<(), HarvestError> {
        let found: BTreeSet<String> = page
            .text_fragments()
            .into_iter()
            .flat_map(match_all)
            .collect();

        for email in found {
            if self.store.is_known_email(&email) {
                continue;
            }

            let record = EmailRecord {
                link_text: email.clone(),
                context: title_context(page.title()),
                source_url: entry.url.clone(),
                email,
            };

            if self.store.record_email(&record)? {
                tracing::info!("Found new email {} in page text", record.email);
                stats.new_emails += 1;
            }
        }

        Ok(())
    }
}
