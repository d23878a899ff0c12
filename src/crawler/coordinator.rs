//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the per-site crawl loop and the run-level driver:
//! - Fetching robots.txt once per site
//! - Draining the site's breadth-first frontier within its page budget
//! - Coordinating fetching, extraction, validation and persistence
//! - Running several sites at once under a concurrency cap

use crate::config::{validate, Config, CrawlerConfig};
use crate::crawler::extractor::extract_page;
use crate::crawler::frontier::Frontier;
use crate::crawler::validator::check_page;
use crate::crawler::{build_http_client, fetch_url, FetchResult};
use crate::robots::fetch_policy;
use crate::state::{PolitenessRegistry, SiteState};
use crate::storage::{SaveOutcome, SqliteStorage, Storage};
use crate::url::{normalize_url, origin_of};
use crate::{CrawlError, Result};
use reqwest::Client;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, Semaphore};
use tokio::task::JoinSet;

/// Outcome of crawling one seed's site
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteReport {
    /// Seed URL the crawl started from
    pub seed: String,

    /// Entries counted against the page budget
    pub pages_crawled: u32,

    /// Pages newly written to storage
    pub pages_saved: u32,

    /// Pages whose URL was already stored when saved
    pub duplicates: u32,

    /// Pages turned away by the quality gate
    pub rejected: u32,

    /// Fetches that failed or returned an empty body
    pub fetch_failures: u32,

    /// Pages skipped because storage already held them
    pub already_stored: u32,

    /// Entries skipped because robots.txt disallows them
    pub robots_denied: u32,

    /// Storage operations that failed and were rolled back
    pub storage_failures: u32,
}

impl SiteReport {
    fn new(seed: &str) -> Self {
        Self {
            seed: seed.to_string(),
            ..Self::default()
        }
    }
}

/// Aggregate result of a crawl run
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    /// One report per completed site, in seed order
    pub reports: Vec<SiteReport>,

    /// Seeds whose crawl ended in an error
    pub failed_seeds: Vec<String>,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl CrawlSummary {
    /// Total pages counted against budgets across all sites
    pub fn pages_crawled(&self) -> u32 {
        self.reports.iter().map(|r| r.pages_crawled).sum()
    }

    /// Total pages newly persisted across all sites
    pub fn pages_saved(&self) -> u32 {
        self.reports.iter().map(|r| r.pages_saved).sum()
    }

    /// Total pages rejected by the quality gate across all sites
    pub fn pages_rejected(&self) -> u32 {
        self.reports.iter().map(|r| r.rejected).sum()
    }
}

/// Crawls a single site from its seed URL
///
/// Each instance owns its robots policy, frontier and visited set. The storage
/// handle, HTTP client and politeness registry are shared, so crawls of seeds
/// on the same origin are spaced against each other.
pub struct SiteCrawler {
    seed: String,
    client: Client,
    storage: Arc<Mutex<SqliteStorage>>,
    politeness: PolitenessRegistry,
    settings: CrawlerConfig,
    state: SiteState,
}

impl SiteCrawler {
    /// Creates an idle crawler for `seed`
    pub fn new(
        seed: impl Into<String>,
        client: Client,
        storage: Arc<Mutex<SqliteStorage>>,
        settings: CrawlerConfig,
    ) -> Self {
        Self {
            seed: seed.into(),
            client,
            storage,
            politeness: PolitenessRegistry::new(),
            settings,
            state: SiteState::Idle,
        }
    }

    /// Uses `registry` for request spacing instead of a private one
    pub fn with_politeness(mut self, registry: PolitenessRegistry) -> Self {
        self.politeness = registry;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> SiteState {
        self.state
    }

    /// Runs the crawl to completion and returns its report
    ///
    /// Transport failures, rejected pages and storage failures on individual
    /// pages are logged and counted; they never end the crawl early.
    pub async fn run(&mut self) -> Result<SiteReport> {
        let mut report = SiteReport::new(&self.seed);
        let start_time = Instant::now();

        self.state.transition(SiteState::FetchingRobots)?;
        let policy = fetch_policy(&self.client, &self.seed).await;
        let origin = origin_of(&self.seed).unwrap_or_else(|| self.seed.clone());
        let clock = self
            .politeness
            .clock_for(
                &origin,
                policy.crawl_delay_millis,
                self.settings.minimum_delay_ms,
            )
            .await;
        let delay = clock.lock().await.delay;

        self.state.transition(SiteState::DrainingQueue)?;
        let Some(mut frontier) = Frontier::new(&self.seed, self.settings.depth_limit()) else {
            tracing::warn!("Seed {} has no host, skipping site", self.seed);
            self.state.transition(SiteState::Done)?;
            return Ok(report);
        };

        tracing::info!(
            "Crawling {} (scope: {}, budget: {} pages, delay: {:?})",
            self.seed,
            frontier.scope_domain(),
            self.settings.max_pages_per_site,
            delay
        );

        while report.pages_crawled < self.settings.max_pages_per_site {
            let Some(entry) = frontier.pop() else {
                tracing::debug!("Frontier for {} is empty", self.seed);
                break;
            };

            let canonical = normalize_url(&entry.url);
            if frontier.is_visited(&canonical) {
                continue;
            }

            if !policy.is_allowed(&entry.url) {
                tracing::debug!("URL {} disallowed by robots.txt", entry.url);
                report.robots_denied += 1;
                continue;
            }

            frontier.mark_visited(&canonical);
            report.pages_crawled += 1;

            let exists = self.storage.lock().await.page_exists(&canonical);
            match exists {
                Ok(true) => {
                    tracing::debug!("Already stored, skipping: {}", canonical);
                    report.already_stored += 1;
                    continue;
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::error!("Storage lookup failed for {}: {}", canonical, e);
                    report.storage_failures += 1;
                    continue;
                }
            }

            clock.lock().await.wait_turn().await;

            let body = match fetch_url(&self.client, &entry.url).await {
                FetchResult::Success {
                    final_url,
                    status_code,
                    body,
                } if !body.trim().is_empty() => {
                    if final_url != entry.url {
                        tracing::debug!(
                            "{} redirected to {} (HTTP {})",
                            entry.url,
                            final_url,
                            status_code
                        );
                    }
                    body
                }
                FetchResult::Success { .. } => {
                    tracing::warn!("Empty response from {}", entry.url);
                    report.fetch_failures += 1;
                    continue;
                }
                FetchResult::HttpError { status_code } => {
                    tracing::warn!("HTTP {} from {}", status_code, entry.url);
                    report.fetch_failures += 1;
                    continue;
                }
                FetchResult::NetworkError { error } => {
                    tracing::warn!("Failed to fetch {}: {}", entry.url, error);
                    report.fetch_failures += 1;
                    continue;
                }
            };

            let record = extract_page(&body, &entry.url);

            if let Err(reason) = check_page(&record) {
                tracing::warn!("Rejected {} ({:?}): {:?}", entry.url, reason, record.title);
                report.rejected += 1;
                continue;
            }

            let outcome = self.storage.lock().await.save_page(&record);
            match outcome {
                Ok(SaveOutcome::Inserted(page_id)) => {
                    tracing::info!(
                        "Saved page {} [{}] depth {}: {}",
                        page_id,
                        record.url,
                        entry.depth,
                        record.title
                    );
                    report.pages_saved += 1;
                }
                Ok(SaveOutcome::Duplicate) => {
                    tracing::debug!("Duplicate page not saved: {}", record.url);
                    report.duplicates += 1;
                }
                Err(e) => {
                    tracing::error!("Failed to save {}: {}", record.url, e);
                    report.storage_failures += 1;
                }
            }

            let queued = frontier.enqueue_links(&record.outgoing_links, entry.depth);
            tracing::debug!("Queued {} links from {}", queued, entry.url);

            if report.pages_crawled % 10 == 0 {
                tracing::info!(
                    "Progress on {}: {} pages crawled, {} in frontier",
                    frontier.scope_domain(),
                    report.pages_crawled,
                    frontier.len()
                );
            }
        }

        self.state.transition(SiteState::Done)?;

        tracing::info!(
            "Finished {}: {} crawled, {} saved, {} rejected, {} failed in {:?}",
            self.seed,
            report.pages_crawled,
            report.pages_saved,
            report.rejected,
            report.fetch_failures,
            start_time.elapsed()
        );

        Ok(report)
    }
}

/// Runs the main crawl operation
///
/// Opens the database at the configured path and crawls every seed. Failing
/// to open or initialize the database aborts the run.
///
/// # Arguments
///
/// * `config` - The validated run configuration
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Per-site reports in seed order
/// * `Err(CrawlError)` - The store could not be opened or the configuration is invalid
///
/// # Example
///
/// ```no_run
/// use tidecrawl::config::load_config;
/// use tidecrawl::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("config.toml"))?;
/// let summary = run_crawl(config).await?;
/// println!("{} pages saved", summary.pages_saved());
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: Config) -> Result<CrawlSummary> {
    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    crawl_with_storage(&config, Arc::new(Mutex::new(storage))).await
}

/// Crawls every configured seed against an already opened store
///
/// At most `max-concurrent-sites` sites are in flight at once, and seeds that
/// share an origin share one politeness clock. A site whose crawl fails is
/// recorded in [`CrawlSummary::failed_seeds`]; the remaining sites still run.
///
/// # Arguments
///
/// * `config` - The run configuration; it is validated before anything starts
/// * `storage` - The opened store every site writes to
///
/// # Returns
///
/// The per-site reports in seed order, or an error if the configuration is
/// invalid or the HTTP client cannot be built.
pub async fn crawl_with_storage(
    config: &Config,
    storage: Arc<Mutex<SqliteStorage>>,
) -> Result<CrawlSummary> {
    validate(config)?;

    let start_time = Instant::now();
    let client = build_http_client(&config.user_agent)?;
    let semaphore = Arc::new(Semaphore::new(config.crawler.max_concurrent_sites as usize));
    let politeness = PolitenessRegistry::new();
    let mut tasks = JoinSet::new();

    tracing::info!(
        "Starting crawl of {} seeds ({} at a time)",
        config.seeds.len(),
        config.crawler.max_concurrent_sites
    );

    for (index, seed) in config.seeds.iter().enumerate() {
        let semaphore = Arc::clone(&semaphore);
        let mut crawler = SiteCrawler::new(
            seed.clone(),
            client.clone(),
            Arc::clone(&storage),
            config.crawler.clone(),
        )
        .with_politeness(politeness.clone());

        tasks.spawn(async move {
            let result = match semaphore.acquire_owned().await {
                Ok(_permit) => crawler.run().await,
                Err(e) => Err(CrawlError::Task(e.to_string())),
            };
            (index, result)
        });
    }

    let mut reports = Vec::new();
    let mut failed = Vec::new();

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, Ok(report))) => reports.push((index, report)),
            Ok((index, Err(e))) => {
                tracing::error!("Crawl of {} failed: {}", config.seeds[index], e);
                failed.push(index);
            }
            Err(e) => {
                tracing::error!("Site task aborted: {}", e);
            }
        }
    }

    reports.sort_by_key(|(index, _)| *index);
    failed.sort_unstable();

    let summary = CrawlSummary {
        reports: reports.into_iter().map(|(_, report)| report).collect(),
        failed_seeds: failed
            .into_iter()
            .map(|index| config.seeds[index].clone())
            .collect(),
        elapsed: start_time.elapsed(),
    };

    tracing::info!(
        "Crawl completed: {} pages crawled, {} saved across {} sites in {:?}",
        summary.pages_crawled(),
        summary.pages_saved(),
        summary.reports.len(),
        summary.elapsed
    );

    Ok(summary)
}
