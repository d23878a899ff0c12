//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with bounded redirects and timeouts
//! - Structured content extraction and the page quality gate
//! - The per-site breadth-first frontier
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod fetcher;
mod frontier;
mod validator;

pub use coordinator::{crawl_with_storage, run_crawl, CrawlSummary, SiteCrawler, SiteReport};
pub use extractor::{extract, extract_page, is_valid_image_url, PageRecord};
pub use fetcher::{build_http_client, fetch_url, FetchResult};
pub use frontier::{Frontier, FrontierEntry};
pub use validator::{check_page, is_acceptable, Rejection};
