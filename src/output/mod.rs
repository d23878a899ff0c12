//! Output module for operator-facing reports
//!
//! This module handles:
//! - Rendering crawl summaries after a run
//! - Rendering storage statistics for `--stats`
//! - Rendering search results for `--search`

mod report;

pub use report::{format_crawl_summary, format_search_results, format_statistics};
