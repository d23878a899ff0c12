//! Tidecrawl: a domain-scoped search crawler
//!
//! This crate crawls one site per seed URL in breadth-first order, respecting
//! robots.txt, extracts structured content from every page, filters out
//! low-quality pages and stores the rest in SQLite alongside an FTS5 index.

pub mod config;
pub mod crawler;
pub mod document;
pub mod output;
pub mod robots;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Tidecrawl operations
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid site state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::SiteState,
        to: state::SiteState,
    },

    #[error("Crawl task failed: {0}")]
    Task(String),
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

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Tidecrawl operations
pub type Result<T> = std::result::Result<T, CrawlError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlSummary, PageRecord, SiteReport};
pub use state::SiteState;
pub use url::{normalize_url, registrable_domain};
