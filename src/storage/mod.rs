//! Storage module for persisting crawl data
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Transactional page persistence with images, tags and links
//! - Full-text index maintenance and search
//! - Summary statistics

mod schema;
mod search;
mod sqlite;
mod traits;

pub use search::match_expression;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - An open store with schema, index and triggers in place
/// * `Err(StorageError)` - The file could not be opened or initialized
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Outcome of persisting a page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The page was new; carries the assigned page id
    Inserted(i64),

    /// A page with the same URL was already stored; nothing changed
    Duplicate,
}

/// A page returned by full-text search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub description: String,
    pub favicon: String,
}

/// An image returned by image search, with the page it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHit {
    pub image_url: String,
    pub page_url: String,
    pub page_title: String,
}

/// Row counts across the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StorageStats {
    pub pages: u64,
    pub images: u64,
    pub tags: u64,
    pub links: u64,
    /// Documents in the full-text index; equals `pages` when in sync
    pub indexed: u64,
}

impl StorageStats {
    /// Returns true when the full-text index matches the pages table
    pub fn index_in_sync(&self) -> bool {
        self.pages == self.indexed
    }
}
