//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::crawler::PageRecord;
use crate::storage::{ImageHit, SaveOutcome, SearchHit, StorageStats};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Page not found: {0}")]
    PageNotFound(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Every page mutation runs inside a single transaction together with its
/// full-text index mutation; a failure rolls back the whole unit.
pub trait Storage {
    // ===== Page Management =====

    /// Persists a page with its images, tags and outgoing links
    ///
    /// A page whose URL is already stored is left untouched and reported as
    /// [`SaveOutcome::Duplicate`].
    fn save_page(&mut self, record: &PageRecord) -> StorageResult<SaveOutcome>;

    /// Checks whether a page with exactly this (normalized) URL is stored
    fn page_exists(&self, url: &str) -> StorageResult<bool>;

    /// Rewrites the searchable text of a stored page
    fn update_page(
        &mut self,
        url: &str,
        title: &str,
        description: &str,
        content: &str,
    ) -> StorageResult<()>;

    /// Removes a page together with its images, tags and links
    fn delete_page(&mut self, url: &str) -> StorageResult<()>;

    // ===== Search =====

    /// Full-text search over stored pages, best matches first
    fn search(&self, query: &str, limit: usize) -> StorageResult<Vec<SearchHit>>;

    /// Images attached to pages matching `query`, best matches first
    fn search_images(&self, query: &str, limit: usize) -> StorageResult<Vec<ImageHit>>;

    // ===== Statistics =====

    /// Row counts for every table, including the full-text index
    fn stats(&self) -> StorageResult<StorageStats>;
}
