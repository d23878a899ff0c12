//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::PageRecord;
use crate::storage::schema::initialize_schema;
use crate::storage::search::match_expression;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{ImageHit, SaveOutcome, SearchHit, StorageStats};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Title ranking shared by page and image search; `?1` is the trimmed,
/// lower-cased query text
const TITLE_PRIORITY_SQL: &str = "
    CASE
        WHEN LOWER(TRIM(p.title)) = ?1 THEN 1
        WHEN LOWER(TRIM(p.title)) LIKE ?1 || ' - %' THEN 2
        WHEN LOWER(p.title) LIKE ?1 || '%' THEN 3
        WHEN LOWER(p.title) LIKE '%' || ?1 || '%' THEN 4
        ELSE 5
    END";

const IMAGE_FORMAT_PRIORITY_SQL: &str = "
    CASE
        WHEN LOWER(i.image_url) LIKE '%.jpg%' THEN 1
        WHEN LOWER(i.image_url) LIKE '%.jpeg%' THEN 2
        WHEN LOWER(i.image_url) LIKE '%.png%' THEN 3
        WHEN LOWER(i.image_url) LIKE '%.webp%' THEN 4
        ELSE 5
    END";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// Opens (or creates) the database file and ensures the schema, index and
    /// triggers exist.
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn count_rows(&self, table: &str) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }
}

impl Storage for SqliteStorage {
    // ===== Page Management =====

    fn save_page(&mut self, record: &PageRecord) -> StorageResult<SaveOutcome> {
        let tx = self.conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO pages
             (url, title, description, content, raw_markup, favicon, crawled_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.url,
                record.title,
                record.description,
                record.main_content,
                record.raw_markup,
                record.favicon,
                Utc::now().to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            tx.commit()?;
            return Ok(SaveOutcome::Duplicate);
        }

        let page_id = tx.last_insert_rowid();

        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO images (page_id, image_url) VALUES (?1, ?2)")?;
            for image in &record.images {
                stmt.execute(params![page_id, image])?;
            }
        }

        {
            let mut stmt = tx.prepare_cached("INSERT INTO tags (page_id, tag) VALUES (?1, ?2)")?;
            for tag in &record.tags {
                stmt.execute(params![page_id, tag])?;
            }
        }

        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO links (source_page_id, target_url) VALUES (?1, ?2)",
            )?;
            for link in &record.outgoing_links {
                stmt.execute(params![page_id, link])?;
            }
        }

        tx.commit()?;
        Ok(SaveOutcome::Inserted(page_id))
    }

    fn page_exists(&self, url: &str) -> StorageResult<bool> {
        let found = self
            .conn
            .query_row("SELECT 1 FROM pages WHERE url = ?1", params![url], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn update_page(
        &mut self,
        url: &str,
        title: &str,
        description: &str,
        content: &str,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE pages SET title = ?1, description = ?2, content = ?3 WHERE url = ?4",
            params![title, description, content, url],
        )?;

        if updated == 0 {
            return Err(StorageError::PageNotFound(url.to_string()));
        }

        tx.commit()?;
        Ok(())
    }

    fn delete_page(&mut self, url: &str) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        let deleted = tx.execute("DELETE FROM pages WHERE url = ?1", params![url])?;

        if deleted == 0 {
            return Err(StorageError::PageNotFound(url.to_string()));
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Search =====

    fn search(&self, query: &str, limit: usize) -> StorageResult<Vec<SearchHit>> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT p.id, p.url, COALESCE(p.title, ''), COALESCE(p.description, ''),
                    COALESCE(p.favicon, ''),
                    {} AS title_priority,
                    LENGTH(p.title) AS title_length,
                    bm25(pages_fts) AS score
             FROM pages_fts
             INNER JOIN pages p ON pages_fts.rowid = p.id
             WHERE pages_fts MATCH ?2
             ORDER BY title_priority ASC, title_length ASC, score ASC
             LIMIT ?3",
            TITLE_PRIORITY_SQL
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map(
                params![query.trim().to_lowercase(), expression, limit as i64],
                |row| {
                    Ok(SearchHit {
                        id: row.get(0)?,
                        url: row.get(1)?,
                        title: row.get(2)?,
                        description: row.get(3)?,
                        favicon: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    fn search_images(&self, query: &str, limit: usize) -> StorageResult<Vec<ImageHit>> {
        let Some(expression) = match_expression(query) else {
            return Ok(Vec::new());
        };

        let sql = format!(
            "SELECT DISTINCT i.image_url, p.url, COALESCE(p.title, ''),
                    {} AS title_priority,
                    {} AS image_format_priority,
                    LENGTH(p.title) AS title_length,
                    bm25(pages_fts) AS score
             FROM pages_fts
             INNER JOIN pages p ON pages_fts.rowid = p.id
             INNER JOIN images i ON i.page_id = p.id
             WHERE pages_fts MATCH ?2
             ORDER BY title_priority ASC, image_format_priority ASC, title_length ASC, score ASC
             LIMIT ?3",
            TITLE_PRIORITY_SQL, IMAGE_FORMAT_PRIORITY_SQL
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let hits = stmt
            .query_map(
                params![query.trim().to_lowercase(), expression, limit as i64],
                |row| {
                    Ok(ImageHit {
                        image_url: row.get(0)?,
                        page_url: row.get(1)?,
                        page_title: row.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(hits)
    }

    // ===== Statistics =====

    fn stats(&self) -> StorageResult<StorageStats> {
        Ok(StorageStats {
            pages: self.count_rows("pages")?,
            images: self.count_rows("images")?,
            tags: self.count_rows("tags")?,
            links: self.count_rows("links")?,
            indexed: self.count_rows("pages_fts_docsize")?,
        })
    }
}
