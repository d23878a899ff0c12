use crate::crawler::CrawlSummary;
use crate::storage::{ImageHit, SearchHit, StorageStats};
use std::fmt::Write;

/// Renders storage statistics
pub fn format_statistics(stats: &StorageStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Storage Statistics ===\n");
    let _ = writeln!(out, "  Pages: {}", stats.pages);
    let _ = writeln!(out, "  Images: {}", stats.images);
    let _ = writeln!(out, "  Tags: {}", stats.tags);
    let _ = writeln!(out, "  Links: {}", stats.links);
    let _ = writeln!(out, "  Indexed documents: {}", stats.indexed);

    if !stats.index_in_sync() {
        let _ = writeln!(
            out,
            "\n  WARNING: full-text index holds {} documents for {} pages",
            stats.indexed, stats.pages
        );
    }

    out
}

/// Renders the per-site breakdown of a finished crawl
pub fn format_crawl_summary(summary: &CrawlSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== Crawl Summary ===\n");

    for report in &summary.reports {
        let _ = writeln!(out, "{}", report.seed);
        let _ = writeln!(
            out,
            "  crawled: {}, saved: {}, duplicates: {}, already stored: {}",
            report.pages_crawled, report.pages_saved, report.duplicates, report.already_stored
        );
        let _ = writeln!(
            out,
            "  rejected: {}, fetch failures: {}, robots denied: {}, storage failures: {}",
            report.rejected, report.fetch_failures, report.robots_denied, report.storage_failures
        );
    }

    for seed in &summary.failed_seeds {
        let _ = writeln!(out, "{}\n  FAILED", seed);
    }

    let _ = writeln!(
        out,
        "\nTotal: {} pages crawled, {} saved in {:.1}s",
        summary.pages_crawled(),
        summary.pages_saved(),
        summary.elapsed.as_secs_f64()
    );

    out
}

/// Renders page and image search hits
///
/// # Arguments
///
/// * `query` - The query as typed
/// * `pages` - Page hits, best first
/// * `images` - Image hits, best first
///
/// # Returns
///
/// The rendered text, ending with a newline.
pub fn format_search_results(query: &str, pages: &[SearchHit], images: &[ImageHit]) -> String {
    let mut out = String::new();

    if pages.is_empty() {
        let _ = writeln!(out, "No results for \"{}\"", query);
        return out;
    }

    let _ = writeln!(out, "Results for \"{}\":\n", query);
    for (rank, hit) in pages.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", rank + 1, hit.title);
        let _ = writeln!(out, "    {}", hit.url);
        if !hit.description.is_empty() {
            let _ = writeln!(out, "    {}", hit.description);
        }
    }

    if !images.is_empty() {
        let _ = writeln!(out, "\nImages:");
        for image in images {
            let _ = writeln!(out, "  {} (from {})", image.image_url, image.page_url);
        }
    }

    out
}
