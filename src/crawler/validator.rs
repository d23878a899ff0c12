//! Page quality gate applied before persistence

use crate::crawler::PageRecord;

/// Title fragments of bot-challenge and error pages
const BLOCKED_TITLE_SIGNATURES: &[&str] = &[
    "Just a moment",
    "Attention Required",
    "Please verify you are human",
    "Access denied",
    "403 Forbidden",
    "404 Not Found",
];

/// Text that shows up when client-side script leaks into extracted content
const SCRIPT_LEAKAGE_MARKERS: &[&str] = &[
    "window.ytcsi",
    "document.getElementById",
    "addEventListener",
    "var ",
    "const ",
];

const MIN_CONTENT_CHARS: usize = 20;
const MAX_SCRIPT_MARKERS: usize = 4;

/// Reason a page was turned away
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    BlockedTitle,
    EmptyTitle,
    ThinContent,
    ScriptLeakage,
}

/// Checks a record against the quality rules
///
/// Every rule is independent; the first failing one is reported.
///
/// # Arguments
///
/// * `record` - The extracted page
///
/// # Returns
///
/// * `Ok(())` - The page may be stored
/// * `Err(Rejection)` - The first quality rule the page failed
pub fn check_page(record: &PageRecord) -> Result<(), Rejection> {
    if BLOCKED_TITLE_SIGNATURES
        .iter()
        .any(|signature| record.title.contains(signature))
    {
        return Err(Rejection::BlockedTitle);
    }

    if record.main_content.chars().count() < MIN_CONTENT_CHARS {
        return Err(Rejection::ThinContent);
    }

    if record.title.is_empty() {
        return Err(Rejection::EmptyTitle);
    }

    let markers = SCRIPT_LEAKAGE_MARKERS
        .iter()
        .filter(|marker| record.main_content.contains(*marker))
        .count();
    if markers >= MAX_SCRIPT_MARKERS {
        return Err(Rejection::ScriptLeakage);
    }

    Ok(())
}

/// Returns true when the record is worth persisting
pub fn is_acceptable(record: &PageRecord) -> bool {
    check_page(record).is_ok()
}
