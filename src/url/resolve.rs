//! Href resolution rules shared by link, favicon and image extraction

use crate::url::domain::{origin_of, scheme_of};

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "javascript:", "tel:"];

/// Resolves an anchor href found on `page_url` into an absolute URL
///
/// Returns `None` when the link should not be followed:
/// - empty or fragment-only (`#...`) hrefs
/// - `mailto:`, `javascript:` and `tel:` targets
/// - relative paths without a leading slash that are not already absolute
///
/// Root-relative hrefs (`/path`) resolve against the page's origin and
/// protocol-relative hrefs (`//host/path`) take the page's scheme.
///
/// # Arguments
///
/// * `href` - The raw `href` attribute value
/// * `page_url` - URL of the page the anchor appears on
///
/// # Returns
///
/// * `Some(String)` - The absolute link
/// * `None` - The link should not be followed
pub fn resolve_link(href: &str, page_url: &str) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if SKIPPED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    if href.starts_with("//") {
        let scheme = scheme_of(page_url)?;
        return Some(format!("{}:{}", scheme, href));
    }

    if href.starts_with('/') {
        let origin = origin_of(page_url)?;
        return Some(format!("{}{}", origin, href));
    }

    if lower.starts_with("http") {
        return Some(href.to_string());
    }

    None
}

/// Resolves an asset reference (favicon href, image src) into an absolute URL
///
/// Same rules as [`resolve_link`], except that site-relative paths without a
/// leading slash resolve to `<origin>/<path>` instead of being dropped.
///
/// # Arguments
///
/// * `src` - The raw `src` or `href` of the asset
/// * `page_url` - URL of the page referencing the asset
///
/// # Returns
///
/// * `Some(String)` - The absolute asset URL
/// * `None` - The reference is empty or the page URL has no origin
pub fn resolve_asset(src: &str, page_url: &str) -> Option<String> {
    let src = src.trim();

    if src.is_empty() || src.to_ascii_lowercase().starts_with("data:") {
        return None;
    }

    if src.starts_with("//") {
        let scheme = scheme_of(page_url)?;
        return Some(format!("{}:{}", scheme, src));
    }

    if src.starts_with('/') {
        let origin = origin_of(page_url)?;
        return Some(format!("{}{}", origin, src));
    }

    if src.to_ascii_lowercase().starts_with("http") {
        return Some(src.to_string());
    }

    let origin = origin_of(page_url)?;
    Some(format!("{}/{}", origin, src))
}
