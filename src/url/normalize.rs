/// Normalizes a URL into the canonical string used for dedup comparison
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything from `#`)
/// 2. Lowercase the whole string, path and query included
/// 3. Remove trailing slashes unless only `scheme://host/` would remain
///
/// This is not an RFC 3986 normalizer: there is no
/// percent-decoding and no query reordering. Lowercasing the path can merge
/// case-sensitive resources; visited-set and storage uniqueness both depend on
/// this exact form, so it must stay stable across runs.
///
/// # Arguments
///
/// * `url` - The URL to normalize, absolute or not
///
/// # Returns
///
/// The canonical string form. Normalizing twice gives the same result.
///
/// # Examples
///
/// ```
/// use tidecrawl::url::normalize_url;
///
/// assert_eq!(normalize_url("https://Example.com/Page/#top"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/"), "https://example.com/");
/// ```
pub fn normalize_url(url: &str) -> String {
    let without_fragment = match url.find('#') {
        Some(pos) => &url[..pos],
        None => url,
    };

    let mut normalized = without_fragment.to_lowercase();

    // Repeated stripping keeps normalize(normalize(u)) == normalize(u)
    while normalized.ends_with('/') && has_path_beyond_root(&normalized) {
        normalized.pop();
    }

    normalized
}

/// True when the first `/` after `scheme://` is not the final character
fn has_path_beyond_root(url: &str) -> bool {
    let Some(scheme_end) = url.find("://") else {
        return false;
    };

    match url[scheme_end + 3..].find('/') {
        Some(offset) => scheme_end + 3 + offset < url.len() - 1,
        None => false,
    }
}
