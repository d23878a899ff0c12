//! Robots policy and allow/deny matching

use std::collections::BTreeSet;

/// Rules derived from a site's robots.txt for the `User-agent: *` group
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RobotsPolicy {
    /// Path prefixes (optionally ending in `*`) the crawler must not fetch
    pub disallowed_patterns: BTreeSet<String>,

    /// Path prefixes that are always allowed; these win over any disallow
    pub allowed_patterns: BTreeSet<String>,

    /// Crawl delay requested by the site, in milliseconds
    pub crawl_delay_millis: u64,

    /// Set when the site has no usable robots.txt; everything is allowed
    pub allow_all: bool,
}

impl RobotsPolicy {
    /// Creates a permissive policy that allows everything
    ///
    /// Used whenever robots.txt is missing, empty, or could not be fetched.
    pub fn allow_all() -> Self {
        Self {
            allow_all: true,
            ..Self::default()
        }
    }

    /// Checks if a URL may be fetched under this policy
    ///
    /// An allow pattern match short-circuits to allowed regardless of how
    /// specific the competing disallow pattern is. Plain disallow patterns match
    /// on the exact path, or as a prefix followed by `/`, `?` or end of path, so
    /// `/foo` does not block `/foobar`.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL about to be fetched, not normalized
    ///
    /// # Returns
    ///
    /// `true` if no rule forbids the path, `false` otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use tidecrawl::robots::RobotsPolicy;
    ///
    /// let policy = RobotsPolicy::parse("User-agent: *\nDisallow: /private\nAllow: /private/public");
    /// assert!(!policy.is_allowed("https://example.com/private/x"));
    /// assert!(policy.is_allowed("https://example.com/private/public/x"));
    /// assert!(policy.is_allowed("https://example.com/other"));
    /// ```
    pub fn is_allowed(&self, url: &str) -> bool {
        if self.allow_all {
            return true;
        }

        let Some(scheme_end) = url.find("://") else {
            return false;
        };
        let after_scheme = &url[scheme_end + 3..];
        let Some(path_start) = after_scheme.find('/') else {
            return true;
        };
        let path = &after_scheme[path_start..];

        if self
            .allowed_patterns
            .iter()
            .any(|pattern| allow_matches(pattern, path))
        {
            return true;
        }

        !self
            .disallowed_patterns
            .iter()
            .any(|pattern| disallow_matches(pattern, path))
    }
}

fn allow_matches(pattern: &str, path: &str) -> bool {
    match pattern.strip_suffix('*') {
        Some(prefix) => path.starts_with(prefix),
        None => path.starts_with(pattern),
    }
}

fn disallow_matches(pattern: &str, path: &str) -> bool {
    if pattern == "/" {
        return true;
    }

    if let Some(prefix) = pattern.strip_suffix('*') {
        return path.starts_with(prefix);
    }

    if path == pattern || (pattern.ends_with('/') && path.starts_with(pattern)) {
        return true;
    }

    match path.strip_prefix(pattern) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}
