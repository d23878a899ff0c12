//! Robots.txt handling module
//!
//! This module fetches and parses robots.txt files and answers whether a URL
//! may be crawled. Fetching fails open: a missing, empty or unreachable
//! robots.txt allows everything.

mod parser;
mod policy;

pub use parser::MAX_CRAWL_DELAY_MILLIS;
pub use policy::RobotsPolicy;

use crate::crawler::fetch_url;
use crate::url::origin_of;
use reqwest::Client;

/// Returns the robots.txt location for the site hosting `site_url`
///
/// The origin is `scheme://host[:port]`; when the URL cannot be parsed the
/// text up to the first `/` after the scheme is used instead.
pub fn robots_url(site_url: &str) -> String {
    let origin = origin_of(site_url).unwrap_or_else(|| raw_origin(site_url).to_string());
    format!("{}/robots.txt", origin)
}

fn raw_origin(url: &str) -> &str {
    match url.find("://") {
        Some(scheme_end) => match url[scheme_end + 3..].find('/') {
            Some(path_start) => &url[..scheme_end + 3 + path_start],
            None => url,
        },
        None => url,
    }
}

/// Fetches and parses robots.txt for the site hosting `site_url`
///
/// Never fails: any network error, non-success status or empty body yields
/// [`RobotsPolicy::allow_all`].
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `site_url` - Any URL on the site; only its origin is used
pub async fn fetch_policy(client: &Client, site_url: &str) -> RobotsPolicy {
    let location = robots_url(site_url);

    match fetch_url(client, &location).await.into_body() {
        Some(body) if !body.trim().is_empty() => {
            let policy = RobotsPolicy::parse(&body);
            tracing::debug!(
                "Loaded robots.txt from {} ({} disallow, {} allow, delay {}ms)",
                location,
                policy.disallowed_patterns.len(),
                policy.allowed_patterns.len(),
                policy.crawl_delay_millis
            );
            policy
        }
        _ => {
            tracing::debug!("No usable robots.txt at {}, allowing all", location);
            RobotsPolicy::allow_all()
        }
    }
}
