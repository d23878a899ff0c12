//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the configured user agent string
//! - GET requests with bounded redirect following
//! - Error classification

use crate::config::UserAgentConfig;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    redirect::Policy,
    Client,
};
use std::time::Duration;

/// Maximum number of redirects followed for a single request
pub const MAX_REDIRECTS: usize = 5;

/// Total request timeout
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Connection establishment timeout
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the resource
    Success {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Response body
        body: String,
    },

    /// Server answered with a non-success status code
    HttpError {
        /// The HTTP status code
        status_code: u16,
    },

    /// Network error (connection refused, timeout, redirect limit, etc.)
    NetworkError {
        /// Error description
        error: String,
    },
}

impl FetchResult {
    /// Returns the body of a successful fetch, consuming the result
    ///
    /// Failures of any kind map to `None`; callers treat them the same as an
    /// empty download.
    pub fn into_body(self) -> Option<String> {
        match self {
            FetchResult::Success { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - User agent identification for the crawler
///
/// # Returns
///
/// * `Ok(Client)` - A client with timeouts, redirect limit and default headers set
/// * `Err(reqwest::Error)` - The client could not be built
///
/// # Example
///
/// ```no_run
/// use tidecrawl::config::UserAgentConfig;
/// use tidecrawl::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Tidecrawl".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
/// };
///
/// let client = build_http_client(&config).unwrap();
/// ```
pub fn build_http_client(config: &UserAgentConfig) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    Client::builder()
        .user_agent(config.header_value())
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(CONNECT_TIMEOUT)
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL and returns its body as text
///
/// Redirects are followed up to [`MAX_REDIRECTS`] hops. Any status outside
/// 2xx is reported as [`FetchResult::HttpError`]; transport failures,
/// timeouts and exhausted redirect chains as [`FetchResult::NetworkError`].
///
/// # Arguments
///
/// * `client` - The shared HTTP client
/// * `url` - The URL to fetch
///
/// # Returns
///
/// A [`FetchResult`] describing the outcome; this function never fails.
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return classify_error(&e),
    };

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return FetchResult::HttpError {
            status_code: status.as_u16(),
        };
    }

    match response.text().await {
        Ok(body) => FetchResult::Success {
            final_url,
            status_code: status.as_u16(),
            body,
        },
        Err(e) => classify_error(&e),
    }
}

fn classify_error(e: &reqwest::Error) -> FetchResult {
    let error = if e.is_timeout() {
        "Request timeout".to_string()
    } else if e.is_connect() {
        "Connection refused".to_string()
    } else if e.is_redirect() {
        format!("Redirect limit exceeded: {}", e)
    } else {
        e.to_string()
    };

    FetchResult::NetworkError { error }
}
