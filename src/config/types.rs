use serde::Deserialize;

/// Main configuration structure for Tidecrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Seed URLs; each one starts an independent site crawl
    pub seeds: Vec<String>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages counted per site
    #[serde(rename = "max-pages-per-site", default = "default_max_pages")]
    pub max_pages_per_site: u32,

    /// Maximum link depth from the seed; -1 means unlimited
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: i32,

    /// Minimum time between requests to the same site (milliseconds)
    #[serde(rename = "minimum-delay-ms", default)]
    pub minimum_delay_ms: u64,

    /// Number of sites crawled at the same time
    #[serde(rename = "max-concurrent-sites", default = "default_concurrent_sites")]
    pub max_concurrent_sites: u32,
}

impl CrawlerConfig {
    /// Returns the depth limit, or `None` when crawling is unlimited
    pub fn depth_limit(&self) -> Option<u32> {
        u32::try_from(self.max_depth).ok()
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_pages_per_site: default_max_pages(),
            max_depth: default_max_depth(),
            minimum_delay_ms: 0,
            max_concurrent_sites: default_concurrent_sites(),
        }
    }
}

fn default_max_pages() -> u32 {
    100
}

fn default_max_depth() -> i32 {
    3
}

fn default_concurrent_sites() -> u32 {
    1
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

impl UserAgentConfig {
    /// Formats the identifying client string sent with every request
    pub fn header_value(&self) -> String {
        format!(
            "Mozilla/5.0 (compatible; {}/{}; +{})",
            self.crawler_name, self.crawler_version, self.contact_url
        )
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "crawler_data.db".to_string()
}
