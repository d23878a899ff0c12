//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a temporary database.

use std::path::Path;
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tidecrawl::config::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use tidecrawl::crawler::run_crawl;
use tidecrawl::storage::{SqliteStorage, Storage};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PROSE: &str = "The tide rises and falls twice each day as the moon pulls on the oceans of the earth.";

/// Creates a test configuration for the given seeds and database
fn create_test_config(seeds: Vec<String>, db_path: &Path, max_pages: u32, max_depth: i32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages_per_site: max_pages,
            max_depth,
            minimum_delay_ms: 0,
            max_concurrent_sites: 2,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            database_path: db_path.to_string_lossy().into_owned(),
        },
        seeds,
    }
}

/// Builds a page with enough prose to pass the quality gate
fn page(title: &str, links: &[&str]) -> String {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">{}</a>"#, href, href))
        .collect();
    format!(
        "<html><head><title>{}</title></head><body><p>{} {}</p>{}</body></html>",
        title, title, PROSE, anchors
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_robots(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn temp_db() -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("crawl.db");
    (dir, db_path)
}

#[tokio::test]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(
        &mock_server,
        "/",
        page(
            "Home",
            &[
                "/page1",
                "/page2",
                "https://other.example.org/elsewhere",
                "#top",
                "mailto:someone@example.com",
            ],
        ),
    )
    .await;
    mount_page(&mock_server, "/page1", page("Page One", &["/", "/page2"])).await;
    mount_page(&mock_server, "/page2", page("Page Two", &["/page1"])).await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.reports.len(), 1);
    let report = &summary.reports[0];
    assert_eq!(report.pages_crawled, 3);
    assert_eq!(report.pages_saved, 3);
    assert_eq!(report.rejected, 0);
    assert_eq!(report.fetch_failures, 0);

    let storage = SqliteStorage::new(&db_path).expect("Failed to open database");
    assert!(storage.page_exists(&format!("{}/", base_url)).unwrap());
    assert!(storage.page_exists(&format!("{}/page1", base_url)).unwrap());
    assert!(storage.page_exists(&format!("{}/page2", base_url)).unwrap());

    let stats = storage.stats().unwrap();
    assert_eq!(stats.pages, 3);
    assert!(stats.index_in_sync());
    // Home keeps all three resolved links, the other pages two and one
    assert_eq!(stats.links, 6);

    let hits = storage.search("Page One", 10).unwrap();
    assert_eq!(hits[0].title, "Page One");
}

#[tokio::test]
async fn test_robots_disallow_respected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(
        &mock_server,
        "User-agent: *\nDisallow: /private\nAllow: /private/public",
    )
    .await;
    mount_page(
        &mock_server,
        "/",
        page(
            "Home",
            &["/private/secret", "/private/public/open", "/privateer"],
        ),
    )
    .await;
    mount_page(&mock_server, "/private/public/open", page("Open", &[])).await;
    mount_page(&mock_server, "/privateer", page("Privateer", &[])).await;

    Mock::given(method("GET"))
        .and(path("/private/secret"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Secret", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let summary = run_crawl(config).await.expect("Crawl failed");
    let report = &summary.reports[0];
    assert_eq!(report.robots_denied, 1);
    assert_eq!(report.pages_saved, 3);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert!(!storage
        .page_exists(&format!("{}/private/secret", base_url))
        .unwrap());
    assert!(storage
        .page_exists(&format!("{}/private/public/open", base_url))
        .unwrap());
    assert!(storage.page_exists(&format!("{}/privateer", base_url)).unwrap());
}

#[tokio::test]
async fn test_missing_robots_allows_everything() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    // No robots.txt mock: wiremock answers 404
    mount_page(&mock_server, "/", page("Home", &["/admin"])).await;
    mount_page(&mock_server, "/admin", page("Admin", &[])).await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let summary = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(summary.reports[0].pages_saved, 2);
}

#[tokio::test]
async fn test_depth_limit() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "").await;
    mount_page(&mock_server, "/", page("Root", &["/d1"])).await;
    mount_page(&mock_server, "/d1", page("Depth One", &["/d2"])).await;

    Mock::given(method("GET"))
        .and(path("/d2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Depth Two", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 1);

    let summary = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(summary.reports[0].pages_crawled, 2);
    assert_eq!(summary.reports[0].pages_saved, 2);
}

#[tokio::test]
async fn test_page_budget() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nDisallow:").await;
    mount_page(&mock_server, "/", page("Root", &["/a", "/b", "/c"])).await;
    mount_page(&mock_server, "/a", page("A page", &[])).await;
    mount_page(&mock_server, "/b", page("B page", &[])).await;
    mount_page(&mock_server, "/c", page("C page", &[])).await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 2, -1);

    let summary = run_crawl(config).await.expect("Crawl failed");
    let report = &summary.reports[0];
    assert_eq!(report.pages_crawled, 2);

    // Breadth-first: the root and its first link
    let storage = SqliteStorage::new(&db_path).unwrap();
    assert!(storage.page_exists(&format!("{}/a", base_url)).unwrap());
    assert!(!storage.page_exists(&format!("{}/b", base_url)).unwrap());
}

#[tokio::test]
async fn test_second_run_skips_stored_pages() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", page("Home", &["/next"])).await;
    mount_page(&mock_server, "/next", page("Next", &[])).await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let first = run_crawl(config.clone()).await.expect("First crawl failed");
    assert_eq!(first.reports[0].pages_saved, 2);

    let second = run_crawl(config).await.expect("Second crawl failed");
    let report = &second.reports[0];
    assert_eq!(report.pages_crawled, 1);
    assert_eq!(report.already_stored, 1);
    assert_eq!(report.pages_saved, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    let stats = storage.stats().unwrap();
    assert_eq!(stats.pages, 2);
    assert_eq!(stats.indexed, 2);
}

#[tokio::test]
async fn test_challenge_page_rejected() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", page("Just a moment...", &["/behind"])).await;

    Mock::given(method("GET"))
        .and(path("/behind"))
        .respond_with(ResponseTemplate::new(200).set_body_string(page("Behind", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let summary = run_crawl(config).await.expect("Crawl failed");
    let report = &summary.reports[0];
    assert_eq!(report.rejected, 1);
    assert_eq!(report.pages_saved, 0);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.stats().unwrap().pages, 0);
}

#[tokio::test]
async fn test_fetch_failures_do_not_stop_crawl() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/", page("Home", &["/gone", "/broken", "/fine"])).await;
    mount_page(&mock_server, "/fine", page("Fine", &[])).await;

    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let (_dir, db_path) = temp_db();
    let config = create_test_config(vec![format!("{}/", base_url)], &db_path, 100, 3);

    let summary = run_crawl(config).await.expect("Crawl failed");
    let report = &summary.reports[0];
    assert_eq!(report.pages_crawled, 4);
    assert_eq!(report.fetch_failures, 2);
    assert_eq!(report.pages_saved, 2);
}

#[tokio::test]
async fn test_multiple_sites_crawled_independently() {
    let first_server = MockServer::start().await;
    let second_server = MockServer::start().await;

    for server in [&first_server, &second_server] {
        mount_robots(server, "User-agent: *\nAllow: /").await;
        mount_page(server, "/", page("Landing", &["/about"])).await;
        mount_page(server, "/about", page("About", &[])).await;
    }

    let (_dir, db_path) = temp_db();
    let config = create_test_config(
        vec![
            format!("{}/", first_server.uri()),
            format!("{}/", second_server.uri()),
        ],
        &db_path,
        100,
        3,
    );

    let summary = run_crawl(config).await.expect("Crawl failed");
    assert_eq!(summary.reports.len(), 2);
    assert_eq!(summary.reports[0].seed, format!("{}/", first_server.uri()));
    assert_eq!(summary.pages_saved(), 4);

    let storage = SqliteStorage::new(&db_path).unwrap();
    assert_eq!(storage.stats().unwrap().pages, 4);
}

#[tokio::test]
async fn test_same_origin_seeds_share_politeness_delay() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_robots(&mock_server, "User-agent: *\nAllow: /").await;
    mount_page(&mock_server, "/a", page("Alpha", &["/a2"])).await;
    mount_page(&mock_server, "/a2", page("Alpha Two", &[])).await;
    mount_page(&mock_server, "/b", page("Beta", &["/b2"])).await;
    mount_page(&mock_server, "/b2", page("Beta Two", &[])).await;

    let (_dir, db_path) = temp_db();
    let mut config = create_test_config(
        vec![format!("{}/a", base_url), format!("{}/b", base_url)],
        &db_path,
        100,
        3,
    );
    config.crawler.minimum_delay_ms = 300;
    config.crawler.max_concurrent_sites = 2;

    let start = Instant::now();
    let summary = run_crawl(config).await.expect("Crawl failed");

    assert_eq!(summary.pages_saved(), 4);
    // Four page fetches on one origin need three full gaps
    assert!(
        start.elapsed() >= Duration::from_millis(900),
        "requests to one origin were not spaced: {:?}",
        start.elapsed()
    );
}

#[tokio::test]
async fn test_unopenable_database_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("missing-dir").join("crawl.db");
    let config = create_test_config(vec!["http://127.0.0.1:1/".to_string()], &db_path, 10, 1);

    assert!(run_crawl(config).await.is_err());
}
