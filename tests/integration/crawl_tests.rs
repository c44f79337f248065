//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end against a SQLite page store.

use sitequery::config::{Config, CrawlerConfig, StoreConfig};
use sitequery::crawler::{run_crawl, Crawler, PageFetcher};
use sitequery::state::PageStatus;
use sitequery::storage::{open_storage, PageStore, RunStatus, SqliteStorage};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration storing pages under `dir`
fn create_test_config(dir: &TempDir, max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            ..CrawlerConfig::default()
        },
        store: StoreConfig {
            database_path: dir
                .path()
                .join("webpages.db")
                .to_string_lossy()
                .into_owned(),
        },
        ..Config::default()
    }
}

fn html_page(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

/// Mounts `/` linking to `/a` and `/b`, with `/a` linking on to `/c`
async fn mount_small_site(mock_server: &MockServer, expected_fetches: u64) {
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            &format!(
                r#"<main><p>Welcome</p>
                <a href="/a">Page A</a>
                <a href="{}/b">Page B</a>
                <a href="https://other.example/x">Elsewhere</a></main>"#,
                base_url
            ),
        ))
        .expect(expected_fetches)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page(
            "Page A",
            r#"Content A <a href="/c">Deeper</a> <a href="/">Home</a>"#,
        ))
        .expect(expected_fetches)
        .mount(mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html_page("Page B", "Content B"))
        .expect(expected_fetches)
        .mount(mock_server)
        .await;
}

#[tokio::test]
async fn test_depth_one_crawl_stores_root_and_children() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_small_site(&mock_server, 1).await;

    // beyond max depth, never fetched
    Mock::given(method("GET"))
        .and(path("/c"))
        .respond_with(html_page("Page C", "Content C"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1);

    let report = run_crawl(&config, "hash", &base_url, Vec::new())
        .await
        .expect("Crawl failed");
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pages_reused, 0);
    assert_eq!(report.pages_failed, 0);

    let storage = open_storage(Path::new(&config.store.database_path)).unwrap();
    assert_eq!(storage.count_pages().unwrap(), 3);

    let root = storage
        .get_by_url(&format!("{}/", base_url))
        .unwrap()
        .expect("root page stored");
    assert!(root.is_root);
    assert!(!root.is_leaf);
    assert_eq!(root.depth(), 0);
    assert_eq!(root.parent_id, None);
    assert_eq!(root.title, "Home");
    assert_eq!(root.content, "Welcome Page A Page B Elsewhere");
    assert_eq!(
        root.links,
        vec![format!("{}/a", base_url), format!("{}/b", base_url)]
    );

    let children = storage.get_children(&root.id).unwrap();
    let mut child_urls: Vec<String> = children.iter().map(|p| p.url.clone()).collect();
    child_urls.sort();
    assert_eq!(
        child_urls,
        vec![format!("{}/a", base_url), format!("{}/b", base_url)]
    );
    for child in &children {
        assert_eq!(child.depth(), 1);
        assert!(!child.is_root);
        assert_eq!(child.status(), PageStatus::Processed);
    }

    let page_b = storage
        .get_by_url(&format!("{}/b", base_url))
        .unwrap()
        .unwrap();
    assert!(page_b.is_leaf);
    assert!(page_b.links.is_empty());
}

#[tokio::test]
async fn test_max_depth_zero_stores_only_the_seed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<a href="/a">A</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(html_page("A", "A"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = SqliteStorage::open_in_memory().unwrap();
    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
    let mut crawler = Crawler::new(store, fetcher, 0);
    crawler.crawl(&format!("{}/", base_url)).await.unwrap();

    let store = crawler.into_store();
    let pages = store.get_all().unwrap();
    assert_eq!(pages.len(), 1);
    assert!(pages[0].is_root);
    assert_eq!(pages[0].url, format!("{}/", base_url));
}

#[tokio::test]
async fn test_second_crawl_performs_no_fetches() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    // each page is served exactly once across both runs
    mount_small_site(&mock_server, 1).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1);

    let first = run_crawl(&config, "hash", &base_url, Vec::new())
        .await
        .unwrap();
    let before = open_storage(Path::new(&config.store.database_path))
        .unwrap()
        .get_all()
        .unwrap();

    let second = run_crawl(&config, "hash", &base_url, Vec::new())
        .await
        .unwrap();
    let storage = open_storage(Path::new(&config.store.database_path)).unwrap();
    let after = storage.get_all().unwrap();

    assert_eq!(first.pages_fetched, 3);
    assert_eq!(second.pages_fetched, 0);
    assert_eq!(second.pages_reused, 3);
    assert_eq!(before, after);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.id, second.run_id);
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.pages_fetched, 0);
    assert_eq!(run.pages_reused, 3);
    assert!(run.finished_at.is_some());
}

#[tokio::test]
async fn test_error_pages_are_stored_and_not_refetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page("Home", r#"<a href="/missing">Gone</a>"#))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 3);

    let first = run_crawl(&config, "hash", &base_url, Vec::new())
        .await
        .unwrap();
    assert_eq!(first.pages_failed, 1);

    let second = run_crawl(&config, "hash", &base_url, Vec::new())
        .await
        .unwrap();
    assert_eq!(second.pages_fetched, 0);

    let storage = open_storage(Path::new(&config.store.database_path)).unwrap();
    let missing = storage
        .get_by_url(&format!("{}/missing", base_url))
        .unwrap()
        .expect("error page stored");
    assert_eq!(missing.status(), PageStatus::Error);
    assert_eq!(missing.metadata.error.as_deref(), Some("HTTP 404"));
    assert!(missing.content.is_empty());
    assert!(missing.links.is_empty());
    assert!(missing.is_leaf);
    assert_eq!(missing.depth(), 1);
    assert_eq!(storage.count_pages_by_status(PageStatus::Error).unwrap(), 1);
}

#[tokio::test]
async fn test_unreachable_seed_becomes_error_page() {
    // nothing listens on the discard port
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1);

    let report = run_crawl(&config, "hash", "http://127.0.0.1:9/", Vec::new())
        .await
        .unwrap();
    assert_eq!(report.pages_failed, 1);

    let storage = open_storage(Path::new(&config.store.database_path)).unwrap();
    let seed = storage.get_by_url("http://127.0.0.1:9/").unwrap().unwrap();
    assert_eq!(seed.status(), PageStatus::Error);
    assert!(seed.is_root);
    assert_eq!(seed.title, "http://127.0.0.1:9/");
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let home = format!("{}/home", base_url);

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(301).insert_header("location", home.as_str()))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/home"))
        .respond_with(html_page("Moved Home", "Hello after redirect"))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
    let page = fetcher.fetch(&format!("{}/", base_url), None, 0).await;

    assert_eq!(page.status(), PageStatus::Processed);
    assert_eq!(page.url, format!("{}/", base_url));
    assert_eq!(page.title, "Moved Home");
    assert_eq!(page.content, "Hello after redirect");
}

#[tokio::test]
async fn test_redirect_loop_becomes_error_page() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    let target = format!("{}/loop", base_url);

    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", target.as_str()))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
    let page = fetcher
        .fetch(&format!("{}/loop", base_url), Some("parent"), 2)
        .await;

    assert_eq!(page.status(), PageStatus::Error);
    assert!(page.metadata.error.is_some());
    assert_eq!(page.parent_id.as_deref(), Some("parent"));
}

#[tokio::test]
async fn test_page_without_title_uses_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>No title here</p>"))
        .mount(&mock_server)
        .await;

    let fetcher = PageFetcher::new(&CrawlerConfig::default()).unwrap();
    let page = fetcher.fetch(&format!("{}/plain", base_url), None, 0).await;

    assert_eq!(page.title, format!("{}/plain", base_url));
    assert_eq!(page.content, "No title here");
}

#[tokio::test]
async fn test_crawl_scores_pages_against_questions() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_page(
            "Home",
            r#"Our certificates <a href="/blog">Blog</a>"#,
        ))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(html_page("Blog", "Nothing relevant"))
        .mount(&mock_server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(&dir, 1);
    let questions = vec!["Which certificates?".to_string()];

    run_crawl(&config, "hash", &base_url, questions).await.unwrap();

    let storage = open_storage(Path::new(&config.store.database_path)).unwrap();
    let home = storage
        .get_by_url(&format!("{}/", base_url))
        .unwrap()
        .unwrap();
    let blog = storage
        .get_by_url(&format!("{}/blog", base_url))
        .unwrap()
        .unwrap();

    // "which" is absent everywhere, "certificates" only on the home page
    assert!((home.relevance_score - 0.5).abs() < 1e-9);
    assert_eq!(blog.relevance_score, 0.0);
}
