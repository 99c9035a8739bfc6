//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, including the files left in the
//! destination directory.

use sitecrawl::config::{Config, CrawlerConfig, StartArgs};
use sitecrawl::crawler::run_crawl;
use sitecrawl::state::{CancellationFlag, PageState, RunState};
use sitecrawl::storage::EMPTY_BODY_PLACEHOLDER;
use sitecrawl::{ConfigError, CrawlError, StartupError};
use std::fs;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with short timeouts
fn create_test_config() -> Config {
    Config {
        crawler: CrawlerConfig {
            workers: 2,
            request_timeout_secs: 6,
            ..CrawlerConfig::default()
        },
        ..Config::default()
    }
}

fn start_args(mode: &str, root_url: &str, destination: &Path) -> StartArgs {
    StartArgs {
        start_command: "wcraw".to_string(),
        mode: mode.to_string(),
        root_url: root_url.to_string(),
        destination: destination.to_path_buf(),
    }
}

/// Mounts a GET page that must be requested exactly `times` times
async fn mount_page(server: &MockServer, page: &str, body: String, times: u64) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .expect(times)
        .mount(server)
        .await;
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap_or_else(|e| panic!("missing {}: {}", name, e))
}

#[tokio::test]
async fn test_recursive_crawl_writes_every_page_once() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><body>
            <a href="{0}/page1">Page 1</a>
            <a href="{0}/page2">Page 2</a>
            <a href="http://elsewhere.example.org/page3">Elsewhere</a>
            </body></html>"#,
            base_url
        ),
        1,
    )
    .await;

    mount_page(
        &mock_server,
        "/page1",
        format!(
            r#"<a href="{0}/page2">again</a> <a href="{0}/page1/sub#frag">sub</a> <a href="{0}/">home</a>"#,
            base_url
        ),
        1,
    )
    .await;

    // Empty body
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/page1/sub", "leaf".to_string(), 1).await;

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-r", &format!("{}/", base_url), dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.state, RunState::Done { partial: false });
    assert_eq!(report.fetched, 4);
    assert_eq!(report.count(PageState::Processed), 4);
    assert_eq!(report.persisted, 4);
    assert_eq!(report.discovered.len(), 3);

    assert!(read(dest.path(), "127.0.0.1-index.html").contains("Page 1"));
    assert!(read(dest.path(), "127.0.0.1-page1.html").contains("sub"));
    assert_eq!(read(dest.path(), "127.0.0.1-page2.html"), EMPTY_BODY_PLACEHOLDER);
    assert_eq!(read(dest.path(), "127.0.0.1-sub.html"), "leaf");
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 4);
}

#[tokio::test]
async fn test_single_level_fetches_root_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(r#"<a href="{0}/page1">1</a> <a href="{0}/page2">2</a>"#, base_url),
        1,
    )
    .await;
    mount_page(&mock_server, "/page1", "never".to_string(), 0).await;
    mount_page(&mock_server, "/page2", "never".to_string(), 0).await;

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-n", &base_url, dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.fetched, 1);
    assert_eq!(report.discovered.len(), 2);
    assert_eq!(fs::read_dir(dest.path()).unwrap().count(), 1);
}

#[tokio::test]
async fn test_not_found_abandons_branch_only() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(r#"<a href="{0}/missing">x</a> <a href="{0}/ok">y</a>"#, base_url),
        1,
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string(format!("{}/hidden", base_url)))
        .expect(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "/ok", "fine".to_string(), 1).await;
    // Links in an error page are never followed
    mount_page(&mock_server, "/hidden", "never".to_string(), 0).await;

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-r", &base_url, dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.count(PageState::Failed), 1);
    assert_eq!(report.count(PageState::Processed), 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].url.ends_with("/missing"));
    assert!(!dest.path().join("127.0.0.1-missing.html").exists());
    assert!(dest.path().join("127.0.0.1-ok.html").exists());
}

#[tokio::test]
async fn test_scope_limits_crawl_to_root_path() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/docs",
        format!(
            r#"<a href="{0}/docs/guide">guide</a> <a href="{0}/blog/post">blog</a> <a href="{0}/docsearch">near miss</a>"#,
            base_url
        ),
        1,
    )
    .await;
    mount_page(&mock_server, "/docs/guide", "guide".to_string(), 1).await;
    mount_page(&mock_server, "/blog/post", "never".to_string(), 0).await;
    mount_page(&mock_server, "/docsearch", "never".to_string(), 0).await;

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-r", &format!("{}/docs", base_url), dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.fetched, 2);
}

#[tokio::test]
async fn test_startup_errors_make_no_requests() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dest = tempfile::tempdir().unwrap();
    let config = create_test_config();

    let mut args = start_args("-r", &base_url, dest.path());
    args.start_command = "crawl".to_string();
    let result = run_crawl(&config, &args, CancellationFlag::new()).await;
    assert!(matches!(
        result,
        Err(CrawlError::Startup(StartupError::InvalidStartCommand(_)))
    ));

    let result = run_crawl(
        &config,
        &start_args("-x", &base_url, dest.path()),
        CancellationFlag::new(),
    )
    .await;
    assert!(matches!(
        result,
        Err(CrawlError::Startup(StartupError::InvalidMode(_)))
    ));

    let result = run_crawl(
        &config,
        &start_args("-r", &base_url, &dest.path().join("missing")),
        CancellationFlag::new(),
    )
    .await;
    assert!(matches!(
        result,
        Err(CrawlError::Startup(StartupError::InvalidDestination(_)))
    ));

    let err = run_crawl(
        &config,
        &start_args("-r", "no scheme here", dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "The url is not valid!");
}

#[tokio::test]
async fn test_cancelled_before_start_is_partial() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", "never".to_string(), 0).await;

    let cancel = CancellationFlag::new();
    cancel.cancel();

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-r", &base_url, dest.path()),
        cancel,
    )
    .await
    .unwrap();

    assert_eq!(report.state, RunState::Done { partial: true });
    assert_eq!(report.fetched, 0);
}

#[tokio::test]
async fn test_redirected_seed_saved_under_final_url() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new-home", base_url).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    mount_page(&mock_server, "/new-home", "moved here".to_string(), 1).await;

    let dest = tempfile::tempdir().unwrap();
    let report = run_crawl(
        &create_test_config(),
        &start_args("-n", &format!("{}/old", base_url), dest.path()),
        CancellationFlag::new(),
    )
    .await
    .unwrap();

    assert_eq!(report.persisted, 1);
    assert_eq!(read(dest.path(), "127.0.0.1-new-home.html"), "moved here");
    assert!(!dest.path().join("127.0.0.1-old.html").exists());
}

#[tokio::test]
async fn test_invalid_config_rejected_before_fetching() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/", "never".to_string(), 0).await;

    let mut config = create_test_config();
    config.crawler.request_timeout_secs = 30;

    let dest = tempfile::tempdir().unwrap();
    let result = run_crawl(
        &config,
        &start_args("-r", &base_url, dest.path()),
        CancellationFlag::new(),
    )
    .await;

    assert!(matches!(
        result,
        Err(CrawlError::Config(ConfigError::Validation(_)))
    ));
}
