//! Integration tests for fan-out snapshots
//!
//! A wiremock server plays the seed site; snapshots land in a temporary
//! output directory.

use parallel_crawler::config::{FanoutConfig, HttpConfig};
use parallel_crawler::crawler::{
    compare_fanout, run_fanout, FanoutCrawler, HttpTransport, SeedOutcome, Transport,
};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves a seed page with three assets and three outbound pages
async fn seed_site() -> MockServer {
    let mock_server = MockServer::start().await;

    mount(
        &mock_server,
        "/",
        r#"<html><head>
<link rel="stylesheet" href="/static/site.css">
<script src="/static/app.js"></script>
</head><body>
<img src="/static/logo.png">
<a href="/one">One</a>
<a href="mailto:owner@example.com">Mail</a>
<a href="/two">Two</a>
<a href="/three">Three</a>
</body></html>"#,
    )
    .await;
    mount(&mock_server, "/static/site.css", "body { color: black; }").await;
    mount(&mock_server, "/static/app.js", "console.log('hi');").await;
    mount(&mock_server, "/one", "<html>one</html>").await;
    mount(&mock_server, "/two", "<html>two</html>").await;
    mount(&mock_server, "/three", "<html>three</html>").await;
    // logo.png is deliberately missing: a failed asset is skipped

    mock_server
}

fn fanout_config(output_dir: &std::path::Path) -> FanoutConfig {
    FanoutConfig {
        output_dir: output_dir.to_path_buf(),
        ..FanoutConfig::default()
    }
}

fn transport() -> Arc<dyn Transport> {
    Arc::new(HttpTransport::new(&HttpConfig::default().with_browser_headers()).unwrap())
}

#[tokio::test]
async fn test_snapshot_saves_seed_assets_and_links() {
    let mock_server = seed_site().await;
    let seed = format!("{}/", mock_server.uri());
    let dir = TempDir::new().unwrap();
    let target = dir.path().join("snapshot");

    let config = fanout_config(dir.path());
    let crawl_target = target.clone();
    let snapshot = tokio::task::spawn_blocking(move || {
        FanoutCrawler::new(transport(), &config).crawl(&seed, &crawl_target)
    })
    .await
    .unwrap()
    .unwrap();

    assert!(target.join("index.html").exists());
    assert_eq!(
        std::fs::read_to_string(target.join("site.css")).unwrap(),
        "body { color: black; }"
    );
    assert!(target.join("app.js").exists());
    assert!(!target.join("logo.png").exists());
    assert_eq!(snapshot.assets.len(), 2);

    // Only the first two fetchable links are followed
    assert_eq!(snapshot.linked_pages.len(), 2);
    assert_eq!(
        std::fs::read_to_string(target.join("linked_1.html")).unwrap(),
        "<html>one</html>"
    );
    assert_eq!(
        std::fs::read_to_string(target.join("linked_2.html")).unwrap(),
        "<html>two</html>"
    );
    assert!(!target.join("linked_3.html").exists());
}

#[tokio::test]
async fn test_unreachable_seed_is_an_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let seed = format!("{}/broken", mock_server.uri());
    let dir = TempDir::new().unwrap();
    let config = fanout_config(dir.path());
    let target = dir.path().join("broken");

    let crawl_target = target.clone();
    let result = tokio::task::spawn_blocking(move || {
        FanoutCrawler::new(transport(), &config).crawl(&seed, &crawl_target)
    })
    .await
    .unwrap();

    let err = result.unwrap_err();
    assert!(err.to_string().contains("HTTP error: 500"));
    assert!(!target.exists());
}

#[tokio::test]
async fn test_run_fanout_layout() {
    let mock_server = seed_site().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let seeds = vec![
        format!("{}/", mock_server.uri()),
        format!("{}/down", mock_server.uri()),
    ];
    let dir = TempDir::new().unwrap();
    let config = fanout_config(dir.path());

    let run = tokio::task::spawn_blocking(move || run_fanout(&seeds, transport(), 2, &config))
        .await
        .unwrap()
        .unwrap();

    let run_name = run.run_dir.file_name().unwrap().to_string_lossy().into_owned();
    assert!(run_name.starts_with("run_"));
    assert!(run_name.ends_with("_threads_2"));
    assert!(run.run_dir.join("thread_0").is_dir());
    assert!(run.run_dir.join("thread_1").is_dir());

    assert_eq!(run.outcomes.len(), 2);
    assert_eq!(run.saved_count(), 1);

    match &run.outcomes[0] {
        SeedOutcome::Saved(snapshot) => {
            assert!(snapshot.directory.starts_with(run.run_dir.join("thread_0")));
            assert!(snapshot.directory.join("index.html").exists());
        }
        other => panic!("expected a saved snapshot, got {:?}", other),
    }
    match &run.outcomes[1] {
        SeedOutcome::Failed { error, .. } => assert!(error.contains("503")),
        other => panic!("expected a failure, got {:?}", other),
    }

    let log = std::fs::read_to_string(run.run_dir.join("thread_0/log.txt")).unwrap();
    assert!(log.starts_with(&format!("Processing URL: {}/ -> saved", mock_server.uri())));
    let log = std::fs::read_to_string(run.run_dir.join("thread_1/log.txt")).unwrap();
    assert!(log.contains("/down -> failed"));
}

#[tokio::test]
async fn test_compare_fanout_times_each_worker_count() {
    let mock_server = seed_site().await;
    let seeds = vec![
        format!("{}/", mock_server.uri()),
        format!("{}/one", mock_server.uri()),
    ];
    let dir = TempDir::new().unwrap();
    let config = fanout_config(dir.path());

    let report =
        tokio::task::spawn_blocking(move || compare_fanout(&seeds, transport(), &[1, 2], &config))
            .await
            .unwrap()
            .unwrap();

    assert_eq!(report.url_count, 2);
    let threads: Vec<usize> = report.entries.iter().map(|e| e.threads).collect();
    assert_eq!(threads, vec![1, 2]);
    assert!((report.entries[0].speedup - 1.0).abs() < 1e-9);

    let mut run_dirs: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    run_dirs.sort();
    assert_eq!(run_dirs.len(), 2);
    assert!(run_dirs.iter().any(|name| name.ends_with("_threads_1")));
    assert!(run_dirs.iter().any(|name| name.ends_with("_threads_2")));
}
