//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small wiki and run the full crawl
//! cycle end-to-end, then rank the edge log the crawl produced.

use std::collections::BTreeSet;
use tempfile::TempDir;
use wikirank::config::{parse_config, Config};
use wikirank::crawler::{run_crawl, CrawlOutcome};
use wikirank::output::{run_analysis, RankMethod};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WIKI_PATH: &str = "/pmwiki/pmwiki.php/";

/// Builds an article body whose wiki links point at `targets`
fn article(targets: &[&str]) -> String {
    let anchors: String = targets
        .iter()
        .map(|t| format!(r#"<a class="twikilink" href="{}{}">{}</a> "#, WIKI_PATH, t, t))
        .collect();
    format!(
        r#"<html><body>
        <div id="sidebar"><a class="twikilink" href="{}Main/Sidebar">side</a></div>
        <div id="wikitext">
            {}
            <a class="urllink" href="https://elsewhere.org/">external</a>
            <a class="twikilink" href="https://elsewhere.org/pmwiki/pmwiki.php/Main/Foreign">foreign</a>
        </div>
        </body></html>"#,
        WIKI_PATH, anchors
    )
}

async fn mount_page(server: &MockServer, name: &str, targets: &[&str]) {
    Mock::given(method("GET"))
        .and(path(format!("{}{}", WIKI_PATH, name)))
        .respond_with(ResponseTemplate::new(200).set_body_string(article(targets)))
        .mount(server)
        .await;
}

/// Creates a test configuration crawling the mock server
fn create_test_config(server: &MockServer, dir: &TempDir) -> Config {
    let toml = format!(
        r#"
[crawler]
workers = 4
start = "Main/HomePage"
retry-attempts = 2
retry-delay-ms = 10
pause-poll-ms = 10
request-timeout-secs = 5

[site]
prefixes = ["{uri}{wiki}", "{wiki}"]

[output]
edge-log = "{log}"
rank-file = "{ranks}"
csv-file = "{csv}"

[analysis]
convergence = 1e-10
max-iterations = 1000
top-n = 3
"#,
        uri = server.uri(),
        wiki = WIKI_PATH,
        log = dir.path().join("links.txt").display(),
        ranks = dir.path().join("ranks.tsv").display(),
        csv = dir.path().join("graph.csv").display(),
    );
    parse_config(&toml).expect("test config is valid")
}

async fn mock_wiki() -> MockServer {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "Main/HomePage",
        &["Main/Alpha", "Film/Beta", "Main/OldName", "Main/Broken"],
    )
    .await;
    mount_page(&server, "Main/Alpha", &["Main/HomePage", "Film/Beta?from=Main.Alpha"]).await;
    mount_page(&server, "Film/Beta", &[]).await;
    mount_page(&server, "Main/NewName", &["Main/Alpha"]).await;

    Mock::given(method("GET"))
        .and(path(format!("{}Main/OldName", WIKI_PATH)))
        .respond_with(ResponseTemplate::new(301).insert_header(
            "Location",
            format!("{}{}Main/NewName", server.uri(), WIKI_PATH).as_str(),
        ))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("{}Main/Broken", WIKI_PATH)))
        .respond_with(ResponseTemplate::new(500))
        .expect(2)
        .mount(&server)
        .await;

    server
}

async fn crawl(config: Config) -> CrawlOutcome {
    run_crawl(config).await.expect("crawl completes")
}

#[tokio::test]
async fn test_full_crawl_writes_edge_log() {
    let server = mock_wiki().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let outcome = crawl(config).await;

    let log = std::fs::read_to_string(dir.path().join("links.txt")).unwrap();
    let lines: BTreeSet<&str> = log.lines().collect();
    let expected: BTreeSet<&str> = [
        "Main/HomePage -> Main/Alpha",
        "Main/HomePage -> Film/Beta",
        "Main/HomePage -> Main/OldName",
        "Main/HomePage -> Main/Broken",
        "Main/Alpha -> Main/HomePage",
        "Main/Alpha -> Film/Beta",
        "Main/OldName => Main/NewName",
        "Main/NewName -> Main/Alpha",
    ]
    .into_iter()
    .collect();

    assert_eq!(lines, expected);
    assert_eq!(log.lines().count(), 8);
    assert!(!log.contains("Sidebar"));
    assert!(!log.contains("Foreign"));

    let summary = &outcome.summary;
    assert_eq!(summary.urls_known, 6);
    assert_eq!(summary.pages_processed, 6);
    assert_eq!(summary.failed_fetches, 1);
    assert_eq!(summary.links, 7);
    assert_eq!(summary.redirects, 1);
}

#[tokio::test]
async fn test_crawl_index_uses_classified_names() {
    let server = mock_wiki().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let outcome = crawl(config).await;
    let index = &outcome.index;

    let home = index.symbols.get("HomePage").expect("home page indexed");
    let old = index.symbols.get("OldName").expect("redirect source indexed");
    let new = index.symbols.get("NewName").expect("redirect target indexed");
    assert!(index.symbols.get("Main/HomePage").is_none());

    assert_eq!(index.links[home].len(), 4);
    assert_eq!(index.aliases, vec![(new, old)]);
    assert_eq!(index.most_linked()[0], ("HomePage".to_string(), 4));
}

#[tokio::test]
async fn test_crawled_log_can_be_ranked() {
    let server = mock_wiki().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    crawl(config.clone()).await;
    let report = run_analysis(&config, RankMethod::Matrix).unwrap();

    assert_eq!(report.redirects, 1);
    assert_eq!(report.top.len(), 3);
    assert!(report.top.iter().all(|(name, _)| name != "Main/OldName"));

    let total: f64 = report.run.ranks.iter().sum();
    assert!((total - 1.0).abs() < 1e-9);

    let ranks = std::fs::read_to_string(dir.path().join("ranks.tsv")).unwrap();
    // Every page except the redirect source
    assert_eq!(ranks.lines().count(), 5);

    let csv = std::fs::read_to_string(dir.path().join("graph.csv")).unwrap();
    assert!(csv.starts_with("Source,Target\n"));
}

#[tokio::test]
async fn test_unreachable_start_finishes_empty() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&server, &dir);

    let outcome = crawl(config).await;

    assert_eq!(outcome.summary.pages_processed, 1);
    assert_eq!(outcome.summary.failed_fetches, 1);
    assert_eq!(outcome.index.page_count(), 0);
    let log = std::fs::read_to_string(dir.path().join("links.txt")).unwrap();
    assert!(log.is_empty());
}
