//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the game catalogue and run
//! the full crawl cycle end-to-end.

use serde_json::{json, Value};
use std::time::{Duration, Instant};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use universe_crawler::config::{Config, CrawlerConfig, OutputConfig, RemoteConfig};
use universe_crawler::crawler::run_crawl;
use universe_crawler::output::{merge_into_corpus, read_records, write_records};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(server: &MockServer, target: usize, batch_size: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_id: "100".to_string(),
            target_count: target,
            request_delay_ms: 0,
            batch_size,
        },
        remote: RemoteConfig {
            games_base_url: server.uri(),
            thumbnails_base_url: server.uri(),
            ..Default::default()
        },
        output: OutputConfig::default(),
    }
}

async fn mount_recommendations(server: &MockServer, id: &str, recommended: &[u64]) {
    let games: Vec<Value> = recommended
        .iter()
        .map(|id| json!({"universeId": id}))
        .collect();

    Mock::given(method("GET"))
        .and(path(format!("/v1/games/recommendations/game/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "games": games })))
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer, requested: &str, returned: &[u64]) {
    let data: Vec<Value> = returned
        .iter()
        .map(|id| json!({"id": id, "name": format!("Game {}", id), "visits": id * 10}))
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/games"))
        .and(query_param("universeIds", requested))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .expect(1)
        .mount(server)
        .await;
}

async fn mount_thumbnails(server: &MockServer, requested: &str, returned: &[u64]) {
    let data: Vec<Value> = returned
        .iter()
        .map(|id| {
            json!({
                "universeId": id,
                "thumbnails": [{"imageUrl": format!("https://img.example.com/{}.png", id)}]
            })
        })
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/games/multiget/thumbnails"))
        .and(query_param("universeIds", requested))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .expect(1)
        .mount(server)
        .await;
}

/// Seed 100 recommends 200 and 300; 200 recommends 300 and 400
async fn mount_small_catalogue(server: &MockServer) {
    mount_recommendations(server, "100", &[200, 300]).await;
    mount_recommendations(server, "200", &[300, 400]).await;
    mount_recommendations(server, "300", &[]).await;
    mount_recommendations(server, "400", &[]).await;
}

fn universe_ids(records: &[serde_json::Map<String, Value>]) -> Vec<&str> {
    records
        .iter()
        .map(|record| record["universeId"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_full_crawl_small_catalogue() {
    let server = MockServer::start().await;
    mount_small_catalogue(&server).await;
    mount_details(&server, "100,200", &[100, 200]).await;
    mount_details(&server, "300,400", &[300]).await;
    mount_thumbnails(&server, "100,200", &[100, 200]).await;
    mount_thumbnails(&server, "300", &[300]).await;

    let config = create_test_config(&server, 10, 2);
    let outcome = run_crawl(&config, CancellationToken::new())
        .await
        .expect("Crawl failed");

    assert_eq!(universe_ids(&outcome.records), vec!["100", "200", "300"]);
    assert_eq!(outcome.records[1]["name"], json!("Game 200"));
    assert_eq!(
        outcome.records[2]["imageUrl"],
        json!("https://img.example.com/300.png")
    );

    let report = &outcome.report;
    assert_eq!(report.discovered, 4);
    assert_eq!(report.expanded, 4);
    assert_eq!(report.resolved, 3);
    assert_eq!(report.failed, 1);
    assert_eq!(report.pending, 0);
    assert_eq!(report.calls.recommendation_calls, 4);
    assert_eq!(report.calls.detail_calls, 2);
    assert_eq!(report.calls.thumbnail_calls, 2);
    assert_eq!(report.average_visits, Some(2000));
    assert!(!report.reached_target());
}

#[tokio::test]
async fn test_crawl_stops_at_target() {
    let server = MockServer::start().await;
    mount_recommendations(&server, "100", &[200, 300]).await;
    mount_details(&server, "100,200", &[100, 200]).await;
    mount_thumbnails(&server, "100,200", &[100, 200]).await;

    Mock::given(method("GET"))
        .and(path("/v1/games/recommendations/game/200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"games": []})))
        .expect(0)
        .mount(&server)
        .await;

    let config = create_test_config(&server, 2, 2);
    let outcome = run_crawl(&config, CancellationToken::new()).await.unwrap();

    assert_eq!(universe_ids(&outcome.records), vec!["100", "200"]);
    assert!(outcome.report.reached_target());
    assert_eq!(outcome.report.expanded, 1);
}

#[tokio::test]
async fn test_unavailable_service_yields_empty_output() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let config = create_test_config(&server, 10, 2);
    let outcome = run_crawl(&config, CancellationToken::new()).await.unwrap();

    assert!(outcome.records.is_empty());
    assert!(outcome.report.is_empty());
    assert_eq!(outcome.report.failed, 1);
    assert_eq!(outcome.report.calls.failed_calls, 2);
}

#[tokio::test]
async fn test_requests_are_paced() {
    let server = MockServer::start().await;
    mount_small_catalogue(&server).await;
    mount_details(&server, "100,200", &[100, 200]).await;
    mount_details(&server, "300,400", &[300, 400]).await;
    mount_thumbnails(&server, "100,200", &[100, 200]).await;
    mount_thumbnails(&server, "300,400", &[300, 400]).await;

    let mut config = create_test_config(&server, 10, 2);
    config.crawler.request_delay_ms = 50;

    let started = Instant::now();
    let outcome = run_crawl(&config, CancellationToken::new()).await.unwrap();
    let elapsed = started.elapsed();

    // 8 calls, 7 enforced gaps
    assert_eq!(outcome.report.calls.total(), 8);
    assert!(elapsed >= Duration::from_millis(350), "elapsed {:?}", elapsed);
}

#[tokio::test]
async fn test_crawl_output_and_merge() {
    let server = MockServer::start().await;
    mount_small_catalogue(&server).await;
    mount_details(&server, "100,200", &[100, 200]).await;
    mount_details(&server, "300,400", &[300, 400]).await;
    mount_thumbnails(&server, "100,200", &[100, 200]).await;
    mount_thumbnails(&server, "300,400", &[300, 400]).await;

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let output_path = temp_dir.path().join("data").join("games.json");
    let corpus_path = temp_dir.path().join("corpus.json");

    std::fs::write(
        &corpus_path,
        r#"[{"id": 100, "name": "Old name", "genre": "Adventure"}, {"id": 999, "name": "Other"}]"#,
    )
    .unwrap();

    let config = create_test_config(&server, 10, 2);
    let outcome = run_crawl(&config, CancellationToken::new()).await.unwrap();

    write_records(&output_path, &outcome.records).unwrap();
    let written = read_records(&output_path).unwrap();
    assert_eq!(universe_ids(&written), vec!["100", "200", "300", "400"]);

    let summary = merge_into_corpus(&corpus_path, &outcome.records).unwrap();
    assert_eq!(summary.updated, 1);
    assert_eq!(summary.added, 3);
    assert_eq!(summary.total, 5);

    let corpus = read_records(&corpus_path).unwrap();
    assert_eq!(corpus[0]["name"], json!("Game 100"));
    assert_eq!(corpus[0]["genre"], json!("Adventure"));
    assert_eq!(corpus[1]["id"], json!(999));
}
