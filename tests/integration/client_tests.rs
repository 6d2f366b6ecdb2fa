//! Tests for the HTTP catalogue client

use serde_json::json;
use std::time::Duration;
use universe_crawler::config::RemoteConfig;
use universe_crawler::crawler::{HttpGraphClient, RemoteError, RemoteGraphClient};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_config(server: &MockServer) -> RemoteConfig {
    RemoteConfig {
        games_base_url: server.uri(),
        thumbnails_base_url: format!("{}/", server.uri()),
        thumbnail_size: "768x432".to_string(),
        user_agent: "TestBot/1.0".to_string(),
        timeout_secs: 5,
    }
}

fn client_for(server: &MockServer) -> HttpGraphClient {
    HttpGraphClient::new(&remote_config(server)).expect("Failed to build client")
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[tokio::test]
async fn test_fetch_recommendations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games/recommendations/game/100"))
        .and(header("user-agent", "TestBot/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "games": [
                {"universeId": 200, "name": "Two"},
                {"name": "No id"},
                {"universeId": "300"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let recommendations = client_for(&server)
        .fetch_recommendations("100")
        .await
        .unwrap();

    assert_eq!(recommendations, ids(&["200", "300"]));
}

#[tokio::test]
async fn test_fetch_details_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games"))
        .and(query_param("universeIds", "1,2,3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {"id": 1, "name": "First", "visits": 10},
                {"id": 3, "name": "Third", "visits": 30},
                {"name": "Orphan"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let details = client_for(&server)
        .fetch_details_batch(&ids(&["1", "2", "3"]))
        .await
        .unwrap();

    assert_eq!(details.len(), 2);
    assert_eq!(details["1"]["name"], json!("First"));
    assert_eq!(details["3"]["visits"], json!(30));
    assert!(!details.contains_key("2"));
}

#[tokio::test]
async fn test_fetch_thumbnails_batch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games/multiget/thumbnails"))
        .and(query_param("universeIds", "1,2"))
        .and(query_param("format", "png"))
        .and(query_param("size", "768x432"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "universeId": 1,
                    "thumbnails": [
                        {"imageUrl": "https://img.example.com/1a.png"},
                        {"imageUrl": "https://img.example.com/1b.png"}
                    ]
                },
                {"universeId": 2, "thumbnails": []}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let thumbnails = client_for(&server)
        .fetch_thumbnails_batch(&ids(&["1", "2"]))
        .await
        .unwrap();

    assert_eq!(thumbnails.len(), 1);
    assert_eq!(thumbnails["1"], "https://img.example.com/1a.png");
}

#[tokio::test]
async fn test_recommendations_skip_unusable_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games/recommendations/game/100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "games": [
                {"universeId": 200},
                {"universeId": 300},
                {"universeId": -1},
                {"universeId": {"id": 400}}
            ]
        })))
        .mount(&server)
        .await;

    let recommendations = client_for(&server)
        .fetch_recommendations("100")
        .await
        .unwrap();

    assert_eq!(recommendations, ids(&["200", "300"]));
}

#[tokio::test]
async fn test_thumbnails_skip_unusable_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games/multiget/thumbnails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "universeId": 1,
                    "thumbnails": [{"imageUrl": "https://img.example.com/1.png"}]
                },
                {
                    "universeId": 3.0,
                    "thumbnails": [{"imageUrl": "https://img.example.com/3.png"}]
                }
            ]
        })))
        .mount(&server)
        .await;

    let thumbnails = client_for(&server)
        .fetch_thumbnails_batch(&ids(&["1", "3"]))
        .await
        .unwrap();

    assert_eq!(thumbnails.len(), 1);
    assert_eq!(thumbnails["1"], "https://img.example.com/1.png");
}

#[tokio::test]
async fn test_server_error_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_recommendations("1").await;

    match result {
        Err(RemoteError::Status { status, .. }) => assert_eq!(status.as_u16(), 503),
        other => panic!("expected a status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_json_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/games"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let result = client_for(&server).fetch_details_batch(&ids(&["1"])).await;

    assert!(matches!(result, Err(RemoteError::Decode { .. })));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"games": []}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = RemoteConfig {
        timeout_secs: 1,
        ..remote_config(&server)
    };
    let client = HttpGraphClient::new(&config).unwrap();

    let result = client.fetch_recommendations("1").await;

    assert!(matches!(result, Err(RemoteError::Timeout { .. })));
}

#[tokio::test]
async fn test_unreachable_service_is_a_transport_error() {
    let config = RemoteConfig {
        games_base_url: "http://127.0.0.1:1".to_string(),
        timeout_secs: 2,
        ..Default::default()
    };

    let client = HttpGraphClient::new(&config).unwrap();
    let result = client.fetch_recommendations("1").await;

    assert!(matches!(
        result,
        Err(RemoteError::Transport { .. }) | Err(RemoteError::Timeout { .. })
    ));
}
