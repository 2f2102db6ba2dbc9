//! Integration tests for GeminiClient.
//!
//! Uses wiremock for the generateContent endpoint. The live test only runs
//! with `--features live_gemini` and a real GEMINI_API_KEY.

use irradiate_council::clients::{GeminiClient, GenerativeModel, ModelError};
use irradiate_council::config::GeminiConfig;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn create_test_client(mock_server: &MockServer, timeout_ms: u64) -> GeminiClient {
    let cfg = GeminiConfig {
        base_url: mock_server.uri(),
        timeout_ms,
        ..GeminiConfig::default()
    };
    GeminiClient::new(&cfg, "test-key".to_string()).expect("failed to create client")
}

#[tokio::test]
async fn test_request_shape_and_text_concatenation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{ "parts": [{ "text": "評価して" }] }],
            "generationConfig": { "responseMimeType": "application/json" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "text": "{\"overallScore\"" }, { "text": ": 64}" }]
                },
                "finishReason": "STOP"
            }],
            "modelVersion": "gemini-1.5-flash-002"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 5_000);
    let response = client.generate("評価して").await.expect("generate failed");

    assert_eq!(response.text, "{\"overallScore\": 64}");
    assert_eq!(response.model, "gemini-1.5-flash-002");
    assert_eq!(response.finish_reason.as_deref(), Some("STOP"));
}

#[tokio::test]
async fn test_temperature_is_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_partial_json(json!({
            "generationConfig": { "temperature": 0.8 }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "{}" }] } }]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 5_000);
    client.generate("x").await.expect("generate failed");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 5_000);
    match client.generate("x").await {
        Err(ModelError::Status { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "overloaded");
        }
        other => panic!("expected Status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blocked_prompt() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 5_000);
    match client.generate("x").await {
        Err(ModelError::Blocked(reason)) => assert_eq!(reason, "SAFETY"),
        other => panic!("expected Blocked, got {other:?}"),
    }
}

#[tokio::test]
async fn test_no_candidates_is_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "candidates": [] })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 5_000);
    assert!(matches!(client.generate("x").await, Err(ModelError::Empty)));
}

#[tokio::test]
async fn test_slow_upstream_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "candidates": [] }))
                .set_delay(std::time::Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 50);
    assert!(matches!(
        client.generate("x").await,
        Err(ModelError::Timeout { timeout_ms: 50 })
    ));
}

#[tokio::test]
#[cfg(feature = "live_gemini")]
async fn test_live_gemini_returns_json() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let Ok(key) = std::env::var("GEMINI_API_KEY") else {
        eprintln!("Skipping live Gemini test - set GEMINI_API_KEY to run");
        return Ok(());
    };

    let client = GeminiClient::new(&GeminiConfig::default(), key)?;
    let response = client
        .generate("Return the JSON object {\"answer\": \"test\"} and nothing else.")
        .await?;

    assert!(response.text.contains("test"));
    println!("Response: {}", response.text);
    Ok(())
}
