use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use reelsense::client::{ClientError, ReviewClient};
use reelsense::inference::EngineState;
use reelsense::server::router;
use reelsense::Sentiment;

use crate::support::{engine, engine_with, Options, EXAMPLE_REVIEW};

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn post_json(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/predict")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_predict_returns_both_models() {
    let (_, engine) = engine();
    let app = router(Arc::new(engine));

    let body = json!({ "review": EXAMPLE_REVIEW }).to_string();
    let (status, body) = send(app, post_json(body)).await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["lstm"]["sentiment"], "Positive");
    assert!((json["lstm"]["confidence"].as_f64().unwrap() - 0.82).abs() < 1e-6);
    assert!((json["lstm"]["score"].as_f64().unwrap() - 0.82).abs() < 1e-6);
    assert_eq!(json["rnn"]["sentiment"], "Negative");
    assert!((json["rnn"]["confidence"].as_f64().unwrap() - 0.87).abs() < 1e-6);
    assert!((json["rnn"]["score"].as_f64().unwrap() - 0.13).abs() < 1e-6);
}

#[tokio::test]
async fn test_missing_review_is_bad_request() {
    let (_, engine) = engine();
    let app = router(Arc::new(engine));

    for body in ["{}", r#"{"review": ""}"#, r#"{"review": null}"#] {
        let (status, bytes) = send(app.clone(), post_json(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);

        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "No review text provided");
        assert_eq!(json["kind"], "invalid_input");
        assert!(json.get("details").is_none());
    }
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (counters, engine) = engine();
    let app = router(Arc::new(engine));

    let (status, bytes) = send(app, post_json("review=great")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "Invalid request body");
    assert_eq!(json["kind"], "invalid_input");
    assert_eq!(counters.fetches(), 0);
}

#[tokio::test]
async fn test_load_failure_is_server_error() {
    let (_, engine) = engine_with(Options { vocabulary_failures: usize::MAX, ..Options::default() });
    let app = router(Arc::new(engine));

    let body = json!({ "review": EXAMPLE_REVIEW }).to_string();
    let (status, bytes) = send(app, post_json(body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"], "Failed to process prediction");
    assert_eq!(json["kind"], "vocabulary_unavailable");
    assert!(json["details"].as_str().unwrap().contains("connection refused"));
}

#[tokio::test]
async fn test_liveness_endpoints_do_not_load() {
    let (counters, engine) = engine();
    let app = router(Arc::new(engine));

    let (status, bytes) = send(app.clone(), get("/api/predict")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json, json!({ "status": "ok", "message": "Prediction API is running" }));

    let (status, bytes) = send(app.clone(), get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(bytes).unwrap(), "ReelSense is running!");

    let (status, bytes) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["state"], "cold");
    assert_eq!(json["vocabulary_loaded"], false);
    assert_eq!(json["models_loaded"], false);

    assert_eq!(counters.fetches(), 0);
    assert_eq!(counters.loads(), 0);
}

#[tokio::test]
async fn test_client_against_running_server() {
    let (_, engine) = engine();
    let app = router(Arc::new(engine));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = ReviewClient::new(format!("http://{}", addr), Duration::from_secs(5)).unwrap();

    let health = client.health().await.unwrap();
    assert_eq!(health.engine.state, EngineState::Cold);

    let prediction = client.predict(EXAMPLE_REVIEW).await.unwrap();
    assert_eq!(prediction.lstm.sentiment, Sentiment::Positive);
    assert_eq!(prediction.rnn.sentiment, Sentiment::Negative);

    let health = client.health().await.unwrap();
    assert_eq!(health.engine.state, EngineState::Warm);
    assert!(health.engine.warm_since.is_some());

    match client.predict("").await.unwrap_err() {
        ClientError::Service { status, error, kind, .. } => {
            assert_eq!(status, 400);
            assert_eq!(error, "No review text provided");
            assert_eq!(kind.as_deref(), Some("invalid_input"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_client_timeout_during_cold_start_does_not_reload() {
    let (counters, engine) = engine();
    let app = router(Arc::new(engine));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    let base = format!("http://{}", addr);

    let impatient = ReviewClient::new(base.clone(), Duration::from_millis(30)).unwrap();
    assert!(impatient.predict(EXAMPLE_REVIEW).await.is_err());

    let client = ReviewClient::new(base, Duration::from_secs(5)).unwrap();
    client.predict(EXAMPLE_REVIEW).await.unwrap();

    assert_eq!(counters.fetches(), 1);
    assert_eq!(counters.loads(), 2);
}
