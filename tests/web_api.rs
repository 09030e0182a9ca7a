// Router-level tests — the full HTTP surface driven through
// tower::ServiceExt::oneshot with a mock inference backend injected,
// so no network is involved anywhere.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use cinder::config::Config;
use cinder::inference::InferenceBackend;
use cinder::moderation::Moderator;
use cinder::web::{build_router, AppState};

// ============================================================
// Test harness
// ============================================================

/// Canned-response backend. Routes on the default model identifiers.
struct MockBackend;

#[async_trait]
impl InferenceBackend for MockBackend {
    async fn invoke(&self, model: &str, _payload: Value) -> Result<Value> {
        if model.contains("distilbert") {
            Ok(json!([
                {"label": "POSITIVE", "score": 0.98},
                {"label": "NEGATIVE", "score": 0.02}
            ]))
        } else if model.contains("llama") {
            Ok(json!({
                "response": "{\"category\": \"informational\", \"confidence\": 0.9, \"isSpam\": false}"
            }))
        } else if model.contains("bart") {
            Ok(json!({"summary": "  a short summary  "}))
        } else {
            anyhow::bail!("MockBackend has no canned response for {model}")
        }
    }
}

/// Backend that always fails the way the real Workers AI client does.
struct FailingBackend;

#[async_trait]
impl InferenceBackend for FailingBackend {
    async fn invoke(&self, _model: &str, _payload: Value) -> Result<Value> {
        anyhow::bail!("Workers AI returned 503 Service Unavailable")
    }
}

/// Backend where only summarization fails — for join atomicity tests.
struct SummarizationFailsBackend;

#[async_trait]
impl InferenceBackend for SummarizationFailsBackend {
    async fn invoke(&self, model: &str, payload: Value) -> Result<Value> {
        if model.contains("bart") {
            anyhow::bail!("summary backend exploded")
        }
        MockBackend.invoke(model, payload).await
    }
}

/// Backend answering summarization with an object carrying no usable
/// field, forcing the truncation fallback.
struct BareSummaryBackend;

#[async_trait]
impl InferenceBackend for BareSummaryBackend {
    async fn invoke(&self, model: &str, payload: Value) -> Result<Value> {
        if model.contains("bart") {
            return Ok(json!({"tokens_used": 7}));
        }
        MockBackend.invoke(model, payload).await
    }
}

fn router_with(backend: Arc<dyn InferenceBackend>) -> Router {
    let config = Config::default();
    let state = AppState {
        moderator: Arc::new(Moderator::new(backend, &config)),
        config: Arc::new(config),
    };
    build_router(state)
}

fn post_moderate(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/moderate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// A valid text comfortably inside the [10, 5000] bounds but below the
/// summarization gate.
fn short_text() -> String {
    "This is a perfectly reasonable message.".to_string()
}

/// A valid text above the 500-char summarization gate.
fn long_text() -> String {
    "word ".repeat(120).trim_end().to_string()
}

// ============================================================
// Health and routing
// ============================================================

#[tokio::test]
async fn health_check_responds() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], "1.0.0");
}

#[tokio::test]
async fn root_path_serves_health_check() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn unknown_route_is_404_envelope() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(Request::get("/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
    assert!(body["error"]["message"]
        .as_str()
        .unwrap()
        .contains("/unknown"));
}

#[tokio::test]
async fn wrong_method_on_moderate_is_invalid_request() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(Request::get("/api/moderate").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

// ============================================================
// CORS
// ============================================================

#[tokio::test]
async fn preflight_returns_204_with_permissive_headers() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/moderate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        response.headers()["Access-Control-Allow-Origin"],
        "*"
    );
    assert_eq!(response.headers()["Access-Control-Max-Age"], "86400");
}

#[tokio::test]
async fn preflight_applies_on_any_path() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/anywhere")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn ordinary_responses_carry_cors_headers() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers()["Access-Control-Allow-Origin"],
        "*"
    );
    assert_eq!(
        response.headers()["Access-Control-Allow-Methods"],
        "GET, POST, OPTIONS"
    );
}

// ============================================================
// Validation gate
// ============================================================

#[tokio::test]
async fn missing_text_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app.oneshot(post_moderate(json!({}))).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "MISSING_TEXT");
}

#[tokio::test]
async fn non_string_text_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": 42})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "MISSING_TEXT");
}

#[tokio::test]
async fn short_text_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": "short"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "TEXT_TOO_SHORT");
}

#[tokio::test]
async fn overlong_text_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": "a".repeat(5001)})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "TEXT_TOO_LONG");
}

#[tokio::test]
async fn text_at_bounds_is_accepted() {
    for text in ["a".repeat(10), "a".repeat(5000)] {
        let app = router_with(Arc::new(MockBackend));
        let response = app.oneshot(post_moderate(json!({"text": text}))).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}

#[tokio::test]
async fn malformed_json_body_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/moderate")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn unknown_feature_name_is_rejected() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(
            json!({"text": short_text(), "features": ["bogus"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INVALID_REQUEST");
}

// ============================================================
// Moderation happy paths
// ============================================================

#[tokio::test]
async fn long_text_runs_all_three_features() {
    let text = long_text();
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": text.clone()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["text"], text);

    assert_eq!(body["data"]["sentiment"]["label"], "POSITIVE");
    assert_eq!(body["data"]["sentiment"]["score"], 0.98);
    assert_eq!(body["data"]["sentiment"]["confidence"], 98);

    assert_eq!(body["data"]["classification"]["category"], "informational");
    assert_eq!(body["data"]["classification"]["isSpam"], false);

    // Mock summary comes back padded; the normalizer trims it
    assert_eq!(body["data"]["summarization"]["summary"], "a short summary");
    assert_eq!(body["data"]["summarization"]["summaryLength"], 15);
    assert_eq!(
        body["data"]["summarization"]["originalLength"],
        text.chars().count()
    );

    assert_eq!(
        body["metadata"]["features"],
        json!(["sentiment", "classification", "summarization"])
    );
    assert!(body["metadata"]["processingTime"].is_number());
    assert!(body["metadata"]["timestamp"].is_string());
}

#[tokio::test]
async fn short_text_skips_summarization() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": short_text()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    // Gate skipped the call, so the key is absent entirely...
    assert!(body["data"]["sentiment"].is_object());
    assert!(body["data"]["classification"].is_object());
    assert!(body["data"].get("summarization").is_none());

    // ...but the resolved feature list still names it
    assert_eq!(
        body["metadata"]["features"],
        json!(["sentiment", "classification", "summarization"])
    );
}

#[tokio::test]
async fn feature_subset_runs_only_requested() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(
            json!({"text": short_text(), "features": ["sentiment"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["data"]["sentiment"].is_object());
    assert!(body["data"].get("classification").is_none());
    assert!(body["data"].get("summarization").is_none());
    assert_eq!(body["metadata"]["features"], json!(["sentiment"]));
}

#[tokio::test]
async fn all_sentinel_expands_to_every_feature() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(
            json!({"text": long_text(), "features": ["all"]}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(
        body["metadata"]["features"],
        json!(["sentiment", "classification", "summarization"])
    );
    assert!(body["data"]["summarization"].is_object());
}

#[tokio::test]
async fn max_length_option_caps_the_truncation_fallback() {
    let text = long_text();
    let app = router_with(Arc::new(BareSummaryBackend));
    let response = app
        .oneshot(post_moderate(json!({
            "text": text.clone(),
            "features": ["summarization"],
            "options": {"maxLength": 20}
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let summary = body["data"]["summarization"]["summary"].as_str().unwrap();
    assert_eq!(summary, text.chars().take(20).collect::<String>().trim_end());
}

#[tokio::test]
async fn success_responses_are_not_cached() {
    let app = router_with(Arc::new(MockBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": short_text()})))
        .await
        .unwrap();

    assert_eq!(response.headers()["Cache-Control"], "no-cache");
}

// ============================================================
// Failure atomicity and error classification
// ============================================================

#[tokio::test]
async fn backend_failure_is_ai_error_with_no_partial_data() {
    let app = router_with(Arc::new(FailingBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": short_text()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AI_ERROR");
    assert!(body["error"]["details"]["originalError"]
        .as_str()
        .unwrap()
        .contains("Workers AI"));
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn one_failing_branch_fails_the_whole_request() {
    // Sentiment and classification would succeed; summarization fails.
    let app = router_with(Arc::new(SummarizationFailsBackend));
    let response = app
        .oneshot(post_moderate(json!({"text": long_text()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    // No partial results from the branches that had already computed
    assert!(body.get("data").is_none());
}

#[tokio::test]
async fn non_ai_failure_is_internal_error() {
    struct OpaqueFailure;

    #[async_trait]
    impl InferenceBackend for OpaqueFailure {
        async fn invoke(&self, _model: &str, _payload: Value) -> Result<Value> {
            anyhow::bail!("something else broke")
        }
    }

    let app = router_with(Arc::new(OpaqueFailure));
    let response = app
        .oneshot(post_moderate(json!({"text": short_text()})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
}
