use axum::extract::{Path, State};
use axum::routing::{get as route_get, post};
use axum::{Json, Router};
use chrono::Utc;
use http::Request;
use serde_json::{json, Value};
use simba_gateway::app::{build_router, AppState};
use simba_gateway::config::environment::AppConfig;
use simba_gateway::infra::KvStore;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

pub struct MockProvider {
    pub base_url: String,
    pub verify_calls: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn call_count(&self) -> usize {
        self.verify_calls.load(Ordering::SeqCst)
    }
}

async fn mock_verify(
    State(calls): State<Arc<AtomicUsize>>,
    Json(request): Json<Value>,
) -> Json<Value> {
    calls.fetch_add(1, Ordering::SeqCst);
    // Identity checks settle synchronously; everything else stays pending
    // until the webhook lands.
    let status = if request["data_type"] == "identity" {
        "verified"
    } else {
        "pending"
    };
    Json(json!({
        "request_id": format!("prov-{}", Uuid::new_v4()),
        "status": status,
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn mock_status(Path(request_id): Path<String>) -> Json<Value> {
    Json(json!({
        "request_id": request_id,
        "status": "verified",
        "transaction_id": "tx-status",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

async fn mock_validate_identity(Json(body): Json<Value>) -> (http::StatusCode, Json<Value>) {
    if body["credentials"]["pin"] == "1234" {
        (
            http::StatusCode::OK,
            Json(json!({ "token": format!("tok-{}", Uuid::new_v4()) })),
        )
    } else {
        (
            http::StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "invalid credentials" })),
        )
    }
}

async fn mock_transaction(Path(transaction_id): Path<String>) -> Json<Value> {
    Json(json!({ "transaction_id": transaction_id, "exists": true }))
}

/// Stands in for the SIMBA Chain API on a local port.
pub async fn spawn_mock_provider() -> MockProvider {
    let verify_calls = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/verify", post(mock_verify))
        .route("/status/:request_id", route_get(mock_status))
        .route("/transaction/:transaction_id", route_get(mock_transaction))
        .route("/validate", post(mock_validate_identity))
        .with_state(Arc::clone(&verify_calls));

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock provider");
    let addr = listener.local_addr().expect("mock provider addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    MockProvider {
        base_url: format!("http://{addr}"),
        verify_calls,
    }
}

pub fn test_config(api_endpoint: &str, batch_size: usize, batch_interval_ms: u64) -> AppConfig {
    AppConfig {
        rust_env: "test".to_string(),
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        redis_url: None,
        simba_api_key: "test-api-key".to_string(),
        simba_api_endpoint: api_endpoint.to_string(),
        simba_webhook_secret: WEBHOOK_SECRET.to_string(),
        auth_endpoint: api_endpoint.to_string(),
        verification_ttl_seconds: 3600,
        retry_attempts: 1,
        retry_delay_ms: 10,
        batch_size,
        batch_interval_ms,
        cost_baseline_per_item: None,
        history_limit: 50,
    }
}

pub async fn build_test_state(batch_size: usize, batch_interval_ms: u64) -> (AppState, MockProvider) {
    let provider = spawn_mock_provider().await;
    let config = test_config(&provider.base_url, batch_size, batch_interval_ms);
    let state = AppState::new(config, KvStore::memory())
        .await
        .expect("app state");
    (state, provider)
}

pub async fn build_test_app(batch_size: usize, batch_interval_ms: u64) -> (Router, AppState, MockProvider) {
    let (state, provider) = build_test_state(batch_size, batch_interval_ms).await;
    (build_router(state.clone()), state, provider)
}

pub async fn post_json(app: &Router, uri: &str, body: Value) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            serde_json::to_vec(&body).expect("serialize request"),
        ))
        .expect("build request");
    send(app, request).await
}

pub async fn post_signed_webhook(
    app: &Router,
    body: &Value,
    signature: &str,
) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/v1/verifications/webhook")
        .header("content-type", "application/json")
        .header("X-Simba-Signature", signature)
        .body(axum::body::Body::from(
            serde_json::to_vec(body).expect("serialize webhook"),
        ))
        .expect("build request");
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("build request");
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> (http::StatusCode, Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(axum::body::Body::empty())
        .expect("build request");
    send(app, request).await
}

async fn send(app: &Router, request: Request<axum::body::Body>) -> (http::StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("request failed");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let payload = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("deserialize response")
    };
    (status, payload)
}

pub fn submit_body(data_id: &str) -> Value {
    json!({
        "data_id": data_id,
        "data_type": "accessibility",
        "payload": { "captions": true },
        "metadata": {
            "service_id": "accessibility-settings",
            "timestamp": Utc::now().to_rfc3339(),
            "priority": "normal"
        }
    })
}

/// Polls a condition until it holds or the timeout elapses.
pub async fn wait_for<F>(mut condition: F, timeout: Duration) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}
