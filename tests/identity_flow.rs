mod common;

use common::{build_test_app, post_json};
use serde_json::json;

#[tokio::test]
async fn valid_credentials_verify_identity_on_chain() {
    let (app, _state, provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(
        &app,
        "/v1/identity/verify",
        json!({ "user_id": "user-1", "credentials": { "pin": "1234" } }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["user_id"], "user-1");
    assert_eq!(body["verification"]["status"], "verified");
    // Identity submissions go straight to the provider, not the batch queue.
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn rejected_credentials_return_unauthorized() {
    let (app, _state, provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(
        &app,
        "/v1/identity/verify",
        json!({ "user_id": "user-2", "credentials": { "pin": "0000" } }),
    )
    .await;
    assert_eq!(status, http::StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "IDENTITY_INVALID");
    // Nothing reaches the chain without a valid token.
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn blank_user_id_is_rejected() {
    let (app, _state, _provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(
        &app,
        "/v1/identity/verify",
        json!({ "user_id": "  ", "credentials": { "pin": "1234" } }),
    )
    .await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn missing_credentials_are_rejected() {
    let (app, _state, _provider) = build_test_app(10, 60_000).await;

    let (status, body) =
        post_json(&app, "/v1/identity/verify", json!({ "user_id": "user-3" })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}
