mod common;

use chrono::Utc;
use common::{build_test_app, get, post_json};
use serde_json::json;
use simba_gateway::module::verification::schema::{VerificationResponse, VerificationStatus};

fn response(request_id: &str, status: VerificationStatus) -> VerificationResponse {
    VerificationResponse {
        request_id: request_id.to_string(),
        status,
        transaction_id: None,
        timestamp: Utc::now().to_rfc3339(),
        expires_at: None,
        verification_proof: None,
        metadata: None,
    }
}

#[tokio::test]
async fn empty_backup_still_allocates_an_id() {
    let (app, _state, _provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(&app, "/v1/admin/backups", json!({})).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["success"], true);
    let backup_id = body["backup_id"].as_str().expect("backup id");
    assert!(backup_id.starts_with("backup:"));

    let (status, body) = get(&app, "/v1/admin/backups").await;
    assert_eq!(status, http::StatusCode::OK);
    let backups = body["backups"].as_array().expect("backups");
    assert_eq!(backups.len(), 1);
    assert_eq!(backups[0]["id"], backup_id);
    assert_eq!(backups[0]["count"], 0);
}

#[tokio::test]
async fn restore_requires_backup_id() {
    let (app, _state, _provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(&app, "/v1/admin/backups/restore", json!({})).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn restore_unknown_backup_is_404() {
    let (app, _state, _provider) = build_test_app(10, 60_000).await;

    let (status, body) = post_json(
        &app,
        "/v1/admin/backups/restore",
        json!({ "backup_id": "backup:12345" }),
    )
    .await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error_code"], "NOT_FOUND");
}

#[tokio::test]
async fn backup_restore_round_trip() {
    let (app, state, _provider) = build_test_app(10, 60_000).await;
    state
        .cache
        .set_verification("req-b1", "acc-b1", &response("req-b1", VerificationStatus::Pending))
        .await
        .expect("seed cache");

    let (_, body) = post_json(&app, "/v1/admin/backups", json!({})).await;
    let backup_id = body["backup_id"].as_str().expect("backup id").to_string();

    state
        .cache
        .invalidate_request_cache("req-b1")
        .await
        .expect("invalidate");
    assert!(state
        .cache
        .get_verification_by_request_id("req-b1")
        .await
        .expect("read")
        .is_none());

    let (status, body) = post_json(
        &app,
        "/v1/admin/backups/restore",
        json!({ "backup_id": backup_id }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["restored_count"], 1);

    let restored = state
        .cache
        .get_verification_by_request_id("req-b1")
        .await
        .expect("read")
        .expect("restored record");
    assert_eq!(restored.status, VerificationStatus::Pending);
    assert_eq!(restored.data_id.as_deref(), Some("acc-b1"));
}

#[tokio::test]
async fn integrity_validates_entries_and_reconciles_dangling_references() {
    let (app, state, _provider) = build_test_app(10, 60_000).await;

    // Healthy pending entry: trivially valid, no provider check.
    state
        .cache
        .set_verification("req-i1", "acc-i1", &response("req-i1", VerificationStatus::Pending))
        .await
        .expect("seed pending");

    // Verified entry with a transaction: checked against the provider mock.
    let mut verified = response("req-i2", VerificationStatus::Verified);
    verified.transaction_id = Some("tx-i2".to_string());
    state
        .cache
        .set_verification("req-i2", "acc-i2", &verified)
        .await
        .expect("seed verified");

    // Dangling data reference: request record deleted out from under it.
    state
        .cache
        .set_verification("req-i3", "acc-i3", &response("req-i3", VerificationStatus::Pending))
        .await
        .expect("seed dangling");
    state
        .cache
        .invalidate_request_cache("req-i3")
        .await
        .expect("invalidate");

    let (status, body) = get(&app, "/v1/admin/integrity").await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["total"], 3);
    assert_eq!(body["valid"], 2);
    assert_eq!(body["invalid"], 1);

    let details = body["details"].as_array().expect("details");
    let dangling = details
        .iter()
        .find(|d| d["key"] == "verification:data:acc-i3")
        .expect("dangling detail");
    assert_eq!(dangling["valid"], false);

    // The reconciliation pass deletes the dangling reference.
    assert!(state
        .cache
        .get_verification_by_data_id("acc-i3")
        .await
        .expect("read")
        .is_none());
    let (status, _) = get(&app, "/v1/verifications/status?data_id=acc-i3").await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}
