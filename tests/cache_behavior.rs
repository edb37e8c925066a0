use chrono::Utc;
use simba_gateway::infra::KvStore;
use simba_gateway::module::verification::schema::{VerificationResponse, VerificationStatus};
use simba_gateway::service::cache_service::VerificationCache;

fn cache() -> VerificationCache {
    VerificationCache::new(KvStore::memory(), 3600, 50)
}

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
async fn round_trip_by_data_id() {
    let cache = cache();
    let mut verification = response("req-1", VerificationStatus::Verified);
    verification.transaction_id = Some("tx-1".to_string());

    cache
        .set_verification("req-1", "acc-1", &verification)
        .await
        .expect("set");

    let found = cache
        .get_verification_by_data_id("acc-1")
        .await
        .expect("get")
        .expect("present");
    assert_eq!(found.request_id, "req-1");
    assert_eq!(found.status, VerificationStatus::Verified);
    assert_eq!(found.transaction_id.as_deref(), Some("tx-1"));
    assert_eq!(found.data_id.as_deref(), Some("acc-1"));
}

#[tokio::test]
async fn update_unknown_request_is_noop() {
    let cache = cache();
    cache
        .update_verification_status(
            "req-missing",
            VerificationStatus::Verified,
            Some("tx-9".to_string()),
            None,
            None,
        )
        .await
        .expect("update");

    assert!(cache
        .get_verification_by_request_id("req-missing")
        .await
        .expect("get")
        .is_none());
}

#[tokio::test]
async fn update_refreshes_data_reference() {
    let cache = cache();
    cache
        .set_verification("req-2", "acc-2", &response("req-2", VerificationStatus::Pending))
        .await
        .expect("set");

    cache
        .update_verification_status(
            "req-2",
            VerificationStatus::Verified,
            Some("tx-2".to_string()),
            Some("proof-2".to_string()),
            None,
        )
        .await
        .expect("update");

    let found = cache
        .get_verification_by_data_id("acc-2")
        .await
        .expect("get")
        .expect("present");
    assert_eq!(found.status, VerificationStatus::Verified);
    assert_eq!(found.transaction_id.as_deref(), Some("tx-2"));
    assert_eq!(found.verification_proof.as_deref(), Some("proof-2"));
}

#[tokio::test]
async fn invalidate_data_leaves_request_record() {
    let cache = cache();
    cache
        .set_verification("req-3", "acc-3", &response("req-3", VerificationStatus::Pending))
        .await
        .expect("set");

    cache.invalidate_data_cache("acc-3").await.expect("invalidate");

    assert!(cache
        .get_verification_by_data_id("acc-3")
        .await
        .expect("get")
        .is_none());
    assert!(cache
        .get_verification_by_request_id("req-3")
        .await
        .expect("get")
        .is_some());
}

#[tokio::test]
async fn invalidation_is_idempotent() {
    let cache = cache();
    cache.invalidate_data_cache("never-set").await.expect("first");
    cache.invalidate_data_cache("never-set").await.expect("second");
    cache
        .invalidate_request_cache("never-set")
        .await
        .expect("request");
}

#[tokio::test]
async fn history_is_newest_first_and_capped() {
    let cache = VerificationCache::new(KvStore::memory(), 3600, 3);
    for i in 0..5 {
        cache
            .set_verification(
                &format!("req-h{i}"),
                "acc-h",
                &response(&format!("req-h{i}"), VerificationStatus::Pending),
            )
            .await
            .expect("set");
    }

    let events = cache.get_history("acc-h", 10).await.expect("history");
    assert_eq!(events.len(), 3);
    assert_eq!(events[0].request_id, "req-h4");
    assert_eq!(events[2].request_id, "req-h2");

    let limited = cache.get_history("acc-h", 1).await.expect("history");
    assert_eq!(limited.len(), 1);
    assert_eq!(limited[0].request_id, "req-h4");
}
