use super::error::AppError;
use super::schema::{
    HealthResponse, HistoryQuery, HistoryResponse, PollStatusResponse, StatusQuery,
    StatusResponse, SubmitVerificationResponse, VerificationRequest, VerificationStatus,
    WebhookPayload, WebhookResponse,
};
use crate::app::AppState;
use crate::service::metrics_service;
use crate::service::simba_client::ClientError;
use crate::service::validation_service::validate_verification_request;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info, warn};

pub async fn submit_verification(
    State(state): State<AppState>,
    Json(request): Json<VerificationRequest>,
) -> impl IntoResponse {
    if let Err(err) = validate_verification_request(&request) {
        return error_submit(err);
    }

    let data_id = request.data_id.clone();
    let request_id = state.batch.add_to_batch(request);
    info!(request_id = %request_id, data_id = %data_id, "verification queued");

    (
        StatusCode::OK,
        Json(SubmitVerificationResponse {
            accepted: true,
            request_id,
            status: Some(VerificationStatus::Pending),
            timestamp: Utc::now().to_rfc3339(),
            error_code: None,
            reason: "queued for batch verification".to_string(),
        }),
    )
}

pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> impl IntoResponse {
    match state.cache.get_verification_by_data_id(&query.data_id).await {
        Ok(Some(record)) => (
            StatusCode::OK,
            Json(StatusResponse {
                found: true,
                data_id: query.data_id,
                request_id: Some(record.request_id),
                status: Some(record.status),
                transaction_id: record.transaction_id,
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Ok(None) => error_status(
            query.data_id,
            AppError::not_found("NOT_FOUND", "no live verification for data id"),
        ),
        Err(e) => {
            error!(data_id = %query.data_id, error = %e, "status lookup failed");
            error_status(
                query.data_id,
                AppError::internal("CACHE_ERROR", "status lookup failed"),
            )
        }
    }
}

/// Pulls the provider's current view of a request and folds it back into the
/// cache, for callers that cannot wait on the webhook.
pub async fn poll_status(
    State(state): State<AppState>,
    Path(request_id): Path<String>,
) -> impl IntoResponse {
    match state.client.check_verification_status(&request_id).await {
        Ok(response) => {
            if let Err(e) = state
                .cache
                .update_verification_status(
                    &request_id,
                    response.status,
                    response.transaction_id.clone(),
                    response.verification_proof.clone(),
                    response.metadata.clone(),
                )
                .await
            {
                warn!(request_id = %request_id, error = %e, "cache refresh after poll failed");
            }
            (
                StatusCode::OK,
                Json(PollStatusResponse {
                    found: true,
                    request_id,
                    status: Some(response.status),
                    transaction_id: response.transaction_id,
                    error_code: None,
                    reason: "ok".to_string(),
                }),
            )
        }
        Err(ClientError::Provider { status: 404, .. }) => error_poll(
            request_id,
            AppError::not_found("NOT_FOUND", "provider does not know this request id"),
        ),
        Err(e) => {
            error!(request_id = %request_id, error = %e, "provider status poll failed");
            error_poll(
                request_id,
                AppError::internal("PROVIDER_ERROR", "provider status poll failed"),
            )
        }
    }
}

pub async fn get_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let limit = query.limit.unwrap_or(state.config.history_limit);
    match state.cache.get_history(&query.data_id, limit).await {
        Ok(events) => (
            StatusCode::OK,
            Json(HistoryResponse {
                data_id: query.data_id,
                events,
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(data_id = %query.data_id, error = %e, "history lookup failed");
            let err = AppError::internal("CACHE_ERROR", "history lookup failed");
            (
                err.status,
                Json(HistoryResponse {
                    data_id: query.data_id,
                    events: Vec::new(),
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get("X-Simba-Signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.client.validate_webhook_signature(&body, signature) {
        metrics_service::record_webhook_rejected();
        warn!("webhook rejected: signature mismatch");
        return error_webhook(AppError::unauthorized(
            "INVALID_SIGNATURE",
            "webhook signature mismatch",
        ));
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "webhook rejected: malformed payload");
            return error_webhook(AppError::bad_request(
                "VALIDATION_ERROR",
                "malformed webhook payload",
            ));
        }
    };

    match state
        .cache
        .update_verification_status(
            &payload.request_id,
            payload.status,
            payload.transaction_id,
            payload.verification_proof,
            None,
        )
        .await
    {
        Ok(()) => {
            metrics_service::record_webhook_accepted();
            info!(request_id = %payload.request_id, status = payload.status.as_str(), "webhook applied");
            (
                StatusCode::OK,
                Json(WebhookResponse {
                    success: true,
                    error_code: None,
                    reason: "ok".to_string(),
                }),
            )
        }
        Err(e) => {
            error!(request_id = %payload.request_id, error = %e, "webhook processing failed");
            error_webhook(AppError::internal("CACHE_ERROR", "webhook processing failed"))
        }
    }
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let kv_available = state.kv.get("healthcheck").await.is_ok();
    (
        StatusCode::OK,
        Json(HealthResponse {
            ok: kv_available,
            kv_available,
            queue_depth: state.batch.queue_depth(),
            metrics: metrics_service::snapshot(),
        }),
    )
}

fn error_submit(err: AppError) -> (StatusCode, Json<SubmitVerificationResponse>) {
    (
        err.status,
        Json(SubmitVerificationResponse {
            accepted: false,
            request_id: String::new(),
            status: None,
            timestamp: Utc::now().to_rfc3339(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_status(data_id: String, err: AppError) -> (StatusCode, Json<StatusResponse>) {
    (
        err.status,
        Json(StatusResponse {
            found: false,
            data_id,
            request_id: None,
            status: None,
            transaction_id: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_poll(request_id: String, err: AppError) -> (StatusCode, Json<PollStatusResponse>) {
    (
        err.status,
        Json(PollStatusResponse {
            found: false,
            request_id,
            status: None,
            transaction_id: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_webhook(err: AppError) -> (StatusCode, Json<WebhookResponse>) {
    (
        err.status,
        Json(WebhookResponse {
            success: false,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
