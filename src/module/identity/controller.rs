use super::schema::{IdentityVerifyRequest, IdentityVerifyResponse};
use crate::app::AppState;
use crate::module::verification::error::AppError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::{error, info};

pub async fn verify_identity(
    State(state): State<AppState>,
    Json(req): Json<IdentityVerifyRequest>,
) -> impl IntoResponse {
    if req.user_id.trim().is_empty() {
        return error_identity(
            req.user_id,
            AppError::bad_request("VALIDATION_ERROR", "user_id is required"),
        );
    }
    let Some(credentials) = req.credentials else {
        return error_identity(
            req.user_id,
            AppError::bad_request("VALIDATION_ERROR", "credentials are required"),
        );
    };

    match state
        .identity
        .validate_and_verify(&req.user_id, &credentials)
        .await
    {
        Ok(outcome) if outcome.is_valid => {
            info!(user_id = %req.user_id, "identity verified");
            (
                StatusCode::OK,
                Json(IdentityVerifyResponse {
                    success: true,
                    user_id: req.user_id,
                    verification: outcome.verification,
                    error_code: None,
                    reason: "ok".to_string(),
                }),
            )
        }
        Ok(_) => error_identity(
            req.user_id,
            AppError::unauthorized("IDENTITY_INVALID", "identity validation failed"),
        ),
        Err(e) => {
            error!(user_id = %req.user_id, error = %e, "identity verification failed");
            error_identity(
                req.user_id,
                AppError::internal("PROVIDER_ERROR", "identity verification failed"),
            )
        }
    }
}

fn error_identity(user_id: String, err: AppError) -> (StatusCode, Json<IdentityVerifyResponse>) {
    (
        err.status,
        Json(IdentityVerifyResponse {
            success: false,
            user_id,
            verification: None,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
