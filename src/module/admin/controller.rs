use super::schema::{
    CreateBackupResponse, IntegrityResponse, ListBackupsResponse, RestoreBackupRequest,
    RestoreBackupResponse,
};
use crate::app::AppState;
use crate::module::verification::error::AppError;
use crate::service::backup_service::BackupError;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tracing::{error, info};

pub async fn create_backup(State(state): State<AppState>) -> impl IntoResponse {
    match state.backup.create_backup().await {
        Ok(backup_id) => (
            StatusCode::OK,
            Json(CreateBackupResponse {
                success: true,
                backup_id: Some(backup_id),
                timestamp: Utc::now().to_rfc3339(),
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "backup creation failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(CreateBackupResponse {
                    success: false,
                    backup_id: None,
                    timestamp: Utc::now().to_rfc3339(),
                    error_code: Some("BACKUP_ERROR".to_string()),
                    reason: "failed to create backup".to_string(),
                }),
            )
        }
    }
}

pub async fn list_backups(State(state): State<AppState>) -> impl IntoResponse {
    match state.backup.list_backups().await {
        Ok(backups) => (
            StatusCode::OK,
            Json(ListBackupsResponse {
                success: true,
                backups,
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "backup listing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ListBackupsResponse {
                    success: false,
                    backups: Vec::new(),
                    error_code: Some("BACKUP_ERROR".to_string()),
                    reason: "failed to list backups".to_string(),
                }),
            )
        }
    }
}

pub async fn restore_backup(
    State(state): State<AppState>,
    Json(req): Json<RestoreBackupRequest>,
) -> impl IntoResponse {
    let Some(backup_id) = req.backup_id.filter(|id| !id.trim().is_empty()) else {
        return error_restore(
            AppError::bad_request("VALIDATION_ERROR", "backup_id is required"),
            None,
        );
    };

    match state.backup.restore_backup(&backup_id).await {
        Ok(restored_count) => {
            info!(backup_id = %backup_id, restored_count, "backup restore complete");
            (
                StatusCode::OK,
                Json(RestoreBackupResponse {
                    success: true,
                    backup_id: Some(backup_id),
                    restored_count,
                    timestamp: Utc::now().to_rfc3339(),
                    error_code: None,
                    reason: "ok".to_string(),
                }),
            )
        }
        Err(BackupError::NotFound(_)) => error_restore(
            AppError::not_found("NOT_FOUND", "backup not found"),
            Some(backup_id),
        ),
        Err(e) => {
            error!(backup_id = %backup_id, error = %e, "backup restore failed");
            error_restore(
                AppError::internal("BACKUP_ERROR", "failed to restore backup"),
                Some(backup_id),
            )
        }
    }
}

pub async fn verify_integrity(State(state): State<AppState>) -> impl IntoResponse {
    match state.backup.verify_integrity().await {
        Ok(report) => (
            StatusCode::OK,
            Json(IntegrityResponse {
                success: true,
                total: report.total,
                valid: report.valid,
                invalid: report.invalid,
                details: report.details,
                timestamp: Utc::now().to_rfc3339(),
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "integrity check failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(IntegrityResponse {
                    success: false,
                    total: 0,
                    valid: 0,
                    invalid: 0,
                    details: Vec::new(),
                    timestamp: Utc::now().to_rfc3339(),
                    error_code: Some("INTEGRITY_ERROR".to_string()),
                    reason: "failed to verify integrity".to_string(),
                }),
            )
        }
    }
}

fn error_restore(
    err: AppError,
    backup_id: Option<String>,
) -> (StatusCode, Json<RestoreBackupResponse>) {
    (
        err.status,
        Json(RestoreBackupResponse {
            success: false,
            backup_id,
            restored_count: 0,
            timestamp: Utc::now().to_rfc3339(),
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
