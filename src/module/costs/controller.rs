use super::schema::{ClearCostsResponse, CostSummaryResponse, SummaryQuery, TrackCostResponse};
use crate::app::AppState;
use crate::module::verification::error::AppError;
use crate::service::cost_service::VerificationCost;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::{error, info};

pub async fn track_cost(
    State(state): State<AppState>,
    Json(row): Json<VerificationCost>,
) -> impl IntoResponse {
    if row.transaction_id.trim().is_empty() || row.data_id.trim().is_empty() {
        return error_track(
            AppError::bad_request("VALIDATION_ERROR", "transaction_id and data_id are required"),
            state.costs.len().await,
        );
    }

    match state.costs.track_cost(row).await {
        Ok(()) => (
            StatusCode::OK,
            Json(TrackCostResponse {
                success: true,
                count: state.costs.len().await,
                error_code: None,
                reason: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "cost ledger write failed");
            error_track(
                AppError::internal("LEDGER_ERROR", "cost ledger write failed"),
                state.costs.len().await,
            )
        }
    }
}

pub async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let start = match parse_bound(query.start.as_deref()) {
        Ok(v) => v,
        Err(reason) => return error_summary(AppError::bad_request("VALIDATION_ERROR", reason)),
    };
    let end = match parse_bound(query.end.as_deref()) {
        Ok(v) => v,
        Err(reason) => return error_summary(AppError::bad_request("VALIDATION_ERROR", reason)),
    };

    (
        StatusCode::OK,
        Json(CostSummaryResponse {
            success: true,
            total_cost: state.costs.total_cost(start, end).await,
            costs_by_type: state.costs.costs_by_type(start, end).await,
            batching_savings: state.costs.batching_savings().await,
            count: state.costs.len().await,
            error_code: None,
            reason: "ok".to_string(),
        }),
    )
}

pub async fn clear_costs(State(state): State<AppState>) -> impl IntoResponse {
    match state.costs.clear_costs().await {
        Ok(()) => {
            info!("cost ledger cleared");
            (
                StatusCode::OK,
                Json(ClearCostsResponse {
                    success: true,
                    error_code: None,
                    reason: "ok".to_string(),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "cost ledger clear failed");
            let err = AppError::internal("LEDGER_ERROR", "cost ledger clear failed");
            (
                err.status,
                Json(ClearCostsResponse {
                    success: false,
                    error_code: Some(err.code.to_string()),
                    reason: err.message,
                }),
            )
        }
    }
}

fn parse_bound(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, String> {
    match raw {
        None => Ok(None),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|e| format!("invalid time bound {s}: {e}")),
    }
}

fn error_track(err: AppError, count: usize) -> (StatusCode, Json<TrackCostResponse>) {
    (
        err.status,
        Json(TrackCostResponse {
            success: false,
            count,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}

fn error_summary(err: AppError) -> (StatusCode, Json<CostSummaryResponse>) {
    (
        err.status,
        Json(CostSummaryResponse {
            success: false,
            total_cost: 0.0,
            costs_by_type: HashMap::new(),
            batching_savings: 0.0,
            count: 0,
            error_code: Some(err.code.to_string()),
            reason: err.message,
        }),
    )
}
