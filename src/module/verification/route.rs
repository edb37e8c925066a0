use super::controller;
use crate::app::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn register_verification_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/verifications/verify", post(controller::submit_verification))
        .route("/v1/verifications/status", get(controller::get_status))
        .route("/v1/verifications/poll/:request_id", get(controller::poll_status))
        .route("/v1/verifications/history", get(controller::get_history))
        .route("/v1/verifications/webhook", post(controller::receive_webhook))
        .route("/v1/verifications/health", get(controller::health))
        .with_state(state)
}
