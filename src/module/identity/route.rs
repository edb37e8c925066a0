use super::controller;
use crate::app::AppState;
use axum::routing::post;
use axum::Router;

pub fn register_identity_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/identity/verify", post(controller::verify_identity))
        .with_state(state)
}
