use super::controller;
use crate::app::AppState;
use axum::routing::{delete, get, post};
use axum::Router;

pub fn register_cost_routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/costs/track", post(controller::track_cost))
        .route("/v1/costs/summary", get(controller::get_summary))
        .route("/v1/costs", delete(controller::clear_costs))
        .with_state(state)
}
