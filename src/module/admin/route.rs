use super::controller;
use crate::app::AppState;
use axum::routing::{get, post};
use axum::Router;

pub fn register_admin_routes(state: AppState) -> Router {
    Router::new()
        .route(
            "/v1/admin/backups",
            post(controller::create_backup).get(controller::list_backups),
        )
        .route("/v1/admin/backups/restore", post(controller::restore_backup))
        .route("/v1/admin/integrity", get(controller::verify_integrity))
        .with_state(state)
}
