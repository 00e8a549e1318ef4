use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;

pub mod handlers;
pub mod responses;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/lots/{lot_id}/analyze", post(handlers::post_analyze))
        .route("/api/lots/{lot_id}/occupancy", get(handlers::get_occupancy))
        .route("/api/detect-vehicles", post(handlers::post_detect))
        .route("/api/predict", post(handlers::post_predict))
        .route("/api/health", get(handlers::get_health))
        .with_state(state)
}
