//! Axum HTTP handlers.

pub mod search;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(search::health))
        .route("/api/search", post(search::search))
        .route("/api/kurals/{id}", get(search::get_kural))
        .with_state(state)
}
