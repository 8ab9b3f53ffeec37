//! HTTP API module
//!
//! Start, cancel, pause/resume and history controls for the workout timer.

pub mod handlers;
pub mod responses;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::{
    cancel_handler, health_handler, history_handler, pause_handler, resume_handler,
    start_handler, status_handler, toggle_handler,
};

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/workout/start", post(start_handler))
        .route("/workout/cancel", post(cancel_handler))
        .route("/workout/pause", post(pause_handler))
        .route("/workout/resume", post(resume_handler))
        .route("/workout/toggle", post(toggle_handler))
        .route("/workout/status", get(status_handler))
        .route("/history", get(history_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
