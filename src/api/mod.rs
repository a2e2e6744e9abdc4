//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timers", post(add_timer_handler))
        .route("/timers/:id", patch(update_timer_handler).delete(delete_timer_handler))
        .route("/timers/:id/start", post(start_timer_handler))
        .route("/timers/:id/pause", post(pause_timer_handler))
        .route("/timers/:id/reset", post(reset_timer_handler))
        .route("/groups", post(add_group_handler))
        .route("/groups/:id", patch(update_group_handler).delete(delete_group_handler))
        .route("/groups/:id/start", post(start_group_handler))
        .route("/groups/:id/reset", post(reset_group_handler))
        .route("/groups/:id/reorder", post(reorder_timers_handler))
        .route("/groups/:id/toggle-collapse", post(toggle_collapse_handler))
        .route("/tick", post(tick_handler))
        .route("/dark-mode/toggle", post(toggle_dark_mode_handler))
        .route("/lifecycle/background", post(background_handler))
        .route("/lifecycle/foreground", post(foreground_handler))
        .route("/state", get(state_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
