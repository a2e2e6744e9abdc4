//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Json,
};
use chrono::Utc;
use tracing::info;

use super::responses::{
    ApiResponse, BackgroundResponse, HealthResponse, ReorderRequest, StatusResponse, TickRequest,
};
use crate::{
    error::AppError,
    state::{AppState, GroupPatch, NewGroup, NewTimer, TimerPatch, TimerSnapshot, TimerStatus},
    utils::clock::local_now,
};

type ApiResult = Result<Json<ApiResponse>, AppError>;

/// Handle POST /timers - Create a timer
pub async fn add_timer_handler(State(state): State<Arc<AppState>>, Json(new): Json<NewTimer>) -> ApiResult {
    let (id, transition) = state.add_timer(new)?;
    info!("Timer {} created", id);
    Ok(Json(ApiResponse::from_transition("add-timer", transition).with_id(id)))
}

/// Handle PATCH /timers/:id - Partially update a timer
pub async fn update_timer_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<TimerPatch>,
) -> ApiResult {
    let transition = state.update_timer(&id, patch)?;
    Ok(Json(ApiResponse::from_transition("update-timer", transition)))
}

/// Handle DELETE /timers/:id
pub async fn delete_timer_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.delete_timer(&id)?;
    Ok(Json(ApiResponse::from_transition("delete-timer", transition)))
}

/// Handle POST /timers/:id/start - Start or resume a timer
pub async fn start_timer_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.start_timer(&id)?;
    Ok(Json(ApiResponse::from_transition("start-timer", transition)))
}

/// Handle POST /timers/:id/pause
pub async fn pause_timer_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.pause_timer(&id)?;
    Ok(Json(ApiResponse::from_transition("pause-timer", transition)))
}

/// Handle POST /timers/:id/reset
pub async fn reset_timer_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.reset_timer(&id)?;
    Ok(Json(ApiResponse::from_transition("reset-timer", transition)))
}

/// Handle POST /groups - Create a group
pub async fn add_group_handler(State(state): State<Arc<AppState>>, Json(new): Json<NewGroup>) -> ApiResult {
    let (id, transition) = state.add_group(new)?;
    info!("Group {} created", id);
    Ok(Json(ApiResponse::from_transition("add-group", transition).with_id(id)))
}

/// Handle PATCH /groups/:id - Partially update a group
pub async fn update_group_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(patch): Json<GroupPatch>,
) -> ApiResult {
    let transition = state.update_group(&id, patch)?;
    Ok(Json(ApiResponse::from_transition("update-group", transition)))
}

/// Handle DELETE /groups/:id - Remove a group, keeping its timers
pub async fn delete_group_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.delete_group(&id)?;
    Ok(Json(ApiResponse::from_transition("delete-group", transition)))
}

/// Handle POST /groups/:id/start
pub async fn start_group_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.start_group(&id)?;
    Ok(Json(ApiResponse::from_transition("start-group", transition)))
}

/// Handle POST /groups/:id/reset
pub async fn reset_group_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.reset_group(&id)?;
    Ok(Json(ApiResponse::from_transition("reset-group", transition)))
}

/// Handle POST /groups/:id/reorder
pub async fn reorder_timers_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(request): Json<ReorderRequest>,
) -> ApiResult {
    let transition = state.reorder_timers(&id, request.ordered_ids)?;
    Ok(Json(ApiResponse::from_transition("reorder-timers", transition)))
}

/// Handle POST /groups/:id/toggle-collapse
pub async fn toggle_collapse_handler(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> ApiResult {
    let transition = state.toggle_group_collapse(&id)?;
    Ok(Json(ApiResponse::from_transition("toggle-group-collapse", transition)))
}

/// Handle POST /tick - Advance time for hosts that drive the clock themselves
pub async fn tick_handler(State(state): State<Arc<AppState>>, Json(request): Json<TickRequest>) -> ApiResult {
    let transition = state.tick(request.delta_ms, &local_now())?;
    Ok(Json(ApiResponse::from_transition("tick", transition)))
}

/// Handle POST /dark-mode/toggle
pub async fn toggle_dark_mode_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    let transition = state.toggle_dark_mode()?;
    Ok(Json(ApiResponse::from_transition("toggle-dark-mode", transition)))
}

/// Handle POST /lifecycle/background - Return notifications to hand to the OS
pub async fn background_handler(State(state): State<Arc<AppState>>) -> Result<Json<BackgroundResponse>, AppError> {
    let notifications = state.enter_background()?;
    Ok(Json(BackgroundResponse {
        timestamp: Utc::now(),
        notifications,
    }))
}

/// Handle POST /lifecycle/foreground
pub async fn foreground_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    state.enter_foreground();
    Json(HealthResponse::ok())
}

/// Handle GET /state - Return the full snapshot
pub async fn state_handler(State(state): State<Arc<AppState>>) -> Result<Json<TimerSnapshot>, AppError> {
    let snapshot = state.snapshot()?;
    Ok(Json(TimerSnapshot::clone(&snapshot)))
}

/// Handle GET /status - Return counts and server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Result<Json<StatusResponse>, AppError> {
    let snapshot = state.snapshot()?;
    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timers: snapshot.timers.len(),
        groups: snapshot.groups.len(),
        running: StatusResponse::count(&snapshot, TimerStatus::Running),
        waiting: StatusResponse::count(&snapshot, TimerStatus::Waiting),
        paused: StatusResponse::count(&snapshot, TimerStatus::Paused),
        completed: StatusResponse::count(&snapshot, TimerStatus::Completed),
        foreground: state.is_foreground(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
