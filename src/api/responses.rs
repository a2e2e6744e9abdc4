//! API request and response structures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    engine::{TimerEvent, Transition},
    error::AppError,
    state::{PlannedNotification, TimerId, TimerSnapshot, TimerStatus},
};

/// Response for every state-changing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse {
    /// "changed" or "unchanged"
    pub status: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
    /// Id of a newly created timer or group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub events: Vec<TimerEvent>,
    pub state: TimerSnapshot,
}

impl ApiResponse {
    /// Build a response from an engine transition
    pub fn from_transition(action: &str, transition: Transition) -> Self {
        Self {
            status: if transition.changed { "changed" } else { "unchanged" }.to_string(),
            action: action.to_string(),
            timestamp: Utc::now(),
            id: None,
            events: transition.events,
            state: TimerSnapshot::clone(&transition.state),
        }
    }

    pub fn with_id(mut self, id: String) -> Self {
        self.id = Some(id);
        self
    }
}

/// Status response with timer counts and server metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub timers: usize,
    pub groups: usize,
    pub running: usize,
    pub waiting: usize,
    pub paused: usize,
    pub completed: usize,
    pub foreground: bool,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

impl StatusResponse {
    /// Count timers per status
    pub fn count(snapshot: &TimerSnapshot, status: TimerStatus) -> usize {
        snapshot.timers.values().filter(|t| t.status == status).count()
    }
}

/// Response when the host goes to the background
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundResponse {
    pub timestamp: DateTime<Utc>,
    pub notifications: Vec<PlannedNotification>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Body of POST /tick
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TickRequest {
    pub delta_ms: u64,
}

/// Body of POST /groups/:id/reorder
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub ordered_ids: Vec<TimerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}
