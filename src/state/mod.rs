//! State management module
//!
//! Entity records, the whole-state snapshot, and the shared store that
//! applies engine transitions to it.

pub mod app_state;
pub mod group;
pub mod notifications;
pub mod snapshot;
pub mod timer;

// Re-export main types
pub use app_state::AppState;
pub use group::{Group, GroupPatch, NewGroup};
pub use notifications::{plan_notifications, PlannedNotification};
pub use snapshot::TimerSnapshot;
pub use timer::{GroupId, NewTimer, Timer, TimerId, TimerKind, TimerPatch, TimerStatus};
