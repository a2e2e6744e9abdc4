//! Notification planning for hosts that go to the background
//!
//! While backgrounded the tick driver may be frozen, so the host hands these
//! plans to the OS notification scheduler instead.

use serde::Serialize;

use super::{
    snapshot::TimerSnapshot,
    timer::{TimerId, TimerStatus},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedNotification {
    pub timer_id: TimerId,
    pub title: String,
    pub body: String,
    /// Whole seconds from now until the timer fires
    pub fire_in_seconds: u64,
    pub sound_uri: Option<String>,
}

/// One notification per running timer that still has time left
pub fn plan_notifications(snapshot: &TimerSnapshot) -> Vec<PlannedNotification> {
    snapshot
        .timers
        .values()
        .filter(|timer| timer.status == TimerStatus::Running && timer.remaining_time > 0)
        .map(|timer| PlannedNotification {
            timer_id: timer.id.clone(),
            title: "Timer Complete".to_string(),
            body: format!("{} finished!", timer.name),
            fire_in_seconds: timer.remaining_time / 1000,
            sound_uri: timer.sound_uri.clone(),
        })
        .collect()
}
