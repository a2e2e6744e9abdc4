//! Alarm listener background task

use std::sync::Arc;
use tokio::sync::broadcast::{error::RecvError, Receiver};
use tracing::{info, warn};

use crate::{engine::TimerEvent, state::AppState};

const DEFAULT_SOUND: &str = "default beep";

/// Background task that turns completion events into alarms.
///
/// Takes an already subscribed receiver so events emitted before the task
/// is first polled are not missed.
pub async fn alarm_task(state: Arc<AppState>, mut events: Receiver<TimerEvent>) {
    info!("Starting alarm task");

    loop {
        match events.recv().await {
            Ok(event) => announce(&state, &event),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Alarm task lagged behind, {} event(s) dropped", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping alarm task");
                break;
            }
        }
    }
}

fn announce(state: &AppState, event: &TimerEvent) {
    let snapshot = match state.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!("Cannot resolve alarm details: {}", e);
            return;
        }
    };

    match event {
        TimerEvent::CycleCompleted { timer_id, recurring, .. } => {
            let Some(timer) = snapshot.timers.get(timer_id) else {
                return;
            };
            let sound = timer.sound_name.as_deref().unwrap_or(DEFAULT_SOUND);
            let cycle = if *recurring { "cycle" } else { "timer" };

            if state.is_foreground() {
                info!("Alarm: {} {} finished, playing {}", cycle, timer.name, sound);
            } else {
                info!("Alarm: {} {} finished while backgrounded, left to OS notification", cycle, timer.name);
            }
        }
        TimerEvent::ChainAdvanced { group_id, promoted_id, .. } => {
            let group = snapshot.groups.get(group_id).map_or(group_id.as_str(), |g| g.name.as_str());
            let next = snapshot.timers.get(promoted_id).map_or(promoted_id.as_str(), |t| t.name.as_str());
            info!("Group {}: next up {}", group, next);
        }
        TimerEvent::GroupAutoStarted { group_id, .. } => {
            let group = snapshot.groups.get(group_id).map_or(group_id.as_str(), |g| g.name.as_str());
            info!("Group {} started on schedule", group);
        }
    }
}
