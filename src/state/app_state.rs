//! Main application state: the store façade over the timer engine
//!
//! All mutations funnel through [`AppState::dispatch_at`], which holds the
//! state lock while the engine computes the next snapshot and while it is
//! published. Readers always see either the previous or the next snapshot,
//! never a mix, and watchers receive snapshots in commit order.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};
use uuid::Uuid;

use super::{
    group::{GroupPatch, NewGroup},
    notifications::{plan_notifications, PlannedNotification},
    snapshot::TimerSnapshot,
    timer::{GroupId, NewTimer, TimerId, TimerPatch},
};
use crate::{
    engine::{self, Command, TimerEvent, Transition},
    error::{AppError, Result},
    utils::clock::{local_now, LocalTime},
};

/// Shared store for the timer snapshot and its change channels
#[derive(Debug)]
pub struct AppState {
    /// Current snapshot; replaced wholesale on every change
    snapshot: Mutex<Arc<TimerSnapshot>>,
    /// Whether the host UI is in the foreground
    foreground: AtomicBool,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Discrete events emitted by transitions
    pub event_tx: broadcast::Sender<TimerEvent>,
    /// Latest snapshot for persistence and other watchers
    pub snapshot_tx: watch::Sender<Arc<TimerSnapshot>>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<Arc<TimerSnapshot>>,
}

impl AppState {
    /// Create an AppState with an empty snapshot
    pub fn new(port: u16, host: String) -> Self {
        Self::with_snapshot(TimerSnapshot::new(), port, host)
    }

    /// Create an AppState rehydrated from a stored snapshot
    pub fn with_snapshot(snapshot: TimerSnapshot, port: u16, host: String) -> Self {
        let snapshot = Arc::new(snapshot);
        let (event_tx, _) = broadcast::channel(256);
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::clone(&snapshot));

        Self {
            snapshot: Mutex::new(snapshot),
            foreground: AtomicBool::new(true),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Result<Arc<TimerSnapshot>> {
        self.snapshot
            .lock()
            .map(|state| Arc::clone(&state))
            .map_err(|e| AppError::LockPoisoned(e.to_string()))
    }

    /// Apply a command against the local clock
    pub fn dispatch(&self, command: Command) -> Result<Transition> {
        self.dispatch_at(command, &local_now())
    }

    /// Apply a command as of `now` and publish the result
    pub fn dispatch_at(&self, command: Command, now: &LocalTime) -> Result<Transition> {
        let action = command.name();
        let is_tick = matches!(command, Command::Tick { .. });

        let mut current = self
            .snapshot
            .lock()
            .map_err(|e| AppError::LockPoisoned(e.to_string()))?;
        let transition = engine::apply(&current, command, now);

        if !transition.changed {
            if !is_tick {
                debug!("{} left the state unchanged", action);
            }
            return Ok(transition);
        }

        // Publish under the lock so watchers see commits in commit order
        *current = Arc::clone(&transition.state);
        self.snapshot_tx.send_replace(Arc::clone(&transition.state));
        for event in &transition.events {
            debug!("Emitting {:?}", event);
            // No subscribers is fine; nobody is listening for alarms yet
            let _ = self.event_tx.send(event.clone());
        }
        drop(current);

        if !is_tick {
            info!("Applied {}", action);
            if let Ok(mut last_action) = self.last_action.lock() {
                *last_action = Some(action.to_string());
            }
            if let Ok(mut last_time) = self.last_action_time.lock() {
                *last_time = Some(Utc::now());
            }
        }

        Ok(transition)
    }

    /// Validate and create a timer, returning its generated id
    pub fn add_timer(&self, new: NewTimer) -> Result<(TimerId, Transition)> {
        new.validate()?;
        let id = generate_id();
        let transition = self.dispatch(Command::AddTimer { id: id.clone(), timer: new })?;
        Ok((id, transition))
    }

    pub fn update_timer(&self, id: &str, patch: TimerPatch) -> Result<Transition> {
        patch.validate()?;
        self.dispatch(Command::UpdateTimer { id: id.to_string(), patch })
    }

    pub fn delete_timer(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::DeleteTimer { id: id.to_string() })
    }

    pub fn start_timer(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::StartTimer { id: id.to_string() })
    }

    pub fn pause_timer(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::PauseTimer { id: id.to_string() })
    }

    pub fn reset_timer(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::ResetTimer { id: id.to_string() })
    }

    /// Advance all timers by `delta_ms` as of `now`
    pub fn tick(&self, delta_ms: u64, now: &LocalTime) -> Result<Transition> {
        self.dispatch_at(Command::Tick { delta_ms }, now)
    }

    /// Validate and create a group, returning its generated id
    pub fn add_group(&self, new: NewGroup) -> Result<(GroupId, Transition)> {
        new.validate()?;
        let id = generate_id();
        let transition = self.dispatch(Command::AddGroup { id: id.clone(), group: new })?;
        Ok((id, transition))
    }

    pub fn update_group(&self, id: &str, patch: GroupPatch) -> Result<Transition> {
        patch.validate()?;
        self.dispatch(Command::UpdateGroup { id: id.to_string(), patch })
    }

    pub fn delete_group(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::DeleteGroup { id: id.to_string() })
    }

    pub fn toggle_group_collapse(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::ToggleGroupCollapse { id: id.to_string() })
    }

    pub fn start_group(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::StartGroup { id: id.to_string() })
    }

    pub fn reset_group(&self, id: &str) -> Result<Transition> {
        self.dispatch(Command::ResetGroup { id: id.to_string() })
    }

    pub fn reorder_timers(&self, group_id: &str, ordered_ids: Vec<TimerId>) -> Result<Transition> {
        self.dispatch(Command::ReorderTimers {
            group_id: group_id.to_string(),
            ordered_ids,
        })
    }

    pub fn toggle_dark_mode(&self) -> Result<Transition> {
        self.dispatch(Command::ToggleDarkMode)
    }

    /// Subscribe to transition events
    pub fn subscribe_events(&self) -> broadcast::Receiver<TimerEvent> {
        self.event_tx.subscribe()
    }

    /// Subscribe to snapshot replacements
    pub fn subscribe_snapshots(&self) -> watch::Receiver<Arc<TimerSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    /// Mark the host as backgrounded and plan OS notifications for running timers
    pub fn enter_background(&self) -> Result<Vec<PlannedNotification>> {
        self.foreground.store(false, Ordering::SeqCst);
        let snapshot = self.snapshot()?;
        let plan = plan_notifications(&snapshot);
        info!("Host backgrounded, planned {} notification(s)", plan.len());
        Ok(plan)
    }

    /// Mark the host as foregrounded; previously planned notifications are void
    pub fn enter_foreground(&self) {
        self.foreground.store(true, Ordering::SeqCst);
        info!("Host foregrounded");
    }

    pub fn is_foreground(&self) -> bool {
        self.foreground.load(Ordering::SeqCst)
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn generate_id() -> String {
    Uuid::new_v4().simple().to_string()
}
