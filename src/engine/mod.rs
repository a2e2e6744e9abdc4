//! Timer engine
//!
//! A pure transition function `(state, command, now) -> transition`.
//! Every command works on a private copy of the snapshot and only
//! publishes it when something actually changed; otherwise the caller
//! gets back the very same `Arc`, so no-op ticks are detectable with
//! `Arc::ptr_eq` or [`Transition::changed`].

pub mod events;
pub mod groups;
pub mod tick;
pub mod timers;

use std::sync::Arc;

use crate::{
    state::{
        group::{GroupPatch, NewGroup},
        snapshot::TimerSnapshot,
        timer::{GroupId, NewTimer, TimerId, TimerPatch},
    },
    utils::clock::LocalTime,
};

pub use events::TimerEvent;

/// Every caller-facing operation on the timer state
#[derive(Debug, Clone)]
pub enum Command {
    AddTimer { id: TimerId, timer: NewTimer },
    UpdateTimer { id: TimerId, patch: TimerPatch },
    DeleteTimer { id: TimerId },
    StartTimer { id: TimerId },
    PauseTimer { id: TimerId },
    ResetTimer { id: TimerId },
    Tick { delta_ms: u64 },
    AddGroup { id: GroupId, group: NewGroup },
    UpdateGroup { id: GroupId, patch: GroupPatch },
    DeleteGroup { id: GroupId },
    ToggleGroupCollapse { id: GroupId },
    StartGroup { id: GroupId },
    ResetGroup { id: GroupId },
    ReorderTimers { group_id: GroupId, ordered_ids: Vec<TimerId> },
    ToggleDarkMode,
}

impl Command {
    /// Short action name used for logging and last-action tracking
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddTimer { .. } => "add-timer",
            Command::UpdateTimer { .. } => "update-timer",
            Command::DeleteTimer { .. } => "delete-timer",
            Command::StartTimer { .. } => "start-timer",
            Command::PauseTimer { .. } => "pause-timer",
            Command::ResetTimer { .. } => "reset-timer",
            Command::Tick { .. } => "tick",
            Command::AddGroup { .. } => "add-group",
            Command::UpdateGroup { .. } => "update-group",
            Command::DeleteGroup { .. } => "delete-group",
            Command::ToggleGroupCollapse { .. } => "toggle-group-collapse",
            Command::StartGroup { .. } => "start-group",
            Command::ResetGroup { .. } => "reset-group",
            Command::ReorderTimers { .. } => "reorder-timers",
            Command::ToggleDarkMode => "toggle-dark-mode",
        }
    }
}

/// Result of applying one command
#[derive(Debug, Clone)]
pub struct Transition {
    pub state: Arc<TimerSnapshot>,
    pub events: Vec<TimerEvent>,
    pub changed: bool,
}

impl Transition {
    pub fn unchanged(state: &Arc<TimerSnapshot>) -> Self {
        Self {
            state: Arc::clone(state),
            events: Vec::new(),
            changed: false,
        }
    }
}

/// Apply `command` to `state` as of `now`
pub fn apply(state: &Arc<TimerSnapshot>, command: Command, now: &LocalTime) -> Transition {
    match command {
        Command::Tick { delta_ms } => tick::tick(state, delta_ms, now),
        Command::AddTimer { id, timer } => edit(state, |s, _| timers::add_timer(s, id, timer, now)),
        Command::UpdateTimer { id, patch } => {
            edit(state, |s, _| timers::update_timer(s, &id, patch, now))
        }
        Command::DeleteTimer { id } => edit(state, |s, _| timers::delete_timer(s, &id)),
        Command::StartTimer { id } => edit(state, |s, _| timers::start_timer(s, &id, now)),
        Command::PauseTimer { id } => edit(state, |s, _| timers::pause_timer(s, &id)),
        Command::ResetTimer { id } => edit(state, |s, _| timers::reset_timer(s, &id, now)),
        Command::AddGroup { id, group } => edit(state, |s, _| groups::add_group(s, id, group)),
        Command::UpdateGroup { id, patch } => edit(state, |s, _| groups::update_group(s, &id, patch)),
        Command::DeleteGroup { id } => edit(state, |s, _| groups::delete_group(s, &id)),
        Command::ToggleGroupCollapse { id } => edit(state, |s, _| groups::toggle_collapse(s, &id)),
        Command::StartGroup { id } => edit(state, |s, _| groups::start_group(s, &id, now)),
        Command::ResetGroup { id } => edit(state, |s, _| groups::reset_group(s, &id, now)),
        Command::ReorderTimers { group_id, ordered_ids } => {
            edit(state, |s, _| groups::reorder_timers(s, &group_id, &ordered_ids))
        }
        Command::ToggleDarkMode => edit(state, |s, _| {
            s.is_dark_mode = !s.is_dark_mode;
            true
        }),
    }
}

/// Run `f` on a copy of the snapshot, keeping the copy only if `f` reports a change
pub(crate) fn edit<F>(state: &Arc<TimerSnapshot>, f: F) -> Transition
where
    F: FnOnce(&mut TimerSnapshot, &mut Vec<TimerEvent>) -> bool,
{
    let mut next = TimerSnapshot::clone(state);
    let mut events = Vec::new();

    if f(&mut next, &mut events) {
        Transition {
            state: Arc::new(next),
            events,
            changed: true,
        }
    } else {
        Transition::unchanged(state)
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use chrono::Duration;

    use super::{apply, Command, Transition};
    use crate::{
        state::{
            group::NewGroup,
            snapshot::TimerSnapshot,
            timer::{NewTimer, Timer},
        },
        utils::clock::{test_support::at, LocalTime},
    };

    /// Drives the engine with a controllable clock
    pub struct Fixture {
        pub state: Arc<TimerSnapshot>,
        pub now: LocalTime,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::at(at(2024, 5, 1, 9, 0, 0))
        }

        pub fn at(now: LocalTime) -> Self {
            Self {
                state: Arc::new(TimerSnapshot::new()),
                now,
            }
        }

        pub fn run(&mut self, command: Command) -> Transition {
            let transition = apply(&self.state, command, &self.now);
            self.state = Arc::clone(&transition.state);
            transition
        }

        /// Advance the clock by `delta_ms` and tick with the same delta
        pub fn tick(&mut self, delta_ms: u64) -> Transition {
            self.now += Duration::milliseconds(delta_ms as i64);
            self.run(Command::Tick { delta_ms })
        }

        pub fn add_timer(&mut self, id: &str, timer: NewTimer) {
            self.run(Command::AddTimer { id: id.to_string(), timer });
        }

        pub fn add_group(&mut self, id: &str, group: NewGroup) {
            self.run(Command::AddGroup { id: id.to_string(), group });
        }

        pub fn start_timer(&mut self, id: &str) -> Transition {
            self.run(Command::StartTimer { id: id.to_string() })
        }

        pub fn start_group(&mut self, id: &str) -> Transition {
            self.run(Command::StartGroup { id: id.to_string() })
        }

        pub fn timer(&self, id: &str) -> &Timer {
            &self.state.timers[id]
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::fixtures::Fixture;
    use super::*;
    use crate::state::timer::TimerStatus;

    #[test]
    fn unknown_ids_return_the_same_snapshot() {
        let mut fx = Fixture::new();
        fx.add_timer("a", NewTimer::duration("Tea", 1000));
        let before = Arc::clone(&fx.state);

        for command in [
            Command::StartTimer { id: "missing".into() },
            Command::PauseTimer { id: "missing".into() },
            Command::ResetTimer { id: "missing".into() },
            Command::DeleteTimer { id: "missing".into() },
            Command::StartGroup { id: "missing".into() },
            Command::ResetGroup { id: "missing".into() },
            Command::DeleteGroup { id: "missing".into() },
            Command::ToggleGroupCollapse { id: "missing".into() },
        ] {
            let transition = fx.run(command);
            assert!(!transition.changed);
            assert!(Arc::ptr_eq(&transition.state, &before));
        }
    }

    #[test]
    fn dark_mode_toggles() {
        let mut fx = Fixture::new();
        assert!(fx.run(Command::ToggleDarkMode).changed);
        assert!(fx.state.is_dark_mode);
        fx.run(Command::ToggleDarkMode);
        assert!(!fx.state.is_dark_mode);
    }

    #[test]
    fn transitions_never_touch_the_previous_snapshot() {
        let mut fx = Fixture::new();
        fx.add_timer("a", NewTimer::duration("Tea", 1000));
        let before = Arc::clone(&fx.state);

        fx.start_timer("a");

        assert_eq!(before.timers["a"].status, TimerStatus::Idle);
        assert_eq!(fx.timer("a").status, TimerStatus::Running);
    }
}
