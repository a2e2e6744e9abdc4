//! Tick engine
//!
//! One call advances every running timer by `delta_ms`, resolves
//! completions, promotes the next waiting member of each finished chain and
//! starts groups whose schedule matches the current minute. All of it lands
//! in a single new snapshot. `delta_ms` may be arbitrarily large: after a
//! suspension the driver feeds the whole gap as one tick.

use std::sync::Arc;

use super::{edit, groups, TimerEvent, Transition};
use crate::{
    state::{
        snapshot::TimerSnapshot,
        timer::{GroupId, Timer, TimerId, TimerStatus},
    },
    utils::clock::{next_occurrence, remaining_from, LocalTime},
};

/// Outcome of advancing a single running timer
#[derive(Debug, PartialEq, Eq)]
enum Step {
    Unchanged,
    Progressed,
    /// Recurring timer hit zero and started its next cycle
    Recycled,
    /// Non-recurring timer hit zero and is now completed
    Finished,
}

pub(crate) fn tick(state: &Arc<TimerSnapshot>, delta_ms: u64, now: &LocalTime) -> Transition {
    if delta_ms == 0 || !has_work(state, now) {
        return Transition::unchanged(state);
    }
    edit(state, |s, events| advance(s, delta_ms, now, events))
}

/// Cheap pre-check so idle ticks never copy the snapshot
fn has_work(s: &TimerSnapshot, now: &LocalTime) -> bool {
    s.timers.values().any(|timer| timer.status == TimerStatus::Running)
        || s.groups
            .values()
            .any(|group| group.target_start_time.is_some_and(|start| start.matches(now)))
}

fn advance(s: &mut TimerSnapshot, delta_ms: u64, now: &LocalTime, events: &mut Vec<TimerEvent>) -> bool {
    let at = now.timestamp_millis();
    let mut changed = false;
    let mut finished: Vec<(GroupId, u32, TimerId)> = Vec::new();

    for timer in s.timers.values_mut().filter(|t| t.status == TimerStatus::Running) {
        match step(timer, delta_ms, now) {
            Step::Unchanged => {}
            Step::Progressed => changed = true,
            Step::Recycled => {
                changed = true;
                events.push(TimerEvent::CycleCompleted {
                    timer_id: timer.id.clone(),
                    recurring: true,
                    at,
                });
            }
            Step::Finished => {
                changed = true;
                events.push(TimerEvent::CycleCompleted {
                    timer_id: timer.id.clone(),
                    recurring: false,
                    at,
                });
                if let Some(group_id) = &timer.group_id {
                    finished.push((group_id.clone(), timer.order, timer.id.clone()));
                }
            }
        }
    }

    finished.sort();
    for (group_id, _, completed_id) in finished {
        if let Some(promoted_id) = groups::promote_next(s, &group_id) {
            tracing::debug!("Chain in group {} advanced from {} to {}", group_id, completed_id, promoted_id);
            events.push(TimerEvent::ChainAdvanced {
                group_id,
                completed_id,
                promoted_id,
            });
        }
    }

    for group_id in groups::due_groups(s, now) {
        if groups::start_group(s, &group_id, now) {
            changed = true;
            events.push(TimerEvent::GroupAutoStarted { group_id, at });
        }
    }

    changed
}

fn step(timer: &mut Timer, delta_ms: u64, now: &LocalTime) -> Step {
    let mut armed = false;
    let remaining = match timer.time_of_day_target() {
        Some(target) => {
            let expiry = match timer.expiry_timestamp {
                Some(expiry) => expiry,
                None => {
                    let expiry = next_occurrence(target, now);
                    timer.expiry_timestamp = Some(expiry);
                    armed = true;
                    expiry
                }
            };
            remaining_from(expiry, now)
        }
        None => timer.remaining_time.saturating_sub(delta_ms),
    };

    if remaining == 0 {
        timer.last_cycle_completed_at = Some(now.timestamp_millis());
        if timer.is_recurring {
            match timer.time_of_day_target() {
                Some(_) => timer.arm_expiry(now),
                None => timer.remaining_time = timer.initial_duration,
            }
            return Step::Recycled;
        }
        timer.remaining_time = 0;
        timer.status = TimerStatus::Completed;
        timer.expiry_timestamp = None;
        return Step::Finished;
    }

    if remaining != timer.remaining_time || armed {
        timer.remaining_time = remaining;
        Step::Progressed
    } else {
        Step::Unchanged
    }
}
