//! Per-timer operations: create, update, delete, start, pause, reset
//!
//! Each function mutates the draft snapshot and returns whether anything
//! changed. Unknown ids are no-ops.

use tracing::debug;

use super::groups::promote_next;
use crate::{
    state::{
        snapshot::TimerSnapshot,
        timer::{NewTimer, Timer, TimerId, TimerKind, TimerPatch, TimerStatus},
    },
    utils::clock::{remaining_until, LocalTime},
};

/// Append a new idle timer to the end of its group
pub(crate) fn add_timer(s: &mut TimerSnapshot, id: TimerId, new: NewTimer, now: &LocalTime) -> bool {
    if s.timers.contains_key(&id) {
        return false;
    }
    if let Some(group_id) = &new.group_id {
        if !s.groups.contains_key(group_id) {
            return false;
        }
    }

    let order = s.sibling_count(new.group_id.as_deref());
    s.timers.insert(id.clone(), Timer::from_new(id, new, order, now));
    true
}

/// Merge a partial update onto an existing timer
pub(crate) fn update_timer(s: &mut TimerSnapshot, id: &str, patch: TimerPatch, now: &LocalTime) -> bool {
    let Some(current) = s.timers.get(id) else {
        return false;
    };
    if let Some(Some(group_id)) = &patch.group_id {
        if !s.groups.contains_key(group_id) {
            return false;
        }
    }

    let mut timer = current.clone();
    let idle = timer.status == TimerStatus::Idle;

    if let Some(name) = patch.name {
        timer.name = name.trim().to_string();
    }
    if let Some(duration) = patch.duration {
        if timer.kind == TimerKind::Duration {
            timer.initial_duration = duration;
            if idle {
                timer.remaining_time = duration;
            }
        }
    }
    if let Some(target) = patch.target_time_of_day {
        timer.target_time_of_day = Some(target);
        if timer.kind == TimerKind::TimeOfDay {
            if idle {
                timer.remaining_time = remaining_until(target, now);
                timer.initial_duration = timer.remaining_time;
            } else if timer.status == TimerStatus::Running {
                timer.arm_expiry(now);
            }
        }
    }
    if let Some(recurring) = patch.is_recurring {
        timer.is_recurring = recurring;
    }
    if let Some(sound_uri) = patch.sound_uri {
        timer.sound_uri = sound_uri;
    }
    if let Some(sound_name) = patch.sound_name {
        timer.sound_name = sound_name;
    }

    let previous_group = timer.group_id.clone();
    let moved = match patch.group_id {
        Some(group_id) if group_id != timer.group_id => {
            timer.order = s.sibling_count(group_id.as_deref());
            timer.group_id = group_id;
            // a queued position has no meaning outside its chain
            if timer.status == TimerStatus::Waiting {
                timer.status = TimerStatus::Idle;
            }
            true
        }
        _ => false,
    };

    let changed = timer != *current;
    let left = current.clone();
    s.timers.insert(id.to_string(), timer);
    if moved {
        s.renumber(previous_group.as_deref());
        hand_off_chain(s, &left);
    }
    changed
}

pub(crate) fn delete_timer(s: &mut TimerSnapshot, id: &str) -> bool {
    match s.timers.remove(id) {
        Some(removed) => {
            s.renumber(removed.group_id.as_deref());
            hand_off_chain(s, &removed);
            true
        }
        None => false,
    }
}

/// `idle -> running` or resume `paused -> running`
pub(crate) fn start_timer(s: &mut TimerSnapshot, id: &str, now: &LocalTime) -> bool {
    let Some(timer) = s.timers.get_mut(id) else {
        return false;
    };
    match timer.status {
        TimerStatus::Idle | TimerStatus::Paused => {
            timer.status = TimerStatus::Running;
            timer.arm_expiry(now);
            true
        }
        _ => false,
    }
}

/// `running -> paused`; the deadline is dropped and recomputed on resume
pub(crate) fn pause_timer(s: &mut TimerSnapshot, id: &str) -> bool {
    let Some(timer) = s.timers.get_mut(id) else {
        return false;
    };
    if timer.status != TimerStatus::Running {
        return false;
    }
    timer.status = TimerStatus::Paused;
    timer.expiry_timestamp = None;
    true
}

/// Any status back to `idle` with remaining time recomputed from scratch
pub(crate) fn reset_timer(s: &mut TimerSnapshot, id: &str, now: &LocalTime) -> bool {
    let Some(timer) = s.timers.get_mut(id) else {
        return false;
    };
    let before = timer.clone();
    if !reset(timer, now) {
        return false;
    }
    hand_off_chain(s, &before);
    true
}

/// Keep a chain moving after its running member leaves it.
///
/// `left` is the timer as it was before it was deleted, moved out of its
/// group or reset. Nothing happens if another chained member is running.
fn hand_off_chain(s: &mut TimerSnapshot, left: &Timer) {
    if left.status != TimerStatus::Running || left.is_chain_exempt() {
        return;
    }
    let Some(group_id) = left.group_id.as_deref() else {
        return;
    };
    let chain_running = s
        .group_members(group_id)
        .iter()
        .any(|timer| timer.status == TimerStatus::Running && !timer.is_chain_exempt());
    if chain_running {
        return;
    }
    if let Some(promoted_id) = promote_next(s, group_id) {
        debug!("Chain in group {} handed from {} to {}", group_id, left.id, promoted_id);
    }
}

pub(crate) fn reset(timer: &mut Timer, now: &LocalTime) -> bool {
    let remaining = timer.fresh_remaining(now);
    let changed = timer.status != TimerStatus::Idle
        || timer.remaining_time != remaining
        || timer.expiry_timestamp.is_some();

    timer.status = TimerStatus::Idle;
    timer.remaining_time = remaining;
    timer.expiry_timestamp = None;
    changed
}
