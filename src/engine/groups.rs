//! Group controller: group CRUD plus start, reset and reorder over members
//!
//! Starting a group splits its members into two policies. Time-of-day and
//! recurring timers are exempt and start immediately. The remaining
//! duration timers form a chain: the lowest `order` runs, the rest wait and
//! are promoted one at a time by the tick engine.

use crate::{
    state::{
        group::{Group, GroupPatch, NewGroup},
        snapshot::TimerSnapshot,
        timer::{GroupId, TimerId, TimerStatus},
    },
    utils::clock::LocalTime,
};

use super::timers::reset;

pub(crate) fn add_group(s: &mut TimerSnapshot, id: GroupId, new: NewGroup) -> bool {
    if s.groups.contains_key(&id) {
        return false;
    }
    s.groups.insert(id.clone(), Group::from_new(id, new));
    true
}

pub(crate) fn update_group(s: &mut TimerSnapshot, id: &str, patch: GroupPatch) -> bool {
    let Some(group) = s.groups.get_mut(id) else {
        return false;
    };
    let before = group.clone();

    if let Some(name) = patch.name {
        group.name = name.trim().to_string();
    }
    if let Some(collapsed) = patch.collapsed {
        group.collapsed = collapsed;
    }
    if let Some(start) = patch.target_start_time {
        group.target_start_time = start;
    }

    *group != before
}

pub(crate) fn toggle_collapse(s: &mut TimerSnapshot, id: &str) -> bool {
    match s.groups.get_mut(id) {
        Some(group) => {
            group.collapsed = !group.collapsed;
            true
        }
        None => false,
    }
}

/// Remove a group; its timers survive as ungrouped, appended after existing loose timers
pub(crate) fn delete_group(s: &mut TimerSnapshot, id: &str) -> bool {
    let removed = s.groups.remove(id).is_some();

    let members = member_ids(s, id);
    let base = s.sibling_count(None);
    for (offset, timer_id) in (0u32..).zip(&members) {
        if let Some(timer) = s.timers.get_mut(timer_id) {
            timer.group_id = None;
            timer.order = base + offset;
            if timer.status == TimerStatus::Waiting {
                timer.status = TimerStatus::Idle;
            }
        }
    }

    removed || !members.is_empty()
}

/// Apply the start policy to every member of the group
pub(crate) fn start_group(s: &mut TimerSnapshot, id: &str, now: &LocalTime) -> bool {
    if !s.groups.contains_key(id) {
        return false;
    }

    let mut chain_started = false;
    let mut changed = false;
    for timer_id in member_ids(s, id) {
        let Some(timer) = s.timers.get_mut(&timer_id) else {
            continue;
        };
        let before = timer.clone();

        // a finished timer runs its full length again
        if timer.status == TimerStatus::Completed {
            timer.remaining_time = timer.fresh_remaining(now);
        }

        if timer.is_chain_exempt() {
            timer.status = TimerStatus::Running;
            timer.arm_expiry(now);
        } else if !chain_started {
            timer.status = TimerStatus::Running;
            chain_started = true;
        } else {
            timer.status = TimerStatus::Waiting;
        }

        changed |= *timer != before;
    }
    changed
}

/// Every member back to `idle` with remaining time recomputed
pub(crate) fn reset_group(s: &mut TimerSnapshot, id: &str, now: &LocalTime) -> bool {
    let mut changed = false;
    for timer_id in member_ids(s, id) {
        if let Some(timer) = s.timers.get_mut(&timer_id) {
            changed |= reset(timer, now);
        }
    }
    changed
}

/// Set each member's `order` to its position in `ordered_ids`.
///
/// Ids that are not members of the group are skipped. Members missing from
/// the list keep their relative order after the listed ones, so the group's
/// orders stay contiguous.
pub(crate) fn reorder_timers(s: &mut TimerSnapshot, group_id: &str, ordered_ids: &[TimerId]) -> bool {
    let members = member_ids(s, group_id);
    let mut sequence: Vec<&TimerId> = Vec::with_capacity(members.len());
    for id in ordered_ids.iter().chain(&members) {
        if members.contains(id) && !sequence.contains(&id) {
            sequence.push(id);
        }
    }

    let mut changed = false;
    for (position, id) in (0u32..).zip(sequence) {
        if let Some(timer) = s.timers.get_mut(id) {
            if timer.order != position {
                timer.order = position;
                changed = true;
            }
        }
    }
    changed
}

/// Groups due to start themselves: schedule matches `now`, at least one
/// member, and no member running or waiting
pub(crate) fn due_groups(s: &TimerSnapshot, now: &LocalTime) -> Vec<GroupId> {
    s.groups
        .values()
        .filter(|group| group.target_start_time.is_some_and(|start| start.matches(now)))
        .filter(|group| {
            let members = s.group_members(&group.id);
            !members.is_empty() && !members.iter().any(|timer| timer.is_active())
        })
        .map(|group| group.id.clone())
        .collect()
}

/// Run the first `waiting` member of a chain
pub(crate) fn promote_next(s: &mut TimerSnapshot, group_id: &str) -> Option<TimerId> {
    let next_id = s
        .group_members(group_id)
        .into_iter()
        .find(|timer| timer.status == TimerStatus::Waiting)
        .map(|timer| timer.id.clone())?;

    let timer = s.timers.get_mut(&next_id)?;
    timer.status = TimerStatus::Running;
    Some(next_id)
}

fn member_ids(s: &TimerSnapshot, group_id: &str) -> Vec<TimerId> {
    s.group_members(group_id)
        .into_iter()
        .map(|timer| timer.id.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::engine::{fixtures::Fixture, Command};
    use crate::state::{
        group::{GroupPatch, NewGroup},
        timer::{NewTimer, TimerStatus},
    };
    use crate::utils::clock::test_support::at;

    fn morning() -> Fixture {
        let mut fx = Fixture::new();
        fx.add_group("g", NewGroup::named("Morning"));
        fx
    }

    #[test]
    fn start_group_runs_first_chained_timer_and_queues_the_rest() {
        let mut fx = morning();
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.add_timer("b", NewTimer::duration("B", 1000).in_group("g"));
        fx.add_timer("c", NewTimer::duration("C", 1000).in_group("g"));

        fx.start_group("g");

        assert_eq!(fx.timer("a").status, TimerStatus::Running);
        assert_eq!(fx.timer("b").status, TimerStatus::Waiting);
        assert_eq!(fx.timer("c").status, TimerStatus::Waiting);
    }

    #[test]
    fn exempt_timers_run_immediately_regardless_of_order() {
        let mut fx = Fixture::at(at(2024, 5, 1, 6, 0, 0));
        fx.add_group("g", NewGroup::named("Morning"));
        fx.add_timer("plain", NewTimer::duration("Plain", 60_000).in_group("g"));
        fx.add_timer("later", NewTimer::duration("Later", 60_000).in_group("g"));
        fx.add_timer("alarm", NewTimer::time_of_day("Alarm", "07:00".parse().unwrap()).in_group("g"));
        fx.add_timer("loop", NewTimer::duration("Loop", 5_000).in_group("g").recurring());

        fx.start_group("g");

        assert_eq!(fx.timer("plain").status, TimerStatus::Running);
        assert_eq!(fx.timer("later").status, TimerStatus::Waiting);
        assert_eq!(fx.timer("alarm").status, TimerStatus::Running);
        assert_eq!(fx.timer("loop").status, TimerStatus::Running);
        assert_eq!(
            fx.timer("alarm").expiry_timestamp,
            Some(at(2024, 5, 1, 7, 0, 0).timestamp_millis())
        );
        assert_eq!(fx.timer("alarm").remaining_time, 60 * 60_000);
    }

    #[test]
    fn time_of_day_timer_first_in_order_never_waits() {
        let mut fx = morning();
        fx.add_timer("alarm", NewTimer::time_of_day("Alarm", "10:00".parse().unwrap()).in_group("g"));
        fx.add_timer("plain", NewTimer::duration("Plain", 1000).in_group("g"));

        fx.start_group("g");

        assert_eq!(fx.timer("alarm").status, TimerStatus::Running);
        assert_eq!(fx.timer("plain").status, TimerStatus::Running);
    }

    #[test]
    fn restarting_a_finished_group_rearms_completed_timers() {
        let mut fx = morning();
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.start_group("g");
        fx.tick(1000);
        assert_eq!(fx.timer("a").status, TimerStatus::Completed);

        fx.start_group("g");
        assert_eq!(fx.timer("a").status, TimerStatus::Running);
        assert_eq!(fx.timer("a").remaining_time, 1000);
    }

    #[test]
    fn start_empty_group_is_a_no_op() {
        let mut fx = morning();
        assert!(!fx.start_group("g").changed);
    }

    #[test]
    fn reset_group_returns_every_member_to_idle() {
        let mut fx = morning();
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.add_timer("b", NewTimer::duration("B", 2000).in_group("g"));
        fx.start_group("g");
        fx.tick(400);

        fx.run(Command::ResetGroup { id: "g".into() });

        assert_eq!(fx.timer("a").status, TimerStatus::Idle);
        assert_eq!(fx.timer("a").remaining_time, 1000);
        assert_eq!(fx.timer("b").status, TimerStatus::Idle);
        assert_eq!(fx.timer("b").remaining_time, 2000);
    }

    #[test]
    fn reorder_assigns_positions_from_the_list() {
        let mut fx = morning();
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.add_timer("b", NewTimer::duration("B", 1000).in_group("g"));

        fx.run(Command::ReorderTimers {
            group_id: "g".into(),
            ordered_ids: vec!["b".into(), "a".into()],
        });

        assert_eq!(fx.timer("b").order, 0);
        assert_eq!(fx.timer("a").order, 1);

        fx.start_group("g");
        assert_eq!(fx.timer("b").status, TimerStatus::Running);
        assert_eq!(fx.timer("a").status, TimerStatus::Waiting);
    }

    #[test]
    fn reorder_ignores_timers_from_other_groups() {
        let mut fx = morning();
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.add_timer("loose", NewTimer::duration("Loose", 1000));
        fx.add_timer("loose2", NewTimer::duration("Loose2", 1000));

        fx.run(Command::ReorderTimers {
            group_id: "g".into(),
            ordered_ids: vec!["loose2".into(), "a".into()],
        });

        assert_eq!(fx.timer("loose2").order, 1);
        assert_eq!(fx.timer("a").order, 0);
    }

    #[test]
    fn partial_reorder_keeps_orders_contiguous() {
        let mut fx = morning();
        for id in ["a", "b", "c", "d"] {
            fx.add_timer(id, NewTimer::duration(id.to_uppercase(), 1000).in_group("g"));
        }

        fx.run(Command::ReorderTimers {
            group_id: "g".into(),
            ordered_ids: vec!["c".into(), "a".into()],
        });

        let ids: Vec<&str> = fx.state.group_members("g").iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b", "d"]);
        let orders: Vec<u32> = fx.state.group_members("g").iter().map(|t| t.order).collect();
        assert_eq!(orders, [0, 1, 2, 3]);
    }

    #[test]
    fn deleting_a_group_ungroups_its_timers() {
        let mut fx = morning();
        fx.add_timer("loose", NewTimer::duration("Loose", 1000));
        fx.add_timer("a", NewTimer::duration("A", 1000).in_group("g"));
        fx.add_timer("b", NewTimer::duration("B", 1000).in_group("g"));

        fx.run(Command::DeleteGroup { id: "g".into() });

        assert!(fx.state.groups.is_empty());
        assert_eq!(fx.state.timers.len(), 3);
        assert_eq!(fx.timer("a").group_id, None);
        assert_eq!(fx.timer("b").group_id, None);
        assert_eq!(fx.timer("a").order, 1);
        assert_eq!(fx.timer("b").order, 2);
    }

    #[test]
    fn update_group_merges_and_can_clear_schedule() {
        let mut fx = Fixture::new();
        fx.add_group("g", NewGroup::named("Morning").scheduled("06:00".parse().unwrap()));

        fx.run(Command::UpdateGroup {
            id: "g".into(),
            patch: GroupPatch { collapsed: Some(true), ..GroupPatch::default() },
        });
        let group = &fx.state.groups["g"];
        assert!(group.collapsed);
        assert_eq!(group.name, "Morning");
        assert!(group.target_start_time.is_some());

        fx.run(Command::UpdateGroup {
            id: "g".into(),
            patch: GroupPatch { target_start_time: Some(None), ..GroupPatch::default() },
        });
        assert!(fx.state.groups["g"].target_start_time.is_none());

        fx.run(Command::ToggleGroupCollapse { id: "g".into() });
        assert!(!fx.state.groups["g"].collapsed);
    }
}
