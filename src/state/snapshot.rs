//! The whole-state value persisted and replaced on every transition

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    group::Group,
    timer::{GroupId, Timer, TimerId},
};
use crate::utils::clock::EpochMs;

/// Every timer and group, plus display preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    #[serde(default)]
    pub timers: BTreeMap<TimerId, Timer>,
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Group>,
    #[serde(default)]
    pub is_dark_mode: bool,
    /// When this snapshot was last written to storage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<EpochMs>,
}

impl TimerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Members of a group sorted by `order`
    pub fn group_members(&self, group_id: &str) -> Vec<&Timer> {
        let mut members: Vec<&Timer> = self
            .timers
            .values()
            .filter(|timer| timer.belongs_to(group_id))
            .collect();
        members.sort_by(|a, b| sibling_order(a, b));
        members
    }

    /// Number of timers sharing `group_id` (`None` counts ungrouped timers)
    pub fn sibling_count(&self, group_id: Option<&str>) -> u32 {
        let count = self
            .timers
            .values()
            .filter(|timer| timer.group_id.as_deref() == group_id)
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// Reassign `order` among siblings to a contiguous 0..n-1 run.
    ///
    /// Returns true when any timer moved.
    pub fn renumber(&mut self, group_id: Option<&str>) -> bool {
        let mut siblings: Vec<(u32, i64, TimerId)> = self
            .timers
            .values()
            .filter(|timer| timer.group_id.as_deref() == group_id)
            .map(|timer| (timer.order, timer.created_at, timer.id.clone()))
            .collect();
        siblings.sort();

        let mut changed = false;
        for (position, (_, _, id)) in (0u32..).zip(siblings) {
            if let Some(timer) = self.timers.get_mut(&id) {
                if timer.order != position {
                    timer.order = position;
                    changed = true;
                }
            }
        }
        changed
    }
}

fn sibling_order(a: &Timer, b: &Timer) -> std::cmp::Ordering {
    (a.order, a.created_at, &a.id).cmp(&(b.order, b.created_at, &b.id))
}
