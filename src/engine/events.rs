//! Discrete events emitted by state transitions
//!
//! Collaborators (alarm sounds, OS notifications) subscribe to these
//! instead of diffing snapshots.

use serde::{Deserialize, Serialize};

use crate::{
    state::timer::{GroupId, TimerId},
    utils::clock::EpochMs,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum TimerEvent {
    /// A run cycle reached zero; recurring timers keep running
    #[serde(rename_all = "camelCase")]
    CycleCompleted {
        timer_id: TimerId,
        recurring: bool,
        at: EpochMs,
    },
    /// A finished chain member handed over to the next waiting sibling
    #[serde(rename_all = "camelCase")]
    ChainAdvanced {
        group_id: GroupId,
        completed_id: TimerId,
        promoted_id: TimerId,
    },
    /// A group started itself at its scheduled time
    #[serde(rename_all = "camelCase")]
    GroupAutoStarted { group_id: GroupId, at: EpochMs },
}

impl TimerEvent {
    /// The timer whose alarm should sound, if any
    pub fn alarm_timer(&self) -> Option<&str> {
        match self {
            TimerEvent::CycleCompleted { timer_id, .. } => Some(timer_id),
            _ => None,
        }
    }
}
