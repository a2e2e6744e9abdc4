//! Timer records, creation payloads and partial updates

use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{AppError, Result},
    utils::clock::{next_occurrence, remaining_from, remaining_until, EpochMs, LocalTime, TimeOfDay},
};

pub type TimerId = String;
pub type GroupId = String;

/// How a timer measures its countdown
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerKind {
    /// Counts down from a fixed number of milliseconds
    #[default]
    Duration,
    /// Counts down to the next occurrence of a local wall-clock time
    TimeOfDay,
}

/// Lifecycle status of a timer
///
/// `idle -> running -> (paused <-> running) -> completed`, with `waiting`
/// entered only when a group starts and left only by chain promotion.
/// Any status returns to `idle` on reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimerStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Waiting,
    Completed,
}

/// One countdown or alarm
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timer {
    pub id: TimerId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: TimerKind,
    /// Value restored on reset, in milliseconds
    pub initial_duration: u64,
    pub remaining_time: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_time_of_day: Option<TimeOfDay>,
    /// Absolute deadline of a running time-of-day timer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry_timestamp: Option<EpochMs>,
    pub status: TimerStatus,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    /// Zero-based position among siblings sharing `group_id`
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub is_recurring: bool,
    pub created_at: EpochMs,
    /// Bumped every time a run cycle completes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cycle_completed_at: Option<EpochMs>,
    #[serde(default)]
    pub sound_uri: Option<String>,
    #[serde(default)]
    pub sound_name: Option<String>,
}

impl Timer {
    /// Build an idle timer from a validated creation payload
    pub fn from_new(id: TimerId, new: NewTimer, order: u32, now: &LocalTime) -> Self {
        let mut timer = Self {
            id,
            name: new.name.trim().to_string(),
            kind: new.kind,
            initial_duration: new.duration,
            remaining_time: new.duration,
            target_time_of_day: new.target_time_of_day,
            expiry_timestamp: None,
            status: TimerStatus::Idle,
            group_id: new.group_id,
            order,
            is_recurring: new.is_recurring,
            created_at: now.timestamp_millis(),
            last_cycle_completed_at: None,
            sound_uri: new.sound_uri,
            sound_name: new.sound_name,
        };
        if let Some(target) = timer.time_of_day_target() {
            timer.remaining_time = remaining_until(target, now);
            timer.initial_duration = timer.remaining_time;
        }
        timer
    }

    /// The wall-clock target, only for time-of-day timers
    pub fn time_of_day_target(&self) -> Option<TimeOfDay> {
        match self.kind {
            TimerKind::TimeOfDay => self.target_time_of_day,
            TimerKind::Duration => None,
        }
    }

    /// Time-of-day and recurring timers run alongside a group's chain
    pub fn is_chain_exempt(&self) -> bool {
        self.kind == TimerKind::TimeOfDay || self.is_recurring
    }

    /// Running or queued in a chain
    pub fn is_active(&self) -> bool {
        matches!(self.status, TimerStatus::Running | TimerStatus::Waiting)
    }

    pub fn belongs_to(&self, group_id: &str) -> bool {
        self.group_id.as_deref() == Some(group_id)
    }

    /// Remaining time as computed from scratch, ignoring progress
    pub fn fresh_remaining(&self, now: &LocalTime) -> u64 {
        match self.time_of_day_target() {
            Some(target) => remaining_until(target, now),
            None => self.initial_duration,
        }
    }

    /// Compute a new deadline for a time-of-day timer and derive remaining from it
    pub(crate) fn arm_expiry(&mut self, now: &LocalTime) {
        if let Some(target) = self.time_of_day_target() {
            let expiry = next_occurrence(target, now);
            self.expiry_timestamp = Some(expiry);
            self.remaining_time = remaining_from(expiry, now);
        }
    }
}

/// Payload for creating a timer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTimer {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: TimerKind,
    /// Length in milliseconds, required for duration timers
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub target_time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub group_id: Option<GroupId>,
    #[serde(default)]
    pub is_recurring: bool,
    #[serde(default)]
    pub sound_uri: Option<String>,
    #[serde(default)]
    pub sound_name: Option<String>,
}

impl NewTimer {
    pub fn duration(name: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            name: name.into(),
            kind: TimerKind::Duration,
            duration: duration_ms,
            ..Self::default()
        }
    }

    pub fn time_of_day(name: impl Into<String>, target: TimeOfDay) -> Self {
        Self {
            name: name.into(),
            kind: TimerKind::TimeOfDay,
            target_time_of_day: Some(target),
            ..Self::default()
        }
    }

    pub fn in_group(mut self, group_id: impl Into<GroupId>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    /// Reject payloads that must never reach the engine
    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)?;
        match self.kind {
            TimerKind::Duration if self.duration == 0 => {
                Err(AppError::invalid("duration timers need a positive duration"))
            }
            TimerKind::TimeOfDay if self.target_time_of_day.is_none() => {
                Err(AppError::invalid("time-of-day timers need a targetTimeOfDay"))
            }
            _ => Ok(()),
        }
    }
}

/// Partial update of a timer; absent fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerPatch {
    #[serde(default)]
    pub name: Option<String>,
    /// New length in milliseconds
    #[serde(default)]
    pub duration: Option<u64>,
    #[serde(default)]
    pub target_time_of_day: Option<TimeOfDay>,
    /// `null` moves the timer out of its group
    #[serde(default, deserialize_with = "double_option")]
    pub group_id: Option<Option<GroupId>>,
    #[serde(default)]
    pub is_recurring: Option<bool>,
    #[serde(default, deserialize_with = "double_option")]
    pub sound_uri: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub sound_name: Option<Option<String>>,
}

impl TimerPatch {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            validate_name(name)?;
        }
        if self.duration == Some(0) {
            return Err(AppError::invalid("duration must be positive"));
        }
        Ok(())
    }
}

pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(AppError::invalid("name must not be empty"));
    }
    Ok(())
}

/// Distinguish a missing field (`None`) from an explicit `null` (`Some(None)`)
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::clock::test_support::at;

    #[test]
    fn validation_rejects_bad_payloads() {
        assert!(NewTimer::duration("  ", 1000).validate().is_err());
        assert!(NewTimer::duration("Tea", 0).validate().is_err());
        assert!(NewTimer::duration("Tea", 1000).validate().is_ok());

        let mut alarm = NewTimer::time_of_day("Wake", "06:30".parse().unwrap());
        assert!(alarm.validate().is_ok());
        alarm.target_time_of_day = None;
        assert!(alarm.validate().is_err());

        let patch = TimerPatch { duration: Some(0), ..TimerPatch::default() };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn time_of_day_timer_starts_with_remaining_until_target() {
        let now = at(2024, 5, 1, 6, 0, 0);
        let timer = Timer::from_new(
            "t1".into(),
            NewTimer::time_of_day("Wake", "06:30".parse().unwrap()),
            0,
            &now,
        );

        assert_eq!(timer.status, TimerStatus::Idle);
        assert_eq!(timer.remaining_time, 30 * 60_000);
        assert_eq!(timer.created_at, now.timestamp_millis());
        assert!(timer.is_chain_exempt());
    }

    #[test]
    fn patch_distinguishes_null_from_missing() {
        let ungroup: TimerPatch = serde_json::from_str(r#"{"groupId": null}"#).unwrap();
        assert_eq!(ungroup.group_id, Some(None));

        let untouched: TimerPatch = serde_json::from_str(r#"{"name": "Tea"}"#).unwrap();
        assert_eq!(untouched.group_id, None);
    }

    #[test]
    fn payload_uses_camel_case_layout() {
        let new: NewTimer = serde_json::from_str(
            r#"{"name":"Alarm","type":"timeOfDay","targetTimeOfDay":"07:15","isRecurring":true}"#,
        )
        .unwrap();

        assert_eq!(new.kind, TimerKind::TimeOfDay);
        assert_eq!(new.target_time_of_day.map(|t| t.to_string()).as_deref(), Some("07:15"));
        assert!(new.is_recurring);
    }
}
