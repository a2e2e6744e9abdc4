//! Group records and payloads

use serde::{Deserialize, Serialize};

use super::timer::{double_option, validate_name, GroupId};
use crate::{error::Result, utils::clock::TimeOfDay};

/// A named collection of timers sharing start/reset operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    /// Display-only flag
    #[serde(default)]
    pub collapsed: bool,
    /// Local "HH:MM" at which the group starts itself
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_start_time: Option<TimeOfDay>,
}

impl Group {
    pub fn from_new(id: GroupId, new: NewGroup) -> Self {
        Self {
            id,
            name: new.name.trim().to_string(),
            collapsed: false,
            target_start_time: new.target_start_time,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewGroup {
    pub name: String,
    #[serde(default)]
    pub target_start_time: Option<TimeOfDay>,
}

impl NewGroup {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_start_time: None,
        }
    }

    pub fn scheduled(mut self, start: TimeOfDay) -> Self {
        self.target_start_time = Some(start);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_name(&self.name)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub collapsed: Option<bool>,
    /// `null` clears the schedule
    #[serde(default, deserialize_with = "double_option")]
    pub target_start_time: Option<Option<TimeOfDay>>,
}

impl GroupPatch {
    pub fn validate(&self) -> Result<()> {
        match &self.name {
            Some(name) => validate_name(name),
            None => Ok(()),
        }
    }
}
