//! Per-skill acquisition state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;

/// Tri-state checkbox, stored as 0 / 1 / 2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum CheckState {
    #[default]
    NotStarted,
    InProgress,
    Acquired,
}

impl CheckState {
    /// Next state when the checkbox is clicked
    pub fn next(self) -> Self {
        match self {
            CheckState::NotStarted => CheckState::InProgress,
            CheckState::InProgress => CheckState::Acquired,
            CheckState::Acquired => CheckState::NotStarted,
        }
    }

    pub fn is_acquired(self) -> bool {
        self == CheckState::Acquired
    }

    pub fn symbol(self) -> &'static str {
        match self {
            CheckState::NotStarted => "[ ]",
            CheckState::InProgress => "[~]",
            CheckState::Acquired => "[x]",
        }
    }
}

impl From<u8> for CheckState {
    fn from(value: u8) -> Self {
        match value {
            1 => CheckState::InProgress,
            2 => CheckState::Acquired,
            _ => CheckState::NotStarted,
        }
    }
}

impl From<CheckState> for u8 {
    fn from(state: CheckState) -> Self {
        match state {
            CheckState::NotStarted => 0,
            CheckState::InProgress => 1,
            CheckState::Acquired => 2,
        }
    }
}

/// Check states by skill id (`skillCheckStates`). Missing ids are `NotStarted`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckStates(BTreeMap<SkillId, CheckState>);

impl CheckStates {
    pub fn get(&self, skill_id: &str) -> CheckState {
        self.0.get(skill_id).copied().unwrap_or_default()
    }

    pub fn is_acquired(&self, skill_id: &str) -> bool {
        self.get(skill_id).is_acquired()
    }

    pub fn set(&mut self, skill_id: &str, state: CheckState) {
        if state == CheckState::NotStarted {
            self.0.remove(skill_id);
        } else {
            self.0.insert(skill_id.to_string(), state);
        }
    }

    /// Advance one skill's state and return the new one
    pub fn cycle(&mut self, skill_id: &str) -> CheckState {
        let next = self.get(skill_id).next();
        self.set(skill_id, next);
        next
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_wraps() {
        let mut states = CheckStates::default();
        assert_eq!(states.cycle("s"), CheckState::InProgress);
        assert_eq!(states.cycle("s"), CheckState::Acquired);
        assert!(states.is_acquired("s"));
        assert_eq!(states.cycle("s"), CheckState::NotStarted);
        assert!(states.is_empty());
    }

    #[test]
    fn test_serialized_as_integers() {
        let mut states = CheckStates::default();
        states.set("a", CheckState::Acquired);
        states.set("b", CheckState::InProgress);
        assert_eq!(serde_json::to_string(&states).unwrap(), r#"{"a":2,"b":1}"#);

        let parsed: CheckStates = serde_json::from_str(r#"{"a": 2, "b": 0, "c": 7}"#).unwrap();
        assert_eq!(parsed.get("a"), CheckState::Acquired);
        assert_eq!(parsed.get("b"), CheckState::NotStarted);
        assert_eq!(parsed.get("c"), CheckState::NotStarted);
        assert_eq!(parsed.get("missing"), CheckState::NotStarted);
    }
}
