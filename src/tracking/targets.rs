//! Required and ignored skill lists

use serde::{Deserialize, Serialize};

use crate::catalog::SkillId;

/// `targetSkills` in the saved document. A skill is in at most one list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSkills {
    #[serde(default)]
    pub required: Vec<SkillId>,
    #[serde(default)]
    pub ignored: Vec<SkillId>,
}

/// Which list a skill sits in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Required,
    Ignored,
}

impl TargetSkills {
    pub fn target_of(&self, skill_id: &str) -> Option<Target> {
        if self.ignored.iter().any(|s| s == skill_id) {
            Some(Target::Ignored)
        } else if self.required.iter().any(|s| s == skill_id) {
            Some(Target::Required)
        } else {
            None
        }
    }

    pub fn is_required(&self, skill_id: &str) -> bool {
        self.target_of(skill_id) == Some(Target::Required)
    }

    /// Put a skill in one list, taking it out of the other.
    /// Returns false if it was already there.
    pub fn add(&mut self, skill_id: &str, target: Target) -> bool {
        let (list, other) = match target {
            Target::Required => (&mut self.required, &mut self.ignored),
            Target::Ignored => (&mut self.ignored, &mut self.required),
        };
        other.retain(|s| s != skill_id);
        if list.iter().any(|s| s == skill_id) {
            return false;
        }
        list.push(skill_id.to_string());
        true
    }

    /// Remove a skill from both lists
    pub fn remove(&mut self, skill_id: &str) -> bool {
        let before = self.required.len() + self.ignored.len();
        self.required.retain(|s| s != skill_id);
        self.ignored.retain(|s| s != skill_id);
        self.required.len() + self.ignored.len() != before
    }

    /// Repair documents written before the lists were kept apart: ignored
    /// wins, and repeats are dropped. Returns how many entries were removed.
    pub fn normalize(&mut self) -> usize {
        let before = self.required.len() + self.ignored.len();
        dedup_in_order(&mut self.ignored);
        dedup_in_order(&mut self.required);
        let ignored = &self.ignored;
        self.required.retain(|s| !ignored.contains(s));
        let removed = before - (self.required.len() + self.ignored.len());
        if removed > 0 {
            log::warn!("Dropped {} overlapping or repeated target skill entries", removed);
        }
        removed
    }
}

fn dedup_in_order(list: &mut Vec<SkillId>) {
    let mut seen: Vec<SkillId> = Vec::with_capacity(list.len());
    list.retain(|s| {
        if seen.contains(s) {
            false
        } else {
            seen.push(s.clone());
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_are_exclusive() {
        let mut targets = TargetSkills::default();
        assert!(targets.add("a", Target::Required));
        assert!(!targets.add("a", Target::Required));
        assert!(targets.add("a", Target::Ignored));
        assert!(targets.required.is_empty());
        assert_eq!(targets.target_of("a"), Some(Target::Ignored));

        assert!(targets.remove("a"));
        assert!(!targets.remove("a"));
        assert_eq!(targets.target_of("a"), None);
    }

    #[test]
    fn test_normalize_prefers_ignored() {
        let mut targets = TargetSkills {
            required: vec!["a".into(), "b".into(), "b".into(), "c".into()],
            ignored: vec!["c".into(), "d".into()],
        };
        assert_eq!(targets.normalize(), 2);
        assert_eq!(targets.required, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(targets.ignored, vec!["c".to_string(), "d".to_string()]);
        assert_eq!(targets.normalize(), 0);
    }
}
