//! Progress towards the required skill list

use crate::catalog::{Lookup, SkillId};
use crate::deck::ObtainableSkills;

use super::check::CheckStates;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntry {
    pub skill_id: SkillId,
    pub name: String,
    /// Whether the current deck can grant the skill at all
    pub obtainable: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetProgress {
    pub acquired: Vec<TargetEntry>,
    pub remaining: Vec<TargetEntry>,
}

impl TargetProgress {
    pub fn acquired_count(&self) -> usize {
        self.acquired.len()
    }

    /// Required skills that resolved to a known skill
    pub fn required_total(&self) -> usize {
        self.acquired.len() + self.remaining.len()
    }

    /// Completion between 0.0 and 1.0; an empty target list is 0.0
    pub fn ratio(&self) -> f32 {
        match self.required_total() {
            0 => 0.0,
            total => self.acquired_count() as f32 / total as f32,
        }
    }
}

/// Split the required skills into acquired and remaining, in list order.
///
/// `obtainable` should be the derived set before ignored skills are removed,
/// so a skill that is both required and ignored is still reported as
/// obtainable.
pub fn compute_progress(
    required: &[SkillId],
    obtainable: &ObtainableSkills,
    checks: &CheckStates,
    lookup: &Lookup,
) -> TargetProgress {
    let mut progress = TargetProgress::default();
    for id in required {
        let Some(skill) = lookup.skill(id) else {
            log::warn!("Skipping unknown target skill {}", id);
            continue;
        };
        let entry = TargetEntry {
            skill_id: id.clone(),
            name: skill.name.clone(),
            obtainable: obtainable.contains_key(id),
        };
        if checks.is_acquired(id) {
            progress.acquired.push(entry);
        } else {
            progress.remaining.push(entry);
        }
    }
    progress
}
