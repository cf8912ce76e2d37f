//! Grouping of obtainable skills for display
//!
//! Every skill lands in exactly one exclusivity bucket by where it can come
//! from: only the scenario, only factors, only support cards, or a mix.
//! Acquired skills are also collected separately. Inside a bucket skills are
//! split by category and sorted unique first, then by upgrade tier, effect
//! and name.

use std::collections::BTreeSet;

use crate::catalog::{Lookup, Skill, SkillCategory, SkillId};
use crate::deck::{ObtainableSkills, SourceGroup};

use super::check::CheckStates;

/// Exclusivity buckets, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Exclusivity {
    ScenarioOnly,
    FactorOnly,
    SupportOnly,
    Mixed,
}

impl Exclusivity {
    pub const ALL: [Exclusivity; 4] = [
        Exclusivity::ScenarioOnly,
        Exclusivity::FactorOnly,
        Exclusivity::SupportOnly,
        Exclusivity::Mixed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Exclusivity::ScenarioOnly => "Scenario only",
            Exclusivity::FactorOnly => "Factors only",
            Exclusivity::SupportOnly => "Support cards only",
            Exclusivity::Mixed => "Multiple sources",
        }
    }

    fn of(groups: &BTreeSet<SourceGroup>) -> Exclusivity {
        let mut iter = groups.iter();
        match (iter.next(), iter.next()) {
            (Some(SourceGroup::Scenario), None) => Exclusivity::ScenarioOnly,
            (Some(SourceGroup::Factor), None) => Exclusivity::FactorOnly,
            (Some(SourceGroup::Support), None) => Exclusivity::SupportOnly,
            _ => Exclusivity::Mixed,
        }
    }
}

/// Skill ids of one bucket, split by display category
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bucket {
    sections: [Vec<SkillId>; 3],
}

impl Bucket {
    fn index(category: SkillCategory) -> usize {
        match category.display_group() {
            SkillCategory::Distance => 1,
            SkillCategory::Style => 2,
            _ => 0,
        }
    }

    fn push(&mut self, skill: &Skill) {
        self.sections[Self::index(skill.category)].push(skill.id.clone());
    }

    pub fn section(&self, category: SkillCategory) -> &[SkillId] {
        &self.sections[Self::index(category)]
    }

    /// Non-empty sections in display order
    pub fn sections(&self) -> impl Iterator<Item = (SkillCategory, &[SkillId])> {
        SkillCategory::DISPLAY_ORDER
            .into_iter()
            .map(|category| (category, self.section(category)))
            .filter(|(_, ids)| !ids.is_empty())
    }

    /// All ids in display order
    pub fn ids(&self) -> impl Iterator<Item = &SkillId> {
        self.sections.iter().flatten()
    }

    pub fn contains(&self, skill_id: &str) -> bool {
        self.ids().any(|id| id == skill_id)
    }

    pub fn len(&self) -> usize {
        self.sections.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub scenario_only: Bucket,
    pub factor_only: Bucket,
    pub support_only: Bucket,
    pub mixed: Bucket,
    pub acquired: Bucket,
}

impl Classification {
    pub fn bucket(&self, exclusivity: Exclusivity) -> &Bucket {
        match exclusivity {
            Exclusivity::ScenarioOnly => &self.scenario_only,
            Exclusivity::FactorOnly => &self.factor_only,
            Exclusivity::SupportOnly => &self.support_only,
            Exclusivity::Mixed => &self.mixed,
        }
    }

    fn bucket_mut(&mut self, exclusivity: Exclusivity) -> &mut Bucket {
        match exclusivity {
            Exclusivity::ScenarioOnly => &mut self.scenario_only,
            Exclusivity::FactorOnly => &mut self.factor_only,
            Exclusivity::SupportOnly => &mut self.support_only,
            Exclusivity::Mixed => &mut self.mixed,
        }
    }
}

/// Group obtainable skills. With `hide_acquired`, acquired skills appear
/// only in the acquired bucket.
pub fn classify(
    skills: &ObtainableSkills,
    lookup: &Lookup,
    checks: &CheckStates,
    hide_acquired: bool,
) -> Classification {
    let mut entries: Vec<(&Skill, Exclusivity)> = Vec::with_capacity(skills.len());
    for obtainable in skills.values() {
        let Some(skill) = lookup.skill(&obtainable.skill_id) else {
            log::warn!("Cannot classify unknown skill {}", obtainable.skill_id);
            continue;
        };
        let groups: BTreeSet<SourceGroup> = obtainable.groups().collect();
        entries.push((skill, Exclusivity::of(&groups)));
    }
    entries.sort_by(|(a, _), (b, _)| a.precedence(b));

    let mut classification = Classification::default();
    for (skill, exclusivity) in entries {
        let acquired = checks.is_acquired(&skill.id);
        if acquired {
            classification.acquired.push(skill);
        }
        if !(acquired && hide_acquired) {
            classification.bucket_mut(exclusivity).push(skill);
        }
    }
    classification
}
