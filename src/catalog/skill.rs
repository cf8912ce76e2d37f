//! Skill definitions
//!
//! Skills are the unit everything else in the planner points at: cards,
//! factor sets and scenarios only ever carry skill ids.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Skill identifier (`skillId` in the catalog documents)
pub type SkillId = String;

/// Display sub-group of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    #[default]
    Common,
    Distance,
    Style,
    /// Anything the catalog invents later; displayed with `Common`
    #[serde(other)]
    Other,
}

impl SkillCategory {
    /// Fixed display order of the sub-groups
    pub const DISPLAY_ORDER: [SkillCategory; 3] =
        [SkillCategory::Common, SkillCategory::Distance, SkillCategory::Style];

    /// The sub-group this category is displayed in
    pub fn display_group(self) -> SkillCategory {
        match self {
            SkillCategory::Other => SkillCategory::Common,
            other => other,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SkillCategory::Common | SkillCategory::Other => "common",
            SkillCategory::Distance => "distance",
            SkillCategory::Style => "style",
        }
    }
}

/// Upgrade tier of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpgradeType {
    Normal,
    Gold,
    Evolved,
    #[serde(other)]
    Unknown,
}

impl UpgradeType {
    /// Sort precedence, lower sorts first
    pub fn rank(upgrade: Option<UpgradeType>) -> u8 {
        match upgrade {
            Some(UpgradeType::Gold) => 1,
            Some(UpgradeType::Evolved) => 2,
            Some(UpgradeType::Normal) => 3,
            Some(UpgradeType::Unknown) | None => 99,
        }
    }
}

/// Effect family of a skill
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EffectType {
    Normal,
    Passive,
    Heal,
    Debuff,
    #[serde(other)]
    Unknown,
}

impl EffectType {
    /// Sort precedence, lower sorts first
    pub fn rank(effect: Option<EffectType>) -> u8 {
        match effect {
            Some(EffectType::Passive) => 1,
            Some(EffectType::Heal) => 2,
            Some(EffectType::Debuff) => 3,
            Some(EffectType::Normal) => 4,
            Some(EffectType::Unknown) | None => 99,
        }
    }
}

/// A skill definition, master or user-authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    #[serde(rename = "skillId")]
    pub id: SkillId,
    pub name: String,
    #[serde(default)]
    pub category: SkillCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upgrade_type: Option<UpgradeType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effect_type: Option<EffectType>,
    /// Character-exclusive skill
    #[serde(default)]
    pub is_unique: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolution_condition: Option<String>,
    #[serde(default)]
    pub is_custom: bool,
    #[serde(default)]
    pub show_custom_highlight: bool,
}

impl Skill {
    /// A bare custom skill with only a name, as created from free-text entry
    pub fn custom(id: impl Into<SkillId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: SkillCategory::Common,
            upgrade_type: None,
            effect_type: None,
            is_unique: false,
            tags: Vec::new(),
            evolution_condition: None,
            is_custom: true,
            show_custom_highlight: false,
        }
    }

    /// Display precedence: unique first, then upgrade tier, effect family, name
    pub fn precedence(&self, other: &Skill) -> Ordering {
        other
            .is_unique
            .cmp(&self.is_unique)
            .then_with(|| UpgradeType::rank(self.upgrade_type).cmp(&UpgradeType::rank(other.upgrade_type)))
            .then_with(|| EffectType::rank(self.effect_type).cmp(&EffectType::rank(other.effect_type)))
            .then_with(|| compare_names(&self.name, &other.name))
    }
}

/// Name ordering used for display lists.
///
/// Case-insensitive first so "arc" and "Arc" sit together, falling back to
/// the raw code point order. Hangul syllables are laid out in dictionary
/// order in Unicode, so this matches the Korean collation the names use.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_enum_strings_are_tolerated() {
        let json = r#"{"skillId":"s1","name":"Arc","category":"weather","upgradeType":"rainbow","effectType":"buff"}"#;
        let skill: Skill = serde_json::from_str(json).unwrap();
        assert_eq!(skill.category, SkillCategory::Other);
        assert_eq!(skill.category.display_group(), SkillCategory::Common);
        assert_eq!(skill.upgrade_type, Some(UpgradeType::Unknown));
        assert_eq!(skill.effect_type, Some(EffectType::Unknown));
        assert!(!skill.is_custom);
    }

    #[test]
    fn test_missing_category_defaults_to_common() {
        let skill: Skill = serde_json::from_str(r#"{"skillId":"s1","name":"Arc"}"#).unwrap();
        assert_eq!(skill.category, SkillCategory::Common);
        assert_eq!(UpgradeType::rank(skill.upgrade_type), 99);
    }

    #[test]
    fn test_ranks() {
        assert!(UpgradeType::rank(Some(UpgradeType::Gold)) < UpgradeType::rank(Some(UpgradeType::Evolved)));
        assert!(UpgradeType::rank(Some(UpgradeType::Evolved)) < UpgradeType::rank(Some(UpgradeType::Normal)));
        assert!(EffectType::rank(Some(EffectType::Passive)) < EffectType::rank(Some(EffectType::Heal)));
        assert!(EffectType::rank(Some(EffectType::Debuff)) < EffectType::rank(Some(EffectType::Normal)));
        assert_eq!(EffectType::rank(None), 99);
    }

    #[test]
    fn test_precedence_puts_unique_first() {
        let mut unique = Skill::custom("u", "Zenith");
        unique.is_unique = true;
        let mut gold = Skill::custom("g", "Aurora");
        gold.upgrade_type = Some(UpgradeType::Gold);
        assert_eq!(unique.precedence(&gold), Ordering::Less);
        assert_eq!(gold.precedence(&Skill::custom("n", "Aardvark")), Ordering::Less);
    }

    #[test]
    fn test_compare_names() {
        assert_eq!(compare_names("apple", "Banana"), Ordering::Less);
        assert_eq!(compare_names("가속", "나선"), Ordering::Less);
        assert_eq!(compare_names("Arc", "arc"), Ordering::Less);
    }
}
