//! Support cards
//!
//! A `SupportCard` is a template (master or custom). An `OwnedCard` is one
//! copy in the user's collection pointing at a template.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use super::skill::SkillId;

/// Highest breakthrough level a card can reach
pub const MAX_BREAKTHROUGH: u8 = 4;

/// A group of alternative gold skills; the player picks one of `choices`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GoldenSkill {
    #[serde(default)]
    pub choices: Vec<SkillId>,
}

/// Support card template
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportCard {
    #[serde(rename = "masterCardId")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub golden_skills: Vec<GoldenSkill>,
    #[serde(default)]
    pub hint_skills: Vec<SkillId>,
    #[serde(default)]
    pub event_skills: Vec<SkillId>,
    /// Breakthrough level -> hint level (master cards only)
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "level_keys")]
    pub level_mapping: Option<BTreeMap<u8, u8>>,
    /// Fixed hint level (custom cards only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_level: Option<u8>,
    #[serde(default)]
    pub is_custom: bool,
}

/// Object keys are strings in JSON, including when the card sits inside a
/// tagged envelope that serde buffers first
fn level_keys<'de, D>(deserializer: D) -> Result<Option<BTreeMap<u8, u8>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<BTreeMap<String, u8>>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let mut mapping = BTreeMap::new();
    for (key, hint_level) in raw {
        match key.trim().parse::<u8>() {
            Ok(level) => {
                mapping.insert(level, hint_level);
            }
            Err(_) => return Err(D::Error::custom(format!("levelMapping key {key:?} is not a level"))),
        }
    }
    Ok(Some(mapping))
}

impl SupportCard {
    /// Every skill id the card references, in traversal order
    pub fn skill_refs(&self) -> impl Iterator<Item = &SkillId> {
        self.golden_skills
            .iter()
            .flat_map(|g| g.choices.iter())
            .chain(self.hint_skills.iter())
            .chain(self.event_skills.iter())
    }

    /// Mutable access to every skill id list on the card
    pub(crate) fn skill_lists_mut(&mut self) -> impl Iterator<Item = &mut Vec<SkillId>> {
        self.golden_skills
            .iter_mut()
            .map(|g| &mut g.choices)
            .chain(std::iter::once(&mut self.hint_skills))
            .chain(std::iter::once(&mut self.event_skills))
    }
}

/// A support card in the user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCard {
    #[serde(rename = "userCardId")]
    pub id: String,
    /// Template id (master or custom)
    #[serde(rename = "masterCardId")]
    pub template_id: String,
    /// Template name at the time the card was added
    pub name: String,
    /// Breakthrough level, 0..=4
    #[serde(default)]
    pub level: u8,
    /// Stored hint level, only meaningful for custom templates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint_level: Option<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_mapping_reads_string_keys() {
        let json = r#"{
            "masterCardId": "sc1",
            "name": "Kitasan",
            "goldenSkills": [{"choices": ["g1", "g2"]}],
            "hintSkills": ["h1"],
            "levelMapping": {"0": 1, "4": 5}
        }"#;
        let card: SupportCard = serde_json::from_str(json).unwrap();
        let mapping = card.level_mapping.as_ref().unwrap();
        assert_eq!(mapping.get(&4), Some(&5));
        assert!(card.event_skills.is_empty());
        assert!(!card.is_custom);
    }

    #[test]
    fn test_level_mapping_rejects_non_numeric_keys() {
        let json = r#"{"masterCardId": "sc1", "name": "Kitasan", "levelMapping": {"max": 5}}"#;
        let err = serde_json::from_str::<SupportCard>(json).unwrap_err();
        assert!(err.to_string().contains("max"));

        let json = r#"{"masterCardId": "sc1", "name": "Kitasan", "levelMapping": null}"#;
        assert!(serde_json::from_str::<SupportCard>(json).unwrap().level_mapping.is_none());
    }

    #[test]
    fn test_skill_refs_order() {
        let card = SupportCard {
            id: "sc".into(),
            name: "Card".into(),
            golden_skills: vec![GoldenSkill { choices: vec!["g1".into(), "g2".into()] }],
            hint_skills: vec!["h1".into()],
            event_skills: vec!["e1".into()],
            level_mapping: None,
            hint_level: Some(3),
            is_custom: true,
        };
        let refs: Vec<&str> = card.skill_refs().map(String::as_str).collect();
        assert_eq!(refs, vec!["g1", "g2", "h1", "e1"]);
    }
}
