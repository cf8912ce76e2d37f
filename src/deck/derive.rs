//! Skill derivation
//!
//! Walks a deck in a fixed order and records every skill it can grant,
//! together with where each grant comes from:
//!
//! 1. factor set slots, each with its parent, grandparent 1, grandparent 2
//! 2. support cards, each selected instance once, in slot order
//! 3. the scenario
//!
//! The result keeps first-seen order so repeated derivations over the same
//! input are identical, down to the order of the source lists.

use indexmap::IndexMap;
use serde::Serialize;

use super::level::card_level_info;
use super::Deck;
use crate::catalog::{FactorSlot, Lookup, SkillId};
use crate::custom::OwnedCollection;

/// How a skill is granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceType {
    /// Unique skill declared on a factor slot
    Unique,
    /// Unique skill reached through a green factor that only names it
    UniqueViaFactor,
    Factor,
    Gold,
    Hint,
    Event,
    GoldScenario,
    Scenario,
}

/// Coarse origin used for exclusivity grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SourceGroup {
    Scenario,
    Factor,
    Support,
}

impl SourceType {
    pub fn group(self) -> SourceGroup {
        match self {
            SourceType::Unique | SourceType::UniqueViaFactor | SourceType::Factor => SourceGroup::Factor,
            SourceType::Scenario | SourceType::GoldScenario => SourceGroup::Scenario,
            SourceType::Gold | SourceType::Hint | SourceType::Event => SourceGroup::Support,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SourceType::Unique => "unique",
            SourceType::UniqueViaFactor => "unique via factor",
            SourceType::Factor => "factor",
            SourceType::Gold => "gold",
            SourceType::Hint => "hint",
            SourceType::Event => "event",
            SourceType::GoldScenario => "scenario gold",
            SourceType::Scenario => "scenario",
        }
    }
}

/// One grant of a skill
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Character, card or scenario name
    pub source: String,
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObtainableSkill {
    pub skill_id: SkillId,
    pub name: String,
    pub sources: Vec<Provenance>,
}

impl ObtainableSkill {
    /// `Kitasan Black(hint Lv.5), Vodka(factor)`
    pub fn sources_label(&self) -> String {
        self.sources
            .iter()
            .map(|p| match p.level {
                Some(level) if level > 0 => format!("{}({} Lv.{})", p.source, p.kind.label(), level),
                _ => format!("{}({})", p.source, p.kind.label()),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn groups(&self) -> impl Iterator<Item = SourceGroup> + '_ {
        self.sources.iter().map(|p| p.kind.group())
    }
}

/// Derived skills keyed by id, in the order they were first granted
pub type ObtainableSkills = IndexMap<SkillId, ObtainableSkill>;

struct Collector<'l, 'a> {
    lookup: &'l Lookup<'a>,
    skills: ObtainableSkills,
}

impl Collector<'_, '_> {
    fn record(&mut self, skill_id: &str, source: &str, kind: SourceType, level: Option<u8>) {
        if skill_id.is_empty() {
            return;
        }
        let Some(skill) = self.lookup.skill(skill_id) else {
            log::warn!("Dropping unknown skill {} granted by {} ({})", skill_id, source, kind.label());
            return;
        };
        let entry = self
            .skills
            .entry(skill_id.to_string())
            .or_insert_with(|| ObtainableSkill {
                skill_id: skill_id.to_string(),
                name: skill.name.clone(),
                sources: Vec::new(),
            });
        entry.sources.push(Provenance {
            source: source.to_string(),
            kind,
            level,
        });
    }

    fn factor_slot(&mut self, slot: &FactorSlot) {
        let source = slot.name.as_str();
        if let Some(id) = &slot.unique_skill_id {
            self.record(id, source, SourceType::Unique, None);
        }

        if let Some(green) = &slot.green_factor {
            let linked = green.skill_id.as_deref().and_then(|id| self.lookup.skill(id));
            let named_unique = green
                .skill_name
                .as_deref()
                .and_then(|name| self.lookup.skill_by_name(name))
                .filter(|skill| skill.is_unique);
            match (linked, named_unique) {
                (Some(skill), _) => self.record(&skill.id, source, SourceType::Factor, None),
                (None, Some(skill)) => self.record(&skill.id, source, SourceType::UniqueViaFactor, None),
                (None, None) => {
                    if let Some(id) = &green.skill_id {
                        log::warn!("Green factor on {} points at unknown skill {}", source, id);
                    }
                }
            }
        }

        for id in &slot.skill_factors {
            self.record(id, source, SourceType::Factor, None);
        }
    }
}

/// Every skill the deck can grant, before the ignore list is applied
pub fn collect_obtainable_skills(deck: &Deck, owned: &OwnedCollection, lookup: &Lookup) -> ObtainableSkills {
    let mut collector = Collector {
        lookup,
        skills: ObtainableSkills::new(),
    };

    for instance_id in deck.factor_set_ids() {
        let Some(instance) = owned.factor_set(instance_id) else {
            log::warn!("Deck factor set {} is not in the collection", instance_id);
            continue;
        };
        let Some(template) = lookup.factor_set(&instance.template_id) else {
            log::warn!("Factor set {} has unknown template {}", instance_id, instance.template_id);
            continue;
        };
        for (_, slot) in template.slots.iter() {
            collector.factor_slot(slot);
        }
    }

    for instance_id in deck.support_card_ids() {
        let Some(instance) = owned.card(instance_id) else {
            log::warn!("Deck support card {} is not in the collection", instance_id);
            continue;
        };
        let Some(template) = lookup.support_card(&instance.template_id) else {
            log::warn!("Support card {} has unknown template {}", instance_id, instance.template_id);
            continue;
        };
        let hint_level = card_level_info(instance, lookup).hint_level;
        for id in template.golden_skills.iter().flat_map(|g| &g.choices) {
            collector.record(id, &template.name, SourceType::Gold, None);
        }
        for id in &template.hint_skills {
            collector.record(id, &template.name, SourceType::Hint, Some(hint_level));
        }
        for id in &template.event_skills {
            collector.record(id, &template.name, SourceType::Event, None);
        }
    }

    if let Some(scenario_id) = &deck.scenario {
        match lookup.scenario(scenario_id) {
            Some(scenario) => {
                for id in scenario.golden_skills.iter().flat_map(|g| &g.choices) {
                    collector.record(id, &scenario.name, SourceType::GoldScenario, None);
                }
                for granted in &scenario.skills {
                    collector.record(&granted.skill_id, &scenario.name, SourceType::Scenario, granted.level);
                }
            }
            None => log::warn!("Deck scenario {} is not in the catalog", scenario_id),
        }
    }

    collector.skills
}

/// Drop ignored skills, keeping the order of the rest
pub fn remove_ignored(skills: &mut ObtainableSkills, ignored: &[SkillId]) {
    for id in ignored {
        skills.shift_remove(id);
    }
}

/// Obtainable skills for a deck with the ignore list applied
pub fn derive_obtainable_skills(
    deck: &Deck,
    owned: &OwnedCollection,
    lookup: &Lookup,
    ignored: &[SkillId],
) -> ObtainableSkills {
    let mut skills = collect_obtainable_skills(deck, owned, lookup);
    remove_ignored(&mut skills, ignored);
    skills
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FactorSet, FactorSlots, GreenFactor};
    use crate::custom::CustomData;
    use crate::fixtures;

    fn deck(scenario: Option<&str>, inza: [Option<&str>; 2], cards: &[&str]) -> Deck {
        let mut deck = Deck {
            scenario: scenario.map(str::to_string),
            inza: inza.map(|i| i.map(str::to_string)),
            ..Default::default()
        };
        for (slot, id) in deck.support_cards.iter_mut().zip(cards) {
            *slot = Some(id.to_string());
        }
        deck
    }

    fn kinds(skill: &ObtainableSkill) -> Vec<SourceType> {
        skill.sources.iter().map(|p| p.kind).collect()
    }

    #[test]
    fn test_card_and_scenario_in_traversal_order() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let skills = derive_obtainable_skills(&deck(Some("scn_ura"), [None, None], &["user_sc_kita"]), &owned, &lookup, &[]);

        let ids: Vec<&str> = skills.keys().map(String::as_str).collect();
        assert_eq!(
            ids,
            vec!["skill_focus", "skill_corner", "skill_straight", "skill_front", "skill_ultimate", "skill_ura_spirit"]
        );
        assert_eq!(kinds(&skills["skill_focus"]), vec![SourceType::Gold]);
        assert_eq!(skills["skill_corner"].sources[0].level, Some(5));
        assert_eq!(kinds(&skills["skill_ultimate"]), vec![SourceType::GoldScenario]);
        let spirit = &skills["skill_ura_spirit"].sources[0];
        assert_eq!((spirit.source.as_str(), spirit.kind, spirit.level), ("URA Finals", SourceType::Scenario, Some(3)));
    }

    #[test]
    fn test_factor_slots() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let skills = derive_obtainable_skills(&deck(None, [None, Some("user_inza_vodka")], &[]), &owned, &lookup, &[]);

        let ids: Vec<&str> = skills.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["skill_cut", "skill_hymn", "skill_corner", "skill_straight", "skill_glare"]);
        assert_eq!(kinds(&skills["skill_cut"]), vec![SourceType::Unique]);
        assert_eq!(kinds(&skills["skill_hymn"]), vec![SourceType::UniqueViaFactor]);
        assert_eq!(skills["skill_hymn"].sources[0].source, "Vodka");
        assert_eq!(kinds(&skills["skill_straight"]), vec![SourceType::Factor]);
        assert_eq!(skills["skill_glare"].sources[0].source, "Daiwa Scarlet");
    }

    #[test]
    fn test_skill_from_factor_and_card_has_both_sources() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let skills = derive_obtainable_skills(
            &deck(None, [Some("user_inza_vodka"), None], &["user_sc_kita"]),
            &owned,
            &lookup,
            &[],
        );
        let corner = &skills["skill_corner"];
        assert_eq!(kinds(corner), vec![SourceType::Factor, SourceType::Hint]);
        assert_eq!(corner.sources_label(), "Vodka(factor), Kitasan Black(hint Lv.5)");
    }

    #[test]
    fn test_green_name_of_ordinary_skill_grants_nothing() {
        let master = fixtures::catalog();
        let mut custom = CustomData::default();
        let mut slots = FactorSlots::default();
        slots.parent = Some(FactorSlot {
            name: "Someone".into(),
            green_factor: Some(GreenFactor {
                skill_id: None,
                skill_name: Some("Intimidate".into()),
                stars: Some(3),
            }),
            ..Default::default()
        });
        custom.inza_characters.push(FactorSet {
            id: "custom_inza_x".into(),
            name: "Plain".into(),
            slots,
            is_custom: true,
        });
        let mut owned = OwnedCollection::default();
        let instance = owned.add_factor_set(&custom.inza_characters[0]);
        let lookup = Lookup::new(&master, &custom);

        let skills = derive_obtainable_skills(&deck(None, [Some(instance.as_str()), None], &[]), &owned, &lookup, &[]);
        assert!(skills.is_empty());
    }

    #[test]
    fn test_missing_references_are_skipped() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let skills = derive_obtainable_skills(
            &deck(Some("scn_gone"), [Some("user_inza_gone"), None], &["user_sc_ghost", "user_sc_fine", "user_sc_nope"]),
            &owned,
            &lookup,
            &[],
        );
        // Fine Motion's unknown event skill is dropped, the rest stays
        let ids: Vec<&str> = skills.keys().map(String::as_str).collect();
        assert_eq!(ids, vec!["skill_glare", "skill_corner"]);
    }

    #[test]
    fn test_duplicate_card_slot_counted_once() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();

        let skills = derive_obtainable_skills(&deck(None, [None, None], &["user_sc_fine", "user_sc_fine"]), &owned, &lookup, &[]);
        assert_eq!(skills["skill_glare"].sources.len(), 1);
    }

    #[test]
    fn test_ignored_skills_always_removed() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();
        let d = deck(Some("scn_ura"), [Some("user_inza_vodka"), None], &["user_sc_kita", "user_sc_fine"]);

        let ignored = vec!["skill_corner".to_string(), "skill_focus".to_string()];
        let all = collect_obtainable_skills(&d, &owned, &lookup);
        let filtered = derive_obtainable_skills(&d, &owned, &lookup, &ignored);

        assert!(all.contains_key("skill_corner"));
        assert!(!filtered.contains_key("skill_corner"));
        assert!(!filtered.contains_key("skill_focus"));
        assert_eq!(filtered.len(), all.len() - 2);
        // Remaining order is untouched
        let expected: Vec<&String> = all.keys().filter(|k| !ignored.contains(*k)).collect();
        assert_eq!(filtered.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let master = fixtures::catalog();
        let custom = CustomData::default();
        let lookup = Lookup::new(&master, &custom);
        let owned = fixtures::owned();
        let d = deck(Some("scn_ura"), [Some("user_inza_vodka"), None], &["user_sc_fine", "user_sc_kita"]);

        let first = derive_obtainable_skills(&d, &owned, &lookup, &[]);
        let second = derive_obtainable_skills(&d, &owned, &lookup, &[]);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }
}
