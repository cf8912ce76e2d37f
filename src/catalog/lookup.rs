//! Entity lookup across the master catalog and the user's custom catalog
//!
//! Both catalogs are indexed once into id -> entity tables. Custom entries
//! are inserted after master ones, so on an id collision the custom entity
//! is the one returned.

use std::collections::HashMap;

use super::{Catalog, FactorSet, Scenario, Skill, SupportCard};
use crate::custom::CustomData;

/// Typed lookup tables borrowed from a master and a custom catalog
#[derive(Debug, Clone)]
pub struct Lookup<'a> {
    skills: HashMap<&'a str, &'a Skill>,
    skills_by_name: HashMap<&'a str, &'a Skill>,
    cards: HashMap<&'a str, &'a SupportCard>,
    factor_sets: HashMap<&'a str, &'a FactorSet>,
    scenarios: HashMap<&'a str, &'a Scenario>,
}

impl<'a> Lookup<'a> {
    pub fn new(master: &'a Catalog, custom: &'a CustomData) -> Self {
        let mut skills = HashMap::new();
        let mut skills_by_name = HashMap::new();
        for skill in master.skills.iter().chain(custom.skills.iter()) {
            skills.insert(skill.id.as_str(), skill);
            skills_by_name.insert(skill.name.as_str(), skill);
        }

        let cards = master
            .support_cards
            .iter()
            .chain(custom.support_cards.iter())
            .map(|c| (c.id.as_str(), c))
            .collect();

        let factor_sets = master
            .inza_characters
            .iter()
            .chain(custom.inza_characters.iter())
            .map(|f| (f.id.as_str(), f))
            .collect();

        let scenarios = master.scenarios.iter().map(|s| (s.id.as_str(), s)).collect();

        Self {
            skills,
            skills_by_name,
            cards,
            factor_sets,
            scenarios,
        }
    }

    pub fn skill(&self, id: &str) -> Option<&'a Skill> {
        self.skills.get(id).copied()
    }

    pub fn skill_by_name(&self, name: &str) -> Option<&'a Skill> {
        self.skills_by_name.get(name.trim()).copied()
    }

    pub fn support_card(&self, id: &str) -> Option<&'a SupportCard> {
        self.cards.get(id).copied()
    }

    pub fn factor_set(&self, id: &str) -> Option<&'a FactorSet> {
        self.factor_sets.get(id).copied()
    }

    pub fn scenario(&self, id: &str) -> Option<&'a Scenario> {
        self.scenarios.get(id).copied()
    }
}
