//! Deck selection and skill derivation
//!
//! A deck is one scenario, two factor set instances and six support card
//! instances, all by id. Everything the planner shows is derived from it.

pub mod level;
pub mod derive;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::catalog::Catalog;
use crate::custom::OwnedCollection;

pub use level::{CardLevelInfo, card_level_info};
pub use derive::{
    ObtainableSkill, ObtainableSkills, Provenance, SourceGroup, SourceType,
    collect_obtainable_skills, remove_ignored, derive_obtainable_skills,
};

/// Factor set slots in a deck
pub const FACTOR_SLOTS: usize = 2;
/// Support card slots in a deck
pub const CARD_SLOTS: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeckError {
    #[error("{kind} slot {slot} does not exist (deck has {len})")]
    SlotOutOfRange { kind: &'static str, slot: usize, len: usize },
    #[error("no owned {kind} with id {id}")]
    NotOwned { kind: &'static str, id: String },
    #[error("{kind} {id} is already in slot {slot}")]
    AlreadySelected { kind: &'static str, id: String, slot: usize },
    #[error("unknown scenario {0}")]
    UnknownScenario(String),
}

/// The current deck (`savedDeck` in the saved document)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deck {
    #[serde(default, deserialize_with = "non_empty")]
    pub scenario: Option<String>,
    /// Owned factor set ids
    #[serde(default, deserialize_with = "fixed_slots")]
    pub inza: [Option<String>; FACTOR_SLOTS],
    /// Owned support card ids
    #[serde(default, deserialize_with = "fixed_slots")]
    pub support_cards: [Option<String>; CARD_SLOTS],
}

impl Deck {
    pub fn select_scenario(&mut self, master: &Catalog, id: Option<&str>) -> Result<(), DeckError> {
        if let Some(id) = id {
            if master.scenario(id).is_none() {
                return Err(DeckError::UnknownScenario(id.to_string()));
            }
        }
        self.scenario = id.map(str::to_string);
        Ok(())
    }

    pub fn select_factor_set(
        &mut self,
        owned: &OwnedCollection,
        slot: usize,
        id: Option<&str>,
    ) -> Result<(), DeckError> {
        let exists = id.map_or(true, |id| owned.factor_set(id).is_some());
        select(&mut self.inza, "factor set", slot, id, exists)
    }

    pub fn select_support_card(
        &mut self,
        owned: &OwnedCollection,
        slot: usize,
        id: Option<&str>,
    ) -> Result<(), DeckError> {
        let exists = id.map_or(true, |id| owned.card(id).is_some());
        select(&mut self.support_cards, "support card", slot, id, exists)
    }

    /// Selected factor set ids in slot order
    pub fn factor_set_ids(&self) -> impl Iterator<Item = &str> {
        self.inza.iter().flatten().map(String::as_str)
    }

    /// Selected support card ids in slot order, each id once
    pub fn support_card_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(CARD_SLOTS);
        for id in self.support_cards.iter().flatten() {
            if !ids.contains(&id.as_str()) {
                ids.push(id);
            }
        }
        ids
    }

    /// Empty every slot holding `id`. Returns whether anything changed.
    pub fn clear_instance(&mut self, id: &str) -> bool {
        let mut cleared = false;
        for slot in self.inza.iter_mut().chain(self.support_cards.iter_mut()) {
            if slot.as_deref() == Some(id) {
                *slot = None;
                cleared = true;
            }
        }
        cleared
    }

    /// Empty slots pointing at instances no longer in `owned`
    pub fn clear_missing(&mut self, owned: &OwnedCollection) -> usize {
        let mut cleared = 0;
        for slot in self.inza.iter_mut() {
            if slot.as_deref().is_some_and(|id| owned.factor_set(id).is_none()) {
                *slot = None;
                cleared += 1;
            }
        }
        for slot in self.support_cards.iter_mut() {
            if slot.as_deref().is_some_and(|id| owned.card(id).is_none()) {
                *slot = None;
                cleared += 1;
            }
        }
        if cleared > 0 {
            log::info!("Cleared {} deck slots pointing at removed instances", cleared);
        }
        cleared
    }
}

fn select(
    slots: &mut [Option<String>],
    kind: &'static str,
    slot: usize,
    id: Option<&str>,
    exists: bool,
) -> Result<(), DeckError> {
    let len = slots.len();
    if slot >= len {
        return Err(DeckError::SlotOutOfRange { kind, slot, len });
    }
    if let Some(id) = id {
        if !exists {
            return Err(DeckError::NotOwned { kind, id: id.to_string() });
        }
        if let Some(other) = slots.iter().position(|s| s.as_deref() == Some(id)) {
            if other != slot {
                return Err(DeckError::AlreadySelected { kind, id: id.to_string(), slot: other });
            }
        }
    }
    slots[slot] = id.map(str::to_string);
    Ok(())
}

/// Empty strings count as an empty slot
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// Accept slot lists of any length, padding with empty slots or dropping extras
fn fixed_slots<'de, D, const N: usize>(deserializer: D) -> Result<[Option<String>; N], D::Error>
where
    D: Deserializer<'de>,
{
    let list: Option<Vec<Option<String>>> = Option::deserialize(deserializer)?;
    let mut slots: [Option<String>; N] = std::array::from_fn(|_| None);
    for (slot, id) in slots.iter_mut().zip(list.unwrap_or_default()) {
        *slot = id.filter(|s| !s.is_empty());
    }
    Ok(slots)
}
