//! Custom entity store and the user's collection
//!
//! `CustomData` holds user-authored templates (skills, cards, factor sets).
//! `OwnedCollection` holds the instances the user actually owns, each one
//! pointing at a master or custom template.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::ids;
use crate::catalog::{
    Catalog, EffectType, FactorSet, FactorSlot, FactorSlots, GreenFactor, OwnedCard, OwnedFactorSet,
    Skill, SkillCategory, SkillId, SlotKind, SupportCard, TypedFactor, UpgradeType, MAX_BREAKTHROUGH,
};

/// Hint levels a custom card can be created with
pub const CUSTOM_HINT_LEVELS: std::ops::RangeInclusive<u8> = 1..=5;

/// The three kinds of user-authored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Skill,
    SupportCard,
    FactorSet,
}

impl EntityKind {
    /// Human-readable label, passed to conflict resolvers
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Skill => "skill",
            EntityKind::SupportCard => "support card",
            EntityKind::FactorSet => "factor set",
        }
    }

    /// Tag used in individual export bundles
    pub fn wire_name(&self) -> &'static str {
        match self {
            EntityKind::Skill => "skill",
            EntityKind::SupportCard => "supportCard",
            EntityKind::FactorSet => "inza",
        }
    }

    pub fn id_prefix(&self) -> &'static str {
        match self {
            EntityKind::Skill => ids::CUSTOM_SKILL,
            EntityKind::SupportCard => ids::CUSTOM_CARD,
            EntityKind::FactorSet => ids::CUSTOM_FACTOR_SET,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Custom store errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("a {kind} named \"{name}\" already exists")]
    DuplicateName { kind: EntityKind, name: String },
    #[error("no custom {kind} with id {id}")]
    NotFound { kind: EntityKind, id: String },
    #[error("no {kind} with id {id} in the master catalog")]
    UnknownMaster { kind: EntityKind, id: String },
}

/// User-authored templates (`customData` in the saved document)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomData {
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub support_cards: Vec<SupportCard>,
    #[serde(default)]
    pub inza_characters: Vec<FactorSet>,
}

/// Owned instances (`myCollection` in the saved document)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCollection {
    #[serde(default)]
    pub support_cards: Vec<OwnedCard>,
    #[serde(default)]
    pub inza_characters: Vec<OwnedFactorSet>,
}

/// Shared behaviour of the custom entity kinds, used by the store and the
/// import merge
pub trait CustomEntity: Clone + Send + Sync {
    const KIND: EntityKind;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn name(&self) -> &str;
    fn set_name(&mut self, name: String);
    fn mark_custom(&mut self);

    fn in_master(master: &Catalog, id: &str) -> bool;
    fn collection(custom: &CustomData) -> &Vec<Self>;
    fn collection_mut(custom: &mut CustomData) -> &mut Vec<Self>;

    /// Rewrite skill references through `remap`
    fn remap_skills(&mut self, _remap: &dyn Fn(&str) -> Option<SkillId>) {}

    /// Add an owned instance of this template, returning its id.
    /// Skills are never owned.
    fn own(&self, _owned: &mut OwnedCollection) -> Option<String> {
        None
    }

    /// Remove every owned instance of the template `template_id`
    fn disown(_template_id: &str, _owned: &mut OwnedCollection) -> Vec<String> {
        Vec::new()
    }
}

impl CustomEntity for Skill {
    const KIND: EntityKind = EntityKind::Skill;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn mark_custom(&mut self) {
        self.is_custom = true;
    }

    fn in_master(master: &Catalog, id: &str) -> bool {
        master.skill(id).is_some()
    }
    fn collection(custom: &CustomData) -> &Vec<Self> {
        &custom.skills
    }
    fn collection_mut(custom: &mut CustomData) -> &mut Vec<Self> {
        &mut custom.skills
    }
}

impl CustomEntity for SupportCard {
    const KIND: EntityKind = EntityKind::SupportCard;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn mark_custom(&mut self) {
        self.is_custom = true;
    }

    fn in_master(master: &Catalog, id: &str) -> bool {
        master.support_card(id).is_some()
    }
    fn collection(custom: &CustomData) -> &Vec<Self> {
        &custom.support_cards
    }
    fn collection_mut(custom: &mut CustomData) -> &mut Vec<Self> {
        &mut custom.support_cards
    }

    fn remap_skills(&mut self, remap: &dyn Fn(&str) -> Option<SkillId>) {
        for list in self.skill_lists_mut() {
            for id in list.iter_mut() {
                if let Some(new_id) = remap(id) {
                    *id = new_id;
                }
            }
        }
    }

    fn own(&self, owned: &mut OwnedCollection) -> Option<String> {
        Some(owned.add_card(self, MAX_BREAKTHROUGH))
    }

    fn disown(template_id: &str, owned: &mut OwnedCollection) -> Vec<String> {
        owned.remove_cards_of(template_id)
    }
}

impl CustomEntity for FactorSet {
    const KIND: EntityKind = EntityKind::FactorSet;

    fn id(&self) -> &str {
        &self.id
    }
    fn set_id(&mut self, id: String) {
        self.id = id;
    }
    fn name(&self) -> &str {
        &self.name
    }
    fn set_name(&mut self, name: String) {
        self.name = name;
    }
    fn mark_custom(&mut self) {
        self.is_custom = true;
    }

    fn in_master(master: &Catalog, id: &str) -> bool {
        master.factor_set(id).is_some()
    }
    fn collection(custom: &CustomData) -> &Vec<Self> {
        &custom.inza_characters
    }
    fn collection_mut(custom: &mut CustomData) -> &mut Vec<Self> {
        &mut custom.inza_characters
    }

    fn remap_skills(&mut self, remap: &dyn Fn(&str) -> Option<SkillId>) {
        for slot in self.slots.iter_mut() {
            slot.remap_skills(remap);
        }
    }

    fn own(&self, owned: &mut OwnedCollection) -> Option<String> {
        Some(owned.add_factor_set(self))
    }

    fn disown(template_id: &str, owned: &mut OwnedCollection) -> Vec<String> {
        owned.remove_factor_sets_of(template_id)
    }
}

/// Editable fields of a custom skill
#[derive(Debug, Clone, Default)]
pub struct SkillDraft {
    pub name: String,
    pub category: SkillCategory,
    pub upgrade_type: Option<UpgradeType>,
    pub effect_type: Option<EffectType>,
    pub is_unique: bool,
    pub tags: Vec<String>,
    pub evolution_condition: Option<String>,
    pub show_custom_highlight: bool,
}

/// Input for creating or editing a custom support card. Skills are given by
/// name, one entry per skill.
#[derive(Debug, Clone, Default)]
pub struct CardDraft {
    pub name: String,
    pub hint_level: u8,
    pub hint_skills: Vec<String>,
    pub event_skills: Vec<String>,
}

/// Input for one factor set slot
#[derive(Debug, Clone, Default)]
pub struct FactorSlotDraft {
    pub character: String,
    pub blue_factor: Option<TypedFactor>,
    pub red_factor: Option<TypedFactor>,
    /// Green factor skill name and star rank
    pub green_factor: Option<(String, u8)>,
    pub skill_factors: Vec<String>,
}

/// Input for creating or editing a custom factor set
#[derive(Debug, Clone, Default)]
pub struct FactorSetDraft {
    pub name: String,
    /// Parent, grandparent 1, grandparent 2
    pub slots: [FactorSlotDraft; 3],
}

/// What a custom skill deletion touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub cards: usize,
    pub factor_sets: usize,
}

impl CustomData {
    pub fn get<T: CustomEntity>(&self, id: &str) -> Option<&T> {
        T::collection(self).iter().find(|e| e.id() == id)
    }

    /// Custom entity of kind `T` with exactly this display name
    pub fn find_by_name<T: CustomEntity>(&self, name: &str) -> Option<&T> {
        T::collection(self).iter().find(|e| e.name() == name)
    }

    /// Whether `id` is used by a master or custom entity of kind `T`
    pub fn id_taken<T: CustomEntity>(&self, master: &Catalog, id: &str) -> bool {
        T::in_master(master, id) || self.get::<T>(id).is_some()
    }

    pub(crate) fn fresh_id<T: CustomEntity>(&self, master: &Catalog) -> String {
        ids::fresh_id(T::KIND.id_prefix(), |id| self.id_taken::<T>(master, id))
    }

    /// Resolve a free-text skill name to an id, creating a bare custom skill
    /// when no master or custom skill has that name
    pub fn get_or_create_skill_id(&mut self, master: &Catalog, name: &str) -> Option<SkillId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        if let Some(skill) = master.skill_by_name(name) {
            return Some(skill.id.clone());
        }
        if let Some(skill) = self.find_by_name::<Skill>(name) {
            return Some(skill.id.clone());
        }

        let id = self.fresh_id::<Skill>(master);
        self.skills.push(Skill::custom(id.clone(), name));
        log::info!("Created custom skill {} ({})", name, id);
        Some(id)
    }

    fn resolve_skill_names(&mut self, master: &Catalog, names: &[String]) -> Vec<SkillId> {
        let mut resolved: Vec<SkillId> = Vec::new();
        for name in names {
            if let Some(id) = self.get_or_create_skill_id(master, name) {
                if !resolved.contains(&id) {
                    resolved.push(id);
                }
            }
        }
        resolved
    }

    fn check_skill_name(&self, master: &Catalog, name: &str, except_id: Option<&str>) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        let clash = master.skill_by_name(name).map(|s| s.id.as_str())
            .or_else(|| self.find_by_name::<Skill>(name).map(|s| s.id.as_str()));
        match clash {
            Some(id) if Some(id) != except_id => Err(StoreError::DuplicateName {
                kind: EntityKind::Skill,
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_name<T: CustomEntity>(&self, name: &str, except_id: Option<&str>) -> Result<(), StoreError> {
        if name.is_empty() {
            return Err(StoreError::EmptyName);
        }
        match self.find_by_name::<T>(name) {
            Some(existing) if Some(existing.id()) != except_id => Err(StoreError::DuplicateName {
                kind: T::KIND,
                name: name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    // ------------------------------------------------------------------
    // Skills
    // ------------------------------------------------------------------

    pub fn create_skill(&mut self, master: &Catalog, draft: SkillDraft) -> Result<SkillId, StoreError> {
        let name = draft.name.trim().to_string();
        self.check_skill_name(master, &name, None)?;

        let id = self.fresh_id::<Skill>(master);
        let mut skill = Skill::custom(id.clone(), name);
        apply_skill_draft(&mut skill, draft);
        log::info!("Created custom skill {} ({})", skill.name, id);
        self.skills.push(skill);
        Ok(id)
    }

    pub fn update_skill(&mut self, master: &Catalog, id: &str, draft: SkillDraft) -> Result<(), StoreError> {
        let name = draft.name.trim().to_string();
        self.check_skill_name(master, &name, Some(id))?;
        let skill = self
            .skills
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| not_found(EntityKind::Skill, id))?;
        skill.name = name;
        apply_skill_draft(skill, draft);
        Ok(())
    }

    /// Delete a custom skill and strip its id from every custom card and
    /// factor set. The referencing entities themselves stay.
    pub fn delete_skill(&mut self, id: &str) -> Result<CascadeReport, StoreError> {
        let before = self.skills.len();
        self.skills.retain(|s| s.id != id);
        if self.skills.len() == before {
            return Err(not_found(EntityKind::Skill, id));
        }

        let mut report = CascadeReport::default();
        for card in &mut self.support_cards {
            let mut touched = false;
            for list in card.skill_lists_mut() {
                let len = list.len();
                list.retain(|s| s != id);
                touched |= list.len() != len;
            }
            card.golden_skills.retain(|g| !g.choices.is_empty());
            if touched {
                report.cards += 1;
            }
        }
        for set in &mut self.inza_characters {
            let mut touched = false;
            for slot in set.slots.iter_mut() {
                touched |= slot.strip_skill(id);
            }
            if touched {
                report.factor_sets += 1;
            }
        }

        log::info!(
            "Deleted custom skill {} (stripped from {} cards, {} factor sets)",
            id,
            report.cards,
            report.factor_sets
        );
        Ok(report)
    }

    // ------------------------------------------------------------------
    // Support cards
    // ------------------------------------------------------------------

    /// Create a custom card template plus an owned copy at full breakthrough.
    /// Returns the owned card id.
    pub fn create_card(
        &mut self,
        master: &Catalog,
        owned: &mut OwnedCollection,
        draft: CardDraft,
    ) -> Result<String, StoreError> {
        let name = draft.name.trim().to_string();
        self.check_name::<SupportCard>(&name, None)?;

        let id = self.fresh_id::<SupportCard>(master);
        let card = SupportCard {
            id: id.clone(),
            name,
            golden_skills: Vec::new(),
            hint_skills: self.resolve_skill_names(master, &draft.hint_skills),
            event_skills: self.resolve_skill_names(master, &draft.event_skills),
            level_mapping: None,
            hint_level: Some(clamp_hint_level(draft.hint_level)),
            is_custom: true,
        };
        let owned_id = owned.add_card(&card, MAX_BREAKTHROUGH);
        log::info!("Created custom card {} ({})", card.name, id);
        self.support_cards.push(card);
        Ok(owned_id)
    }

    pub fn update_card(
        &mut self,
        master: &Catalog,
        owned: &mut OwnedCollection,
        id: &str,
        draft: CardDraft,
    ) -> Result<(), StoreError> {
        let name = draft.name.trim().to_string();
        self.check_name::<SupportCard>(&name, Some(id))?;
        if self.get::<SupportCard>(id).is_none() {
            return Err(not_found(EntityKind::SupportCard, id));
        }

        let hint_skills = self.resolve_skill_names(master, &draft.hint_skills);
        let event_skills = self.resolve_skill_names(master, &draft.event_skills);
        let hint_level = clamp_hint_level(draft.hint_level);
        if let Some(card) = self.support_cards.iter_mut().find(|c| c.id == id) {
            card.name = name.clone();
            card.hint_skills = hint_skills;
            card.event_skills = event_skills;
            card.hint_level = Some(hint_level);
        }
        for instance in owned.support_cards.iter_mut().filter(|c| c.template_id == id) {
            instance.name = name.clone();
            instance.hint_level = Some(hint_level);
        }
        Ok(())
    }

    /// Delete a custom card template and every owned copy of it.
    /// Returns the removed owned ids.
    pub fn delete_card(&mut self, owned: &mut OwnedCollection, id: &str) -> Result<Vec<String>, StoreError> {
        let before = self.support_cards.len();
        self.support_cards.retain(|c| c.id != id);
        if self.support_cards.len() == before {
            return Err(not_found(EntityKind::SupportCard, id));
        }
        let removed = owned.remove_cards_of(id);
        log::info!("Deleted custom card {} and {} owned copies", id, removed.len());
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Factor sets
    // ------------------------------------------------------------------

    fn build_slots(&mut self, master: &Catalog, drafts: &[FactorSlotDraft; 3]) -> FactorSlots {
        let mut slots = FactorSlots::default();
        for (kind, draft) in SlotKind::ALL.into_iter().zip(drafts.iter()) {
            let character = draft.character.trim().to_string();
            let skill_factors = self.resolve_skill_names(master, &draft.skill_factors);
            let green_factor = draft
                .green_factor
                .as_ref()
                .filter(|(name, _)| !name.trim().is_empty())
                .map(|(name, stars)| self.green_factor(master, name.trim(), *stars));

            if character.is_empty() && skill_factors.is_empty() && green_factor.is_none() {
                continue;
            }
            slots.set(
                kind,
                Some(FactorSlot {
                    name: character,
                    unique_skill_id: None,
                    blue_factor: draft.blue_factor.clone(),
                    red_factor: draft.red_factor.clone(),
                    green_factor,
                    skill_factors,
                }),
            );
        }
        slots
    }

    /// A green factor links by id when the name is a known skill and keeps
    /// the raw name otherwise
    fn green_factor(&self, master: &Catalog, name: &str, stars: u8) -> GreenFactor {
        let skill_id = master
            .skill_by_name(name)
            .or_else(|| self.find_by_name::<Skill>(name))
            .map(|s| s.id.clone());
        GreenFactor {
            skill_id,
            skill_name: Some(name.to_string()),
            stars: Some(stars),
        }
    }

    /// Create a custom factor set template plus an owned copy.
    /// Returns the owned factor set id.
    pub fn create_factor_set(
        &mut self,
        master: &Catalog,
        owned: &mut OwnedCollection,
        draft: FactorSetDraft,
    ) -> Result<String, StoreError> {
        let name = draft.name.trim().to_string();
        self.check_name::<FactorSet>(&name, None)?;

        let id = self.fresh_id::<FactorSet>(master);
        let set = FactorSet {
            id: id.clone(),
            name,
            slots: self.build_slots(master, &draft.slots),
            is_custom: true,
        };
        let owned_id = owned.add_factor_set(&set);
        log::info!("Created custom factor set {} ({})", set.name, id);
        self.inza_characters.push(set);
        Ok(owned_id)
    }

    pub fn update_factor_set(
        &mut self,
        master: &Catalog,
        owned: &mut OwnedCollection,
        id: &str,
        draft: FactorSetDraft,
    ) -> Result<(), StoreError> {
        let name = draft.name.trim().to_string();
        self.check_name::<FactorSet>(&name, Some(id))?;
        if self.get::<FactorSet>(id).is_none() {
            return Err(not_found(EntityKind::FactorSet, id));
        }

        let slots = self.build_slots(master, &draft.slots);
        if let Some(set) = self.inza_characters.iter_mut().find(|f| f.id == id) {
            set.name = name.clone();
            set.slots = slots;
        }
        for instance in owned.inza_characters.iter_mut().filter(|f| f.template_id == id) {
            instance.name = name.clone();
        }
        Ok(())
    }

    pub fn delete_factor_set(&mut self, owned: &mut OwnedCollection, id: &str) -> Result<Vec<String>, StoreError> {
        let before = self.inza_characters.len();
        self.inza_characters.retain(|f| f.id != id);
        if self.inza_characters.len() == before {
            return Err(not_found(EntityKind::FactorSet, id));
        }
        let removed = owned.remove_factor_sets_of(id);
        log::info!("Deleted custom factor set {} and {} owned copies", id, removed.len());
        Ok(removed)
    }
}

impl OwnedCollection {
    pub fn card(&self, id: &str) -> Option<&OwnedCard> {
        self.support_cards.iter().find(|c| c.id == id)
    }

    pub fn factor_set(&self, id: &str) -> Option<&OwnedFactorSet> {
        self.inza_characters.iter().find(|f| f.id == id)
    }

    /// Add an owned copy of `template` at breakthrough `level`
    pub fn add_card(&mut self, template: &SupportCard, level: u8) -> String {
        let id = ids::fresh_id(ids::OWNED_CARD, |id| self.card(id).is_some());
        self.support_cards.push(OwnedCard {
            id: id.clone(),
            template_id: template.id.clone(),
            name: template.name.clone(),
            level: level.min(MAX_BREAKTHROUGH),
            hint_level: if template.is_custom { template.hint_level } else { None },
        });
        id
    }

    pub fn add_factor_set(&mut self, template: &FactorSet) -> String {
        let id = ids::fresh_id(ids::OWNED_FACTOR_SET, |id| self.factor_set(id).is_some());
        self.inza_characters.push(OwnedFactorSet {
            id: id.clone(),
            template_id: template.id.clone(),
            name: template.name.clone(),
        });
        id
    }

    pub fn remove_card(&mut self, id: &str) -> bool {
        let before = self.support_cards.len();
        self.support_cards.retain(|c| c.id != id);
        self.support_cards.len() != before
    }

    pub fn remove_factor_set(&mut self, id: &str) -> bool {
        let before = self.inza_characters.len();
        self.inza_characters.retain(|f| f.id != id);
        self.inza_characters.len() != before
    }

    pub fn remove_cards_of(&mut self, template_id: &str) -> Vec<String> {
        let (removed, kept) = std::mem::take(&mut self.support_cards)
            .into_iter()
            .partition::<Vec<_>, _>(|c| c.template_id == template_id);
        self.support_cards = kept;
        removed.into_iter().map(|c| c.id).collect()
    }

    pub fn remove_factor_sets_of(&mut self, template_id: &str) -> Vec<String> {
        let (removed, kept) = std::mem::take(&mut self.inza_characters)
            .into_iter()
            .partition::<Vec<_>, _>(|f| f.template_id == template_id);
        self.inza_characters = kept;
        removed.into_iter().map(|f| f.id).collect()
    }
}

fn apply_skill_draft(skill: &mut Skill, draft: SkillDraft) {
    skill.category = draft.category;
    skill.upgrade_type = draft.upgrade_type;
    skill.effect_type = draft.effect_type;
    skill.is_unique = draft.is_unique;
    skill.tags = draft.tags;
    skill.evolution_condition = draft.evolution_condition.filter(|c| !c.trim().is_empty());
    skill.show_custom_highlight = draft.show_custom_highlight;
}

fn clamp_hint_level(level: u8) -> u8 {
    level.clamp(*CUSTOM_HINT_LEVELS.start(), *CUSTOM_HINT_LEVELS.end())
}

fn not_found(kind: EntityKind, id: &str) -> StoreError {
    StoreError::NotFound { kind, id: id.to_string() }
}
