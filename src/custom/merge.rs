//! Import merge with name-conflict resolution
//!
//! Entities are merged one at a time in a fixed order: dependency skills,
//! skills, support cards, factor sets. Skills go first because the later
//! kinds point at them. A same-named custom entity is a conflict and the
//! injected `ConflictResolver` decides what happens; each decision is
//! awaited before the next entity is looked at.
//!
//! While merging, incoming skill ids that end up under a different final id
//! are recorded so cards and factor sets merged later are rewired to the
//! skill that actually exists in the store.

use std::collections::HashMap;

use async_trait::async_trait;

use super::bundle::Bundle;
use super::store::{CustomData, CustomEntity, EntityKind, OwnedCollection};
use crate::catalog::{Catalog, FactorSet, Skill, SkillId, SupportCard};

/// Give up renaming after this many rounds of fresh collisions
const MAX_RENAME_ROUNDS: usize = 8;

/// Borrowed view of an entity on either side of a conflict
#[derive(Debug, Clone, Copy)]
pub enum EntityRef<'a> {
    Skill(&'a Skill),
    SupportCard(&'a SupportCard),
    FactorSet(&'a FactorSet),
}

impl<'a> EntityRef<'a> {
    pub fn id(&self) -> &'a str {
        match self {
            EntityRef::Skill(s) => &s.id,
            EntityRef::SupportCard(c) => &c.id,
            EntityRef::FactorSet(f) => &f.id,
        }
    }

    pub fn name(&self) -> &'a str {
        match self {
            EntityRef::Skill(s) => &s.name,
            EntityRef::SupportCard(c) => &c.name,
            EntityRef::FactorSet(f) => &f.name,
        }
    }
}

/// Decision for one name conflict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Add the incoming entity next to the existing one
    Add,
    /// Replace the existing entity (and drop owned copies of it)
    Overwrite,
    /// Add the incoming entity under a new name
    Rename(String),
    /// Keep the existing entity, drop the incoming one
    Skip,
}

/// Decides name conflicts during an import, typically by asking the user
#[async_trait]
pub trait ConflictResolver: Send {
    async fn resolve(&mut self, existing: EntityRef<'_>, incoming: EntityRef<'_>, kind: EntityKind) -> Resolution;
}

/// Answers every conflict the same way
#[derive(Debug, Clone)]
pub struct FixedResolver(pub Resolution);

#[async_trait]
impl ConflictResolver for FixedResolver {
    async fn resolve(&mut self, _existing: EntityRef<'_>, _incoming: EntityRef<'_>, _kind: EntityKind) -> Resolution {
        self.0.clone()
    }
}

/// Counters reported after an import
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub overwritten: usize,
    pub skipped: usize,
    /// Incoming skills that matched a master skill by name and were linked to it
    pub linked: usize,
}

impl MergeStats {
    pub fn total(&self) -> usize {
        self.added + self.overwritten + self.skipped + self.linked
    }
}

/// Entities the merge can hand to a resolver
trait Mergeable: CustomEntity {
    fn entity_ref(&self) -> EntityRef<'_>;
}

impl Mergeable for Skill {
    fn entity_ref(&self) -> EntityRef<'_> {
        EntityRef::Skill(self)
    }
}

impl Mergeable for SupportCard {
    fn entity_ref(&self) -> EntityRef<'_> {
        EntityRef::SupportCard(self)
    }
}

impl Mergeable for FactorSet {
    fn entity_ref(&self) -> EntityRef<'_> {
        EntityRef::FactorSet(self)
    }
}

struct Merger<'a, R: ?Sized> {
    master: &'a Catalog,
    custom: &'a mut CustomData,
    owned: &'a mut OwnedCollection,
    resolver: &'a mut R,
    /// Incoming skill id -> id of the skill that now stands for it
    skill_remap: HashMap<SkillId, SkillId>,
    stats: MergeStats,
}

impl<R: ConflictResolver + ?Sized> Merger<'_, R> {
    fn remap_skill(&mut self, from: &str, to: &str) {
        if from != to && !from.is_empty() {
            self.skill_remap.insert(from.to_string(), to.to_string());
        }
    }

    /// Point an incoming skill at the master skill with the same name
    fn link_to_master(&mut self, carried_id: &str, incoming: EntityRef<'_>, master_skill: &Skill) {
        if let EntityRef::Skill(skill) = incoming {
            let discarded = differing_fields(skill, master_skill);
            if discarded.is_empty() {
                log::info!("Linked imported skill \"{}\" to master skill {}", skill.name, master_skill.id);
            } else {
                log::warn!(
                    "Linked imported skill \"{}\" to master skill {}, discarding its own {}",
                    skill.name,
                    master_skill.id,
                    discarded.join(", ")
                );
            }
        }
        self.remap_skill(carried_id, &master_skill.id);
        self.stats.linked += 1;
    }

    async fn merge<T: Mergeable>(&mut self, mut incoming: T) {
        incoming.mark_custom();
        let carried_id = incoming.id().to_string();

        if T::KIND != EntityKind::Skill {
            let remap = &self.skill_remap;
            incoming.remap_skills(&|id| remap.get(id).cloned());
        }

        let master = self.master;
        let mut reused_id: Option<String> = None;
        let mut rounds = 0;
        loop {
            // Skill names are unique across master and custom
            let master_skill = match T::KIND {
                EntityKind::Skill => master.skill_by_name(incoming.name()),
                _ => None,
            };
            if let (Some(master_skill), 0) = (master_skill, rounds) {
                self.link_to_master(&carried_id, incoming.entity_ref(), master_skill);
                return;
            }

            let (existing, existing_id, is_master) = match master_skill {
                Some(skill) => (EntityRef::Skill(skill), skill.id.clone(), true),
                None => match self.custom.find_by_name::<T>(incoming.name()) {
                    Some(found) => (found.entity_ref(), found.id().to_string(), false),
                    None => break,
                },
            };
            let resolution = self.resolver.resolve(existing, incoming.entity_ref(), T::KIND).await;
            let skipping = resolution == Resolution::Skip;

            match resolution {
                Resolution::Rename(new_name) => {
                    let new_name = new_name.trim();
                    rounds += 1;
                    if new_name.is_empty() || new_name == incoming.name() || rounds > MAX_RENAME_ROUNDS {
                        log::warn!(
                            "Rename of imported {} \"{}\" gave no usable name, skipping it",
                            T::KIND,
                            incoming.name()
                        );
                        if T::KIND == EntityKind::Skill {
                            self.remap_skill(&carried_id, &existing_id);
                        }
                        self.stats.skipped += 1;
                        return;
                    }
                    log::info!("Renaming imported {} \"{}\" to \"{}\"", T::KIND, incoming.name(), new_name);
                    incoming.set_name(new_name.to_string());
                }
                // Master skills are never duplicated or replaced
                _ if is_master && skipping => {
                    log::info!("Skipped imported skill \"{}\", using master {}", incoming.name(), existing_id);
                    self.remap_skill(&carried_id, &existing_id);
                    self.stats.skipped += 1;
                    return;
                }
                _ if is_master => {
                    if let Some(master_skill) = master.skill(&existing_id) {
                        self.link_to_master(&carried_id, incoming.entity_ref(), master_skill);
                    }
                    return;
                }
                Resolution::Skip => {
                    log::info!("Skipped imported {} \"{}\"", T::KIND, incoming.name());
                    if T::KIND == EntityKind::Skill {
                        self.remap_skill(&carried_id, &existing_id);
                    }
                    self.stats.skipped += 1;
                    return;
                }
                Resolution::Overwrite => {
                    T::collection_mut(self.custom).retain(|e| e.id() != existing_id);
                    let dropped = T::disown(&existing_id, self.owned);
                    log::info!(
                        "Overwriting {} \"{}\" ({}), dropped {} owned copies",
                        T::KIND,
                        incoming.name(),
                        existing_id,
                        dropped.len()
                    );
                    reused_id = Some(existing_id);
                    break;
                }
                Resolution::Add => {
                    log::info!("Adding imported {} \"{}\" next to the existing one", T::KIND, incoming.name());
                    break;
                }
            }
        }

        let overwrote = reused_id.is_some();
        let final_id = match reused_id {
            Some(id) => id,
            None if !carried_id.is_empty() && !self.custom.id_taken::<T>(self.master, &carried_id) => {
                carried_id.clone()
            }
            None => self.custom.fresh_id::<T>(self.master),
        };
        if T::KIND == EntityKind::Skill {
            self.remap_skill(&carried_id, &final_id);
        }

        incoming.set_id(final_id);
        if let Some(owned_id) = incoming.own(self.owned) {
            log::debug!("Added owned copy {} of {}", owned_id, incoming.id());
        }
        log::info!("Merged {} \"{}\" as {}", T::KIND, incoming.name(), incoming.id());
        T::collection_mut(self.custom).push(incoming);

        if overwrote {
            self.stats.overwritten += 1;
        } else {
            self.stats.added += 1;
        }
    }
}

/// Definition fields of `incoming` that differ from `master`, by their
/// document names
fn differing_fields(incoming: &Skill, master: &Skill) -> Vec<&'static str> {
    let mut fields = Vec::new();
    if incoming.category != master.category {
        fields.push("category");
    }
    if incoming.upgrade_type != master.upgrade_type {
        fields.push("upgradeType");
    }
    if incoming.effect_type != master.effect_type {
        fields.push("effectType");
    }
    if incoming.is_unique != master.is_unique {
        fields.push("isUnique");
    }
    if incoming.tags != master.tags {
        fields.push("tags");
    }
    if incoming.evolution_condition != master.evolution_condition {
        fields.push("evolutionCondition");
    }
    fields
}

/// Merge an import bundle into the custom store and the owned collection.
///
/// The resolver is consulted for every name collision, strictly one at a
/// time. Callers wanting all-or-nothing behaviour merge into copies and
/// commit when this returns.
pub async fn merge_import<R: ConflictResolver + ?Sized>(
    bundle: Bundle,
    master: &Catalog,
    custom: &mut CustomData,
    owned: &mut OwnedCollection,
    resolver: &mut R,
) -> MergeStats {
    let (dependencies, data) = bundle.into_parts();
    let mut merger = Merger {
        master,
        custom,
        owned,
        resolver,
        skill_remap: HashMap::new(),
        stats: MergeStats::default(),
    };

    for skill in dependencies.into_iter().chain(data.skills) {
        merger.merge(skill).await;
    }
    for card in data.support_cards {
        merger.merge(card).await;
    }
    for set in data.inza_characters {
        merger.merge(set).await;
    }

    log::info!(
        "Import finished: {} added, {} overwritten, {} skipped, {} linked",
        merger.stats.added,
        merger.stats.overwritten,
        merger.stats.skipped,
        merger.stats.linked
    );
    merger.stats
}
