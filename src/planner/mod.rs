//! Planner state
//!
//! `Planner` owns the master catalog and the user document and is the one
//! place every operation goes through. Derived data (obtainable skills,
//! grouping, progress) is recomputed on demand and never stored.

use crate::catalog::{Catalog, Lookup, SkillId};
use crate::custom::{
    merge_import, Bundle, CardDraft, CascadeReport, ConflictResolver, EntityKind, FactorSetDraft,
    MergeStats, SkillDraft, StoreError,
};
use crate::deck::{
    card_level_info, collect_obtainable_skills, remove_ignored, CardLevelInfo, DeckError,
    ObtainableSkills,
};
use crate::save::UserData;
use crate::tracking::{classify, compute_progress, CheckState, Classification, Target, TargetProgress};

pub struct Planner {
    master: Catalog,
    user: UserData,
}

impl Planner {
    pub fn new(master: Catalog, mut user: UserData) -> Self {
        user.target_skills.normalize();
        user.saved_deck.clear_missing(&user.my_collection);
        Self { master, user }
    }

    pub fn master(&self) -> &Catalog {
        &self.master
    }

    pub fn user(&self) -> &UserData {
        &self.user
    }

    pub fn into_user(self) -> UserData {
        self.user
    }

    pub fn lookup(&self) -> Lookup<'_> {
        Lookup::new(&self.master, &self.user.custom_data)
    }

    // ------------------------------------------------------------------
    // Derived views
    // ------------------------------------------------------------------

    fn collect(&self, lookup: &Lookup) -> ObtainableSkills {
        collect_obtainable_skills(&self.user.saved_deck, &self.user.my_collection, lookup)
    }

    /// Skills the current deck can grant, minus ignored ones
    pub fn obtainable_skills(&self) -> ObtainableSkills {
        let mut skills = self.collect(&self.lookup());
        remove_ignored(&mut skills, &self.user.target_skills.ignored);
        skills
    }

    pub fn classify(&self) -> Classification {
        let lookup = self.lookup();
        let mut skills = self.collect(&lookup);
        remove_ignored(&mut skills, &self.user.target_skills.ignored);
        classify(
            &skills,
            &lookup,
            &self.user.skill_check_states,
            self.user.user_settings.hide_acquired,
        )
    }

    /// Progress is measured against the deck before ignored skills are dropped
    pub fn progress(&self) -> TargetProgress {
        let lookup = self.lookup();
        let skills = self.collect(&lookup);
        compute_progress(&self.user.target_skills.required, &skills, &self.user.skill_check_states, &lookup)
    }

    pub fn card_level_info(&self, user_card_id: &str) -> Option<CardLevelInfo> {
        let card = self.user.my_collection.card(user_card_id)?;
        Some(card_level_info(card, &self.lookup()))
    }

    // ------------------------------------------------------------------
    // Deck
    // ------------------------------------------------------------------

    pub fn select_scenario(&mut self, id: Option<&str>) -> Result<(), DeckError> {
        self.user.saved_deck.select_scenario(&self.master, id)
    }

    pub fn select_factor_set(&mut self, slot: usize, id: Option<&str>) -> Result<(), DeckError> {
        self.user.saved_deck.select_factor_set(&self.user.my_collection, slot, id)
    }

    pub fn select_support_card(&mut self, slot: usize, id: Option<&str>) -> Result<(), DeckError> {
        self.user.saved_deck.select_support_card(&self.user.my_collection, slot, id)
    }

    // ------------------------------------------------------------------
    // Tracking
    // ------------------------------------------------------------------

    pub fn cycle_check_state(&mut self, skill_id: &str) -> CheckState {
        self.user.skill_check_states.cycle(skill_id)
    }

    pub fn reset_check_states(&mut self) {
        self.user.skill_check_states.clear();
        log::info!("Reset all skill check states");
    }

    pub fn add_required(&mut self, skill_id: &str) -> bool {
        self.user.target_skills.add(skill_id, Target::Required)
    }

    pub fn add_ignored(&mut self, skill_id: &str) -> bool {
        self.user.target_skills.add(skill_id, Target::Ignored)
    }

    pub fn remove_target(&mut self, skill_id: &str) -> bool {
        self.user.target_skills.remove(skill_id)
    }

    // ------------------------------------------------------------------
    // Collection
    // ------------------------------------------------------------------

    /// Own a copy of a master support card. Returns the new instance id.
    pub fn add_master_card(&mut self, master_card_id: &str, level: u8) -> Result<String, StoreError> {
        let template = self.master.support_card(master_card_id).ok_or_else(|| StoreError::UnknownMaster {
            kind: EntityKind::SupportCard,
            id: master_card_id.to_string(),
        })?;
        let id = self.user.my_collection.add_card(template, level);
        log::info!("Added {} to the collection as {}", template.name, id);
        Ok(id)
    }

    pub fn add_master_factor_set(&mut self, master_inza_id: &str) -> Result<String, StoreError> {
        let template = self.master.factor_set(master_inza_id).ok_or_else(|| StoreError::UnknownMaster {
            kind: EntityKind::FactorSet,
            id: master_inza_id.to_string(),
        })?;
        let id = self.user.my_collection.add_factor_set(template);
        log::info!("Added {} to the collection as {}", template.name, id);
        Ok(id)
    }

    /// Remove one owned card; the template stays
    pub fn remove_owned_card(&mut self, user_card_id: &str) -> bool {
        let removed = self.user.my_collection.remove_card(user_card_id);
        if removed {
            self.user.saved_deck.clear_instance(user_card_id);
        }
        removed
    }

    pub fn remove_owned_factor_set(&mut self, user_inza_id: &str) -> bool {
        let removed = self.user.my_collection.remove_factor_set(user_inza_id);
        if removed {
            self.user.saved_deck.clear_instance(user_inza_id);
        }
        removed
    }

    // ------------------------------------------------------------------
    // Custom entities
    // ------------------------------------------------------------------

    pub fn get_or_create_skill_id(&mut self, name: &str) -> Option<SkillId> {
        self.user.custom_data.get_or_create_skill_id(&self.master, name)
    }

    pub fn create_custom_skill(&mut self, draft: SkillDraft) -> Result<SkillId, StoreError> {
        self.user.custom_data.create_skill(&self.master, draft)
    }

    pub fn update_custom_skill(&mut self, id: &str, draft: SkillDraft) -> Result<(), StoreError> {
        self.user.custom_data.update_skill(&self.master, id, draft)
    }

    pub fn delete_custom_skill(&mut self, id: &str) -> Result<CascadeReport, StoreError> {
        self.user.custom_data.delete_skill(id)
    }

    /// Returns the id of the owned copy that comes with a new custom card
    pub fn create_custom_card(&mut self, draft: CardDraft) -> Result<String, StoreError> {
        self.user.custom_data.create_card(&self.master, &mut self.user.my_collection, draft)
    }

    pub fn update_custom_card(&mut self, id: &str, draft: CardDraft) -> Result<(), StoreError> {
        self.user
            .custom_data
            .update_card(&self.master, &mut self.user.my_collection, id, draft)
    }

    pub fn delete_custom_card(&mut self, id: &str) -> Result<(), StoreError> {
        let removed = self.user.custom_data.delete_card(&mut self.user.my_collection, id)?;
        for instance in &removed {
            self.user.saved_deck.clear_instance(instance);
        }
        Ok(())
    }

    pub fn create_custom_factor_set(&mut self, draft: FactorSetDraft) -> Result<String, StoreError> {
        self.user
            .custom_data
            .create_factor_set(&self.master, &mut self.user.my_collection, draft)
    }

    pub fn update_custom_factor_set(&mut self, id: &str, draft: FactorSetDraft) -> Result<(), StoreError> {
        self.user
            .custom_data
            .update_factor_set(&self.master, &mut self.user.my_collection, id, draft)
    }

    pub fn delete_custom_factor_set(&mut self, id: &str) -> Result<(), StoreError> {
        let removed = self
            .user
            .custom_data
            .delete_factor_set(&mut self.user.my_collection, id)?;
        for instance in &removed {
            self.user.saved_deck.clear_instance(instance);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Merge a bundle. Work happens on copies that replace the live data
    /// only once every conflict is resolved, so dropping the future midway
    /// leaves the planner untouched.
    pub async fn import<R: ConflictResolver + ?Sized>(&mut self, bundle: Bundle, resolver: &mut R) -> MergeStats {
        let mut custom = self.user.custom_data.clone();
        let mut owned = self.user.my_collection.clone();
        let stats = merge_import(bundle, &self.master, &mut custom, &mut owned, resolver).await;

        self.user.custom_data = custom;
        self.user.my_collection = owned;
        self.user.saved_deck.clear_missing(&self.user.my_collection);
        stats
    }

    pub fn export_item(&self, kind: EntityKind, id: &str) -> Result<Bundle, StoreError> {
        crate::custom::export_item(&self.user.custom_data, kind, id)
    }

    pub fn export_all(&self) -> Bundle {
        crate::custom::export_all(&self.user.custom_data)
    }

    /// Replace the whole user document with a backup
    pub fn restore(&mut self, backup: UserData) {
        let master = std::mem::take(&mut self.master);
        *self = Planner::new(master, backup);
        log::info!("Restored user data from backup");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::custom::{EntityRef, FixedResolver, Resolution};
    use crate::fixtures;
    use crate::tracking::TargetSkills;

    fn planner() -> Planner {
        let user = UserData {
            my_collection: fixtures::owned(),
            ..Default::default()
        };
        Planner::new(fixtures::catalog(), user)
    }

    #[test]
    fn test_ignored_skill_still_counts_for_progress() {
        let mut planner = planner();
        planner.select_support_card(0, Some("user_sc_kita")).unwrap();
        planner.add_required("skill_corner");
        planner.user.target_skills.ignored.push("skill_corner".into());

        assert!(!planner.obtainable_skills().contains_key("skill_corner"));
        let progress = planner.progress();
        assert_eq!(progress.remaining.len(), 1);
        assert!(progress.remaining[0].obtainable);
    }

    #[test]
    fn test_new_normalizes_legacy_documents() {
        let mut user = UserData {
            my_collection: fixtures::owned(),
            target_skills: TargetSkills {
                required: vec!["a".into(), "b".into()],
                ignored: vec!["b".into()],
            },
            ..Default::default()
        };
        user.saved_deck.support_cards[2] = Some("user_sc_removed".into());

        let planner = Planner::new(fixtures::catalog(), user);
        assert_eq!(planner.user().target_skills.required, vec!["a".to_string()]);
        assert_eq!(planner.user().saved_deck.support_cards[2], None);
    }

    #[test]
    fn test_classify_follows_hide_acquired_setting() {
        let mut planner = planner();
        planner.select_support_card(0, Some("user_sc_kita")).unwrap();
        planner.cycle_check_state("skill_front");
        planner.cycle_check_state("skill_front");

        assert!(planner.classify().support_only.contains("skill_front"));
        planner.user.user_settings.hide_acquired = true;
        let groups = planner.classify();
        assert!(!groups.support_only.contains("skill_front"));
        assert!(groups.acquired.contains("skill_front"));

        planner.reset_check_states();
        assert!(planner.user().skill_check_states.is_empty());
    }

    #[test]
    fn test_removing_owned_card_clears_deck() {
        let mut planner = planner();
        planner.select_support_card(3, Some("user_sc_fine")).unwrap();
        assert!(planner.remove_owned_card("user_sc_fine"));
        assert_eq!(planner.user().saved_deck.support_cards[3], None);
        assert!(!planner.remove_owned_card("user_sc_fine"));
    }

    #[test]
    fn test_add_master_entities() {
        let mut planner = planner();
        let id = planner.add_master_card("sc_fine", 4).unwrap();
        assert_eq!(planner.card_level_info(&id).unwrap().hint_level, 5);
        assert!(matches!(
            planner.add_master_card("sc_nothing", 0),
            Err(StoreError::UnknownMaster { kind: EntityKind::SupportCard, .. })
        ));
        let inza = planner.add_master_factor_set("inza_vodka").unwrap();
        planner.select_factor_set(0, Some(&inza)).unwrap();
        assert!(planner.obtainable_skills().contains_key("skill_cut"));
    }

    #[test]
    fn test_custom_card_lifecycle_in_deck() {
        let mut planner = planner();
        let owned_id = planner
            .create_custom_card(CardDraft {
                name: "Homemade".into(),
                hint_level: 2,
                hint_skills: vec!["Fresh Air".into()],
                ..Default::default()
            })
            .unwrap();
        planner.select_support_card(0, Some(&owned_id)).unwrap();

        let fresh_air = planner.get_or_create_skill_id("Fresh Air").unwrap();
        let skills = planner.obtainable_skills();
        assert_eq!(skills[&fresh_air].sources[0].level, Some(2));

        let template = planner.user().custom_data.support_cards[0].id.clone();
        planner.delete_custom_card(&template).unwrap();
        assert_eq!(planner.user().saved_deck.support_cards[0], None);
        assert!(planner.obtainable_skills().is_empty());
    }

    #[tokio::test]
    async fn test_import_commits_and_reports() {
        let mut source = planner();
        source
            .create_custom_card(CardDraft {
                name: "Shared".into(),
                hint_level: 3,
                hint_skills: vec!["Fresh Air".into()],
                ..Default::default()
            })
            .unwrap();
        let bundle = source.export_all();

        let mut target = planner();
        let stats = target.import(bundle.clone(), &mut FixedResolver(Resolution::Skip)).await;
        assert_eq!(stats.added, 2);
        assert_eq!(target.user().my_collection.support_cards.len(), 4);

        // Overwriting drops the owned copy in the deck and adds a new one
        let card_owned = target.user().my_collection.support_cards[3].id.clone();
        target.select_support_card(0, Some(&card_owned)).unwrap();
        let stats = target.import(bundle, &mut FixedResolver(Resolution::Overwrite)).await;
        assert_eq!(stats.overwritten, 2);
        assert_eq!(target.user().saved_deck.support_cards[0], None);
        assert_eq!(target.user().my_collection.support_cards.len(), 4);
    }

    /// Never answers, like a dialog the user walks away from
    struct StalledResolver;

    #[async_trait]
    impl ConflictResolver for StalledResolver {
        async fn resolve(&mut self, _existing: EntityRef<'_>, _incoming: EntityRef<'_>, _kind: EntityKind) -> Resolution {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_abandoned_import_leaves_data_untouched() {
        let mut source = planner();
        source
            .create_custom_card(CardDraft {
                name: "Shared".into(),
                hint_level: 3,
                hint_skills: vec!["Fresh Air".into()],
                ..Default::default()
            })
            .unwrap();
        let bundle = source.export_all();

        let mut target = planner();
        target
            .create_custom_card(CardDraft { name: "Shared".into(), hint_level: 1, ..Default::default() })
            .unwrap();
        target.select_support_card(0, Some("user_sc_kita")).unwrap();
        let before = target.user().clone();

        // "Fresh Air" merges into the working copy, then the card conflict stalls
        let mut resolver = StalledResolver;
        tokio::select! {
            biased;
            _ = target.import(bundle, &mut resolver) => panic!("import finished without a resolution"),
            _ = std::future::ready(()) => {}
        }

        assert_eq!(target.user(), &before);
        assert!(target.user().custom_data.skills.is_empty());
        assert_eq!(target.user().saved_deck.support_cards[0].as_deref(), Some("user_sc_kita"));
    }

    #[test]
    fn test_restore_replaces_document() {
        let mut planner = planner();
        planner.add_required("skill_arc");
        planner.restore(UserData::default());
        assert!(planner.user().target_skills.required.is_empty());
        assert!(planner.user().my_collection.support_cards.is_empty());
        assert_eq!(planner.master().skills.len(), 10);
    }
}
