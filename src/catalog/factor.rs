//! Inherited factor sets ("inza")
//!
//! A factor set describes a parent and two grandparents. Each slot can pass
//! down a unique skill, a green factor and any number of skill factors.

use serde::{Deserialize, Serialize};

use super::skill::SkillId;

/// The three fixed positions of a factor set, in traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotKind {
    Parent,
    Grandparent1,
    Grandparent2,
}

impl SlotKind {
    pub const ALL: [SlotKind; 3] = [SlotKind::Parent, SlotKind::Grandparent1, SlotKind::Grandparent2];

    pub fn name(&self) -> &'static str {
        match self {
            SlotKind::Parent => "parent",
            SlotKind::Grandparent1 => "grandparent1",
            SlotKind::Grandparent2 => "grandparent2",
        }
    }
}

/// Blue (stat) or red (aptitude) factor. Informational only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedFactor {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub stars: u8,
}

/// Green factor: a skill reference by id, or by raw name when the id
/// could not be resolved at authoring time
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GreenFactor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_id: Option<SkillId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stars: Option<u8>,
}

/// One ancestor inside a factor set
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSlot {
    /// Character name, used as the source name for skills from this slot
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_skill_id: Option<SkillId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blue_factor: Option<TypedFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub red_factor: Option<TypedFactor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green_factor: Option<GreenFactor>,
    #[serde(default)]
    pub skill_factors: Vec<SkillId>,
}

impl FactorSlot {
    /// Every resolved skill id the slot references
    pub fn skill_refs(&self) -> impl Iterator<Item = &SkillId> {
        self.unique_skill_id
            .iter()
            .chain(self.green_factor.iter().filter_map(|g| g.skill_id.as_ref()))
            .chain(self.skill_factors.iter())
    }

    /// Drop every reference to `skill_id`. Returns true if anything changed.
    ///
    /// A green factor keeps its raw name and stars so the slot still reads
    /// correctly; only the id link is cut.
    pub(crate) fn strip_skill(&mut self, skill_id: &str) -> bool {
        let mut changed = false;
        if self.unique_skill_id.as_deref() == Some(skill_id) {
            self.unique_skill_id = None;
            changed = true;
        }
        if let Some(green) = self.green_factor.as_mut() {
            if green.skill_id.as_deref() == Some(skill_id) {
                green.skill_id = None;
                changed = true;
            }
        }
        let before = self.skill_factors.len();
        self.skill_factors.retain(|id| id != skill_id);
        changed || self.skill_factors.len() != before
    }

    /// Rewrite skill ids through `remap`
    pub(crate) fn remap_skills(&mut self, remap: &dyn Fn(&str) -> Option<SkillId>) {
        if let Some(id) = self.unique_skill_id.as_mut() {
            if let Some(new_id) = remap(id) {
                *id = new_id;
            }
        }
        if let Some(id) = self.green_factor.as_mut().and_then(|g| g.skill_id.as_mut()) {
            if let Some(new_id) = remap(id) {
                *id = new_id;
            }
        }
        for id in &mut self.skill_factors {
            if let Some(new_id) = remap(id) {
                *id = new_id;
            }
        }
    }
}

/// The three named slots; absent slots are simply empty
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<FactorSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grandparent1: Option<FactorSlot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grandparent2: Option<FactorSlot>,
}

impl FactorSlots {
    pub fn get(&self, kind: SlotKind) -> Option<&FactorSlot> {
        match kind {
            SlotKind::Parent => self.parent.as_ref(),
            SlotKind::Grandparent1 => self.grandparent1.as_ref(),
            SlotKind::Grandparent2 => self.grandparent2.as_ref(),
        }
    }

    pub fn get_mut(&mut self, kind: SlotKind) -> Option<&mut FactorSlot> {
        match kind {
            SlotKind::Parent => self.parent.as_mut(),
            SlotKind::Grandparent1 => self.grandparent1.as_mut(),
            SlotKind::Grandparent2 => self.grandparent2.as_mut(),
        }
    }

    pub fn set(&mut self, kind: SlotKind, slot: Option<FactorSlot>) {
        match kind {
            SlotKind::Parent => self.parent = slot,
            SlotKind::Grandparent1 => self.grandparent1 = slot,
            SlotKind::Grandparent2 => self.grandparent2 = slot,
        }
    }

    /// Occupied slots in fixed parent, grandparent1, grandparent2 order
    pub fn iter(&self) -> impl Iterator<Item = (SlotKind, &FactorSlot)> {
        SlotKind::ALL
            .into_iter()
            .filter_map(move |kind| self.get(kind).map(|slot| (kind, slot)))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut FactorSlot> {
        self.parent
            .iter_mut()
            .chain(self.grandparent1.iter_mut())
            .chain(self.grandparent2.iter_mut())
    }
}

/// Factor set template (master or custom)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorSet {
    #[serde(rename = "masterInzaId")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub slots: FactorSlots,
    #[serde(default)]
    pub is_custom: bool,
}

impl FactorSet {
    /// Every resolved skill id the set references, slot by slot
    pub fn skill_refs(&self) -> impl Iterator<Item = &SkillId> {
        self.slots.iter().flat_map(|(_, slot)| slot.skill_refs())
    }
}

/// A factor set in the user's collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedFactorSet {
    #[serde(rename = "userInzaId")]
    pub id: String,
    #[serde(rename = "masterInzaId")]
    pub template_id: String,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(name: &str) -> FactorSlot {
        FactorSlot {
            name: name.to_string(),
            unique_skill_id: Some("u1".into()),
            green_factor: Some(GreenFactor {
                skill_id: Some("s1".into()),
                skill_name: Some("Swift".into()),
                stars: Some(3),
            }),
            skill_factors: vec!["s1".into(), "s2".into()],
            ..Default::default()
        }
    }

    #[test]
    fn test_slots_iterate_in_fixed_order() {
        let mut slots = FactorSlots::default();
        slots.set(SlotKind::Grandparent2, Some(slot("C")));
        slots.set(SlotKind::Parent, Some(slot("A")));
        let names: Vec<&str> = slots.iter().map(|(_, s)| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "C"]);
    }

    #[test]
    fn test_strip_skill_keeps_green_name() {
        let mut s = slot("A");
        assert!(s.strip_skill("s1"));
        assert_eq!(s.skill_factors, vec!["s2".to_string()]);
        let green = s.green_factor.as_ref().unwrap();
        assert_eq!(green.skill_id, None);
        assert_eq!(green.skill_name.as_deref(), Some("Swift"));
        assert!(!s.strip_skill("missing"));
    }

    #[test]
    fn test_slot_json_shape() {
        let json = r#"{"masterInzaId":"i1","name":"Set","slots":{"parent":{"name":"Kita","uniqueSkillId":"u1","blueFactor":{"type":"Speed","stars":3},"skillFactors":["s1"]}}}"#;
        let set: FactorSet = serde_json::from_str(json).unwrap();
        let parent = set.slots.parent.as_ref().unwrap();
        assert_eq!(parent.blue_factor.as_ref().unwrap().stars, 3);
        assert!(set.slots.grandparent1.is_none());
        let refs: Vec<&str> = set.skill_refs().map(String::as_str).collect();
        assert_eq!(refs, vec!["u1", "s1"]);
    }
}
