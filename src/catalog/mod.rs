//! Master catalog
//!
//! The read-only game database: scenarios, skills, support cards and factor
//! sets. It is loaded once at startup; the planner cannot run without it.

pub mod skill;
pub mod card;
pub mod factor;
pub mod scenario;
pub mod lookup;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use skill::{Skill, SkillId, SkillCategory, UpgradeType, EffectType, compare_names};
pub use card::{SupportCard, GoldenSkill, OwnedCard, MAX_BREAKTHROUGH};
pub use factor::{FactorSet, FactorSlot, FactorSlots, SlotKind, TypedFactor, GreenFactor, OwnedFactorSet};
pub use scenario::{Scenario, ScenarioSkill};
pub use lookup::Lookup;

/// Master catalog document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub support_cards: Vec<SupportCard>,
    #[serde(default)]
    pub inza_characters: Vec<FactorSet>,
}

/// Failure to bootstrap the master catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read master catalog {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("master catalog is not valid: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Catalog {
    pub fn skill(&self, id: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.id == id)
    }

    /// Master skill with this name, ignoring surrounding whitespace
    pub fn skill_by_name(&self, name: &str) -> Option<&Skill> {
        let name = name.trim();
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn support_card(&self, id: &str) -> Option<&SupportCard> {
        self.support_cards.iter().find(|c| c.id == id)
    }

    pub fn factor_set(&self, id: &str) -> Option<&FactorSet> {
        self.inza_characters.iter().find(|f| f.id == id)
    }

    pub fn scenario(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }
}

/// Parse a master catalog document
pub fn parse_catalog(text: &str) -> Result<Catalog, CatalogError> {
    let mut catalog: Catalog = serde_json::from_str(text)?;
    // Master entities are never custom, whatever the file says
    for skill in &mut catalog.skills {
        skill.is_custom = false;
    }
    for card in &mut catalog.support_cards {
        card.is_custom = false;
    }
    for set in &mut catalog.inza_characters {
        set.is_custom = false;
    }
    Ok(catalog)
}

/// Load the master catalog from disk
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    let text = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog = parse_catalog(&text)?;
    log::info!(
        "Master catalog loaded from {:?}: {} skills, {} cards, {} factor sets, {} scenarios",
        path,
        catalog.skills.len(),
        catalog.support_cards.len(),
        catalog.inza_characters.len(),
        catalog.scenarios.len()
    );
    Ok(catalog)
}
