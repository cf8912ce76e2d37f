//! Export bundles
//!
//! Two shapes share one envelope discriminated by `dataType`:
//! `IndividualExport` carries a single custom entity, `BulkExport` carries
//! the whole custom catalog. Both may carry `dependencies.skills`, the
//! custom skills the exported entities reference.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::store::{CustomData, EntityKind, StoreError};
use crate::catalog::{FactorSet, Skill, SkillId, SupportCard};

/// Export bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "dataType")]
pub enum Bundle {
    #[serde(rename = "IndividualExport")]
    Individual {
        data: IndividualItem,
        #[serde(default)]
        dependencies: Dependencies,
    },
    #[serde(rename = "BulkExport")]
    Bulk {
        data: CustomData,
        #[serde(default)]
        dependencies: Dependencies,
    },
}

/// The single entity of an individual export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "item")]
pub enum IndividualItem {
    #[serde(rename = "skill")]
    Skill(Skill),
    #[serde(rename = "supportCard")]
    SupportCard(SupportCard),
    #[serde(rename = "inza")]
    FactorSet(FactorSet),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dependencies {
    #[serde(default)]
    pub skills: Vec<Skill>,
}

/// Reasons an import file is rejected before anything is merged
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("import file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("import file must contain a JSON object")]
    NotAnObject,
    #[error("this is a full backup, not an export file; restore it instead")]
    FullBackup,
    #[error("import file has no dataType; it is not an export file")]
    MissingDataType,
    #[error("unsupported dataType \"{0}\"")]
    UnknownDataType(String),
    #[error("export file is damaged: {0}")]
    Malformed(String),
}

impl Bundle {
    /// Split into dependency skills and the main entities, in merge order
    pub fn into_parts(self) -> (Vec<Skill>, CustomData) {
        match self {
            Bundle::Individual { data, dependencies } => {
                let mut main = CustomData::default();
                match data {
                    IndividualItem::Skill(skill) => main.skills.push(skill),
                    IndividualItem::SupportCard(card) => main.support_cards.push(card),
                    IndividualItem::FactorSet(set) => main.inza_characters.push(set),
                }
                (dependencies.skills, main)
            }
            Bundle::Bulk { data, dependencies } => (dependencies.skills, data),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Parse and validate an export file. Nothing is merged here, so a
/// rejected file never leaves partial state behind.
pub fn parse_bundle(text: &str) -> Result<Bundle, ImportError> {
    let value: Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or(ImportError::NotAnObject)?;

    match object.get("dataType").and_then(Value::as_str) {
        Some("IndividualExport") | Some("BulkExport") => {}
        Some(other) => return Err(ImportError::UnknownDataType(other.to_string())),
        None if object.contains_key("myCollection") && object.contains_key("userSettings") => {
            return Err(ImportError::FullBackup);
        }
        None => return Err(ImportError::MissingDataType),
    }

    serde_json::from_value(value).map_err(|e| ImportError::Malformed(e.to_string()))
}

/// Custom skills referenced by `refs`, first occurrence order, no repeats
fn custom_dependencies<'a>(custom: &CustomData, refs: impl Iterator<Item = &'a SkillId>) -> Vec<Skill> {
    let mut skills: Vec<Skill> = Vec::new();
    for id in refs {
        if skills.iter().any(|s| &s.id == id) {
            continue;
        }
        if let Some(skill) = custom.get::<Skill>(id) {
            skills.push(skill.clone());
        }
    }
    skills
}

/// Export one custom entity together with the custom skills it references
pub fn export_item(custom: &CustomData, kind: EntityKind, id: &str) -> Result<Bundle, StoreError> {
    let not_found = || StoreError::NotFound { kind, id: id.to_string() };
    let (data, dependencies) = match kind {
        EntityKind::Skill => {
            let skill = custom.get::<Skill>(id).ok_or_else(not_found)?;
            (IndividualItem::Skill(skill.clone()), Vec::new())
        }
        EntityKind::SupportCard => {
            let card = custom.get::<SupportCard>(id).ok_or_else(not_found)?;
            let deps = custom_dependencies(custom, card.skill_refs());
            (IndividualItem::SupportCard(card.clone()), deps)
        }
        EntityKind::FactorSet => {
            let set = custom.get::<FactorSet>(id).ok_or_else(not_found)?;
            let deps = custom_dependencies(custom, set.skill_refs());
            (IndividualItem::FactorSet(set.clone()), deps)
        }
    };
    log::info!("Exporting {} {} with {} dependent skills", kind, id, dependencies.len());
    Ok(Bundle::Individual {
        data,
        dependencies: Dependencies { skills: dependencies },
    })
}

/// Export the whole custom catalog. Every custom skill is already part of
/// the data, so the dependency list stays empty.
pub fn export_all(custom: &CustomData) -> Bundle {
    Bundle::Bulk {
        data: custom.clone(),
        dependencies: Dependencies::default(),
    }
}

/// Parse the `type` tag of an individual export
pub fn kind_from_wire(tag: &str) -> Option<EntityKind> {
    [EntityKind::Skill, EntityKind::SupportCard, EntityKind::FactorSet]
        .into_iter()
        .find(|kind| kind.wire_name() == tag)
}
