//! Training scenarios (master data only)

use serde::{Deserialize, Serialize};

use super::card::GoldenSkill;
use super::skill::SkillId;

/// A skill the scenario grants at a fixed level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSkill {
    pub skill_id: SkillId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(rename = "scenarioId")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub golden_skills: Vec<GoldenSkill>,
    #[serde(default)]
    pub skills: Vec<ScenarioSkill>,
}
