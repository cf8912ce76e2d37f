//! The persisted user document
//!
//! One JSON object holds everything the user owns or has set: settings,
//! custom entities, the collection, target lists, the deck and the check
//! states. Every field may be missing (or null) and falls back to its
//! default; only a document that is not an object at all is rejected.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::custom::{CustomData, OwnedCollection};
use crate::deck::Deck;
use crate::tracking::{CheckStates, TargetSkills};

/// Keys a full backup must have
const BACKUP_KEYS: [&str; 2] = ["myCollection", "userSettings"];

/// Save error types
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error on {path}: {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Parse error: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Invalid user data: {0}")]
    InvalidData(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Dark,
    /// Unrecognised values fall back here
    #[default]
    #[serde(other)]
    Light,
}

/// Which collection list was open last
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionTab {
    Inza,
    #[default]
    #[serde(other)]
    Sc,
}

/// Display preferences
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub theme: Theme,
    /// Show acquired skills only in the acquired group
    pub hide_acquired: bool,
    pub show_details: bool,
    pub last_collection_tab: CollectionTab,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    #[serde(default, deserialize_with = "or_default")]
    pub user_settings: UserSettings,
    #[serde(default, deserialize_with = "or_default")]
    pub custom_data: CustomData,
    #[serde(default, deserialize_with = "or_default")]
    pub my_collection: OwnedCollection,
    #[serde(default, deserialize_with = "or_default")]
    pub target_skills: TargetSkills,
    #[serde(default, deserialize_with = "or_default")]
    pub saved_deck: Deck,
    #[serde(default, deserialize_with = "or_default")]
    pub skill_check_states: CheckStates,
}

impl UserData {
    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Null counts as absent
fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn parse_object(text: &str) -> Result<serde_json::Map<String, Value>, SaveError> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        _ => Err(SaveError::InvalidData("document is not a JSON object".to_string())),
    }
}

/// Parse a stored user document
pub fn parse_user_data(text: &str) -> Result<UserData, SaveError> {
    let object = parse_object(text)?;
    Ok(serde_json::from_value(Value::Object(object))?)
}

/// Parse an uploaded full backup. Unlike a stored document it must carry
/// the collection and the settings, so random JSON is not taken for a profile.
pub fn parse_full_backup(text: &str) -> Result<UserData, SaveError> {
    let object = parse_object(text)?;
    if let Some(missing) = BACKUP_KEYS.iter().find(|key| !object.contains_key(**key)) {
        return Err(SaveError::InvalidData(format!("backup has no {missing}")));
    }
    Ok(serde_json::from_value(Value::Object(object))?)
}
