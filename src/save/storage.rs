//! On-disk locations and load/save of the user document

use std::fs;
use std::path::{Path, PathBuf};

use super::user_data::{parse_user_data, SaveError, UserData};

const USER_DATA_FILE: &str = "userdata.json";
const CATALOG_FILE: &str = "masterData.json";

/// Get the data directory path
pub fn data_directory() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "skillplanner", "SkillPlanner") {
        proj_dirs.data_local_dir().to_path_buf()
    } else {
        // Fallback to current directory
        PathBuf::from(".")
    }
}

pub fn user_data_path() -> PathBuf {
    data_directory().join(USER_DATA_FILE)
}

pub fn catalog_path() -> PathBuf {
    data_directory().join(CATALOG_FILE)
}

fn io_error(path: &Path, source: std::io::Error) -> SaveError {
    SaveError::IoError {
        path: path.display().to_string(),
        source,
    }
}

/// Load the user document. A missing file is a fresh profile.
pub fn load_user_data(path: &Path) -> Result<UserData, SaveError> {
    if !path.exists() {
        log::info!("No user data at {}, starting fresh", path.display());
        return Ok(UserData::default());
    }
    let text = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    let data = parse_user_data(&text)?;
    log::info!(
        "Loaded user data: {} cards, {} factor sets, {} custom skills",
        data.my_collection.support_cards.len(),
        data.my_collection.inza_characters.len(),
        data.custom_data.skills.len()
    );
    Ok(data)
}

/// Write the user document, creating its directory when needed
pub fn save_user_data(path: &Path, data: &UserData) -> Result<(), SaveError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
    }
    let json = data.to_json()?;
    fs::write(path, json).map_err(|e| io_error(path, e))?;
    log::info!("User data saved to {}", path.display());
    Ok(())
}
