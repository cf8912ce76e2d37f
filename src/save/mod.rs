//! Save/load system
//!
//! Handles the user document, full backups and where files live.

pub mod user_data;
pub mod storage;

pub use user_data::{
    UserData, UserSettings, Theme, CollectionTab, SaveError,
    parse_user_data, parse_full_backup,
};

pub use storage::{
    data_directory, user_data_path, catalog_path,
    load_user_data, save_user_data,
};
