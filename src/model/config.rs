use serde::{Deserialize, Serialize};

use super::board::BoardLayout;
use super::session::Role;
use super::task::Area;

/// Configuration from board.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default)]
    pub board: BoardInfo,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub form: FormConfig,
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardInfo {
    #[serde(default = "default_board_name")]
    pub name: String,
    #[serde(default)]
    pub layout: BoardLayout,
}

impl Default for BoardInfo {
    fn default() -> Self {
        BoardInfo {
            name: default_board_name(),
            layout: BoardLayout::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Key the board snapshot is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
    /// Storage file, relative to the .tablero/ directory
    #[serde(default = "default_storage_file")]
    pub file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            key: default_storage_key(),
            file: default_storage_file(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormConfig {
    /// Reject submissions with a blank description
    #[serde(default = "default_true")]
    pub require_description: bool,
}

impl Default for FormConfig {
    fn default() -> Self {
        FormConfig {
            require_description: true,
        }
    }
}

/// A login entry. Workers carry a display name and an area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserConfig {
    pub username: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub area: Option<Area>,
}

fn default_board_name() -> String {
    "Tablero".to_string()
}

fn default_storage_key() -> String {
    "tasks".to_string()
}

fn default_storage_file() -> String {
    "storage.json".to_string()
}

fn default_true() -> bool {
    true
}
