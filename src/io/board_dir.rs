use std::fs;
use std::path::{Path, PathBuf};

use crate::io::storage::FileStore;
use crate::model::board::BoardLayout;
use crate::model::config::BoardConfig;

/// Name of the directory that marks a board root
pub const BOARD_DIR: &str = ".tablero";

/// Config file inside the board directory
pub const CONFIG_FILE: &str = "board.toml";

const BOARD_TOML_TEMPLATE: &str = r##"[board]
name = "{name}"
# "matrix": one column per area and priority (ingenieriaAlta, ...)
# "status": one column per status (asignada, en_proceso, completada)
layout = "{layout}"

[storage]
key = "tasks"
file = "storage.json"

[form]
require_description = true

# --- Users ---
# Credentials accepted by `tb login`. Workers see only their area.

[[users]]
username = "admin"
password = "123"
role = "admin"

[[users]]
username = "juan"
password = "123"
role = "worker"
name = "Juan García"
area = "INGENIERÍA"
"##;

/// Error type for board directory operations
#[derive(Debug, thiserror::Error)]
pub enum BoardDirError {
    #[error("not a board: no .tablero/board.toml found")]
    NotABoard,
    #[error("board already exists in {0}")]
    AlreadyExists(PathBuf),
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse board.toml: {0}")]
    ConfigParseError(#[from] toml::de::Error),
    #[error("io error: {0}")]
    IoError(#[from] std::io::Error),
}

/// A board directory with its parsed configuration
#[derive(Debug)]
pub struct BoardDir {
    /// Directory containing `.tablero/`
    pub root: PathBuf,
    /// The `.tablero/` directory itself
    pub dir: PathBuf,
    pub config: BoardConfig,
}

impl BoardDir {
    /// The key-value store this board persists to
    pub fn storage(&self) -> FileStore {
        FileStore::new(self.dir.join(&self.config.storage.file))
    }
}

/// Discover a board by walking up from the given directory,
/// looking for `.tablero/board.toml`.
pub fn discover_board(start: &Path) -> Result<PathBuf, BoardDirError> {
    let mut current = start.to_path_buf();
    loop {
        if current.join(BOARD_DIR).join(CONFIG_FILE).is_file() {
            return Ok(current);
        }
        if !current.pop() {
            return Err(BoardDirError::NotABoard);
        }
    }
}

/// Load the board configuration under `root`.
pub fn load_board(root: &Path) -> Result<BoardDir, BoardDirError> {
    let dir = root.join(BOARD_DIR);
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.is_file() {
        return Err(BoardDirError::NotABoard);
    }
    let text = fs::read_to_string(&config_path).map_err(|e| BoardDirError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;
    let config: BoardConfig = toml::from_str(&text)?;
    Ok(BoardDir {
        root: root.to_path_buf(),
        dir,
        config,
    })
}

/// Render board.toml for a new board
pub fn render_board_toml(name: &str, layout: BoardLayout) -> String {
    BOARD_TOML_TEMPLATE
        .replace("{name}", &name.replace('"', "'"))
        .replace("{layout}", layout.as_str())
}

/// Create `.tablero/` under `root` with a config and an empty store.
/// With `force`, an existing config is overwritten; stored tasks are kept.
pub fn init_board(
    root: &Path,
    name: &str,
    layout: BoardLayout,
    force: bool,
) -> Result<BoardDir, BoardDirError> {
    let dir = root.join(BOARD_DIR);
    if dir.join(CONFIG_FILE).exists() && !force {
        return Err(BoardDirError::AlreadyExists(dir));
    }
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(CONFIG_FILE), render_board_toml(name, layout))?;

    let board = load_board(root)?;
    let storage_path = board.dir.join(&board.config.storage.file);
    if !storage_path.exists() {
        fs::write(&storage_path, "{}\n")?;
    }
    Ok(board)
}
