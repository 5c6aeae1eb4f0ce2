use std::path::Path;

use crate::cli::commands::InitArgs;
use crate::io::board_dir::{self, BOARD_DIR};
use crate::model::board::BoardLayout;

/// Infer a board name from a directory name: replace hyphens with spaces, title-case.
fn infer_name(dir_name: &str) -> String {
    dir_name
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                None => String::new(),
                Some(c) => {
                    let upper: String = c.to_uppercase().collect();
                    upper + chars.as_str()
                }
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn cmd_init(args: InitArgs, root: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let layout = BoardLayout::parse_layout(&args.layout).ok_or_else(|| {
        format!(
            "unknown layout '{}' (expected: matrix, status)",
            args.layout
        )
    })?;

    // Check for parent board and warn
    if let Some(parent) = root.parent()
        && let Ok(parent_root) = board_dir::discover_board(parent)
    {
        eprintln!(
            "Note: parent board found at {}/",
            parent_root.join(BOARD_DIR).display()
        );
    }

    let name = args.name.unwrap_or_else(|| {
        root.file_name()
            .and_then(|n| n.to_str())
            .map(infer_name)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| "Tablero".to_string())
    });

    let board = board_dir::init_board(root, &name, layout, args.force)?;
    tracing::info!(root = %board.root.display(), layout = layout.as_str(), "board initialized");

    println!(
        "Initialized board \"{}\" ({} layout) in {}/",
        board.config.board.name,
        layout.as_str(),
        BOARD_DIR
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_name() {
        assert_eq!(infer_name("planta-norte"), "Planta Norte");
        assert_eq!(infer_name("ops_board"), "Ops Board");
        assert_eq!(infer_name("tablero"), "Tablero");
        assert_eq!(infer_name("a--b"), "A B");
    }
}
