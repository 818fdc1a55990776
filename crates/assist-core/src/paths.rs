use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ASSIST_DIR: &str = ".assist";
pub const CONFIG_FILE: &str = ".assist/config.yaml";
pub const DEFAULT_RECIPES_FILE: &str = "command_recipes.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn assist_dir(root: &Path) -> PathBuf {
    root.join(ASSIST_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve the recipe file against `root` unless it is already absolute.
pub fn recipes_path(root: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        root.join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lives_under_assist_dir() {
        let root = Path::new("/work");
        assert_eq!(config_path(root), PathBuf::from("/work/.assist/config.yaml"));
        assert!(config_path(root).starts_with(assist_dir(root)));
    }

    #[test]
    fn relative_recipe_file_is_joined_to_root() {
        let root = Path::new("/work");
        assert_eq!(
            recipes_path(root, Path::new(DEFAULT_RECIPES_FILE)),
            PathBuf::from("/work/command_recipes.json")
        );
    }

    #[test]
    fn absolute_recipe_file_is_kept() {
        let root = Path::new("/work");
        assert_eq!(
            recipes_path(root, Path::new("/data/recipes.json")),
            PathBuf::from("/data/recipes.json")
        );
    }
}
