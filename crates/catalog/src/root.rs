use std::path::{Path, PathBuf};

use crate::{CatalogError, GAMES_DIR_NAME, INDEX_FILE_NAME};

pub const ROOT_ENV_VAR: &str = "ARCADE_ROOT";

/// Picks the catalog root: explicit flag, then `ARCADE_ROOT`, then the
/// nearest ancestor of `cwd` holding `games-index.json` or `games/`.
pub fn resolve_root(
    flag: Option<PathBuf>,
    env_value: Option<String>,
    cwd: &Path,
) -> Result<PathBuf, CatalogError> {
    if let Some(root) = flag {
        return Ok(root);
    }
    if let Some(root) = env_value.map(|value| value.trim().to_string()) {
        if !root.is_empty() {
            return Ok(PathBuf::from(root));
        }
    }
    cwd.ancestors()
        .find(|dir| is_catalog_root(dir))
        .map(Path::to_path_buf)
        .ok_or_else(|| CatalogError::RootNotFound {
            start: cwd.to_path_buf(),
        })
}

fn is_catalog_root(dir: &Path) -> bool {
    dir.join(INDEX_FILE_NAME).is_file() || dir.join(GAMES_DIR_NAME).is_dir()
}
