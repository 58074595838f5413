//! Keeps `games-index.json` in step with the builds under `games/`.

mod atomic_io;
mod discovery;
mod entry;
mod error;
mod plan;
mod root;

use std::path::PathBuf;

use tracing::info;

pub use discovery::{discover_game_builds, GameBuild, BUILD_ENTRY_FILE, SCREENSHOT_FILE};
pub use entry::{GameIndexEntry, GamesIndex};
pub use error::CatalogError;
pub use plan::{entry_id, plan_additions, title_case, DEFAULT_GENRE};
pub use root::{resolve_root, ROOT_ENV_VAR};

pub const INDEX_FILE_NAME: &str = "games-index.json";
pub const GAMES_DIR_NAME: &str = "games";

#[derive(Debug, Clone)]
pub struct AddGamesOptions {
    pub root: PathBuf,
    pub night: Option<String>,
    pub dry_run: bool,
    pub created_date: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AddGamesReport {
    pub index_path: PathBuf,
    pub added: Vec<GameIndexEntry>,
    pub total: usize,
    pub written: bool,
}

/// Appends every unlisted build to the index. Nothing is written when there
/// are no additions or `dry_run` is set.
pub fn add_games(options: &AddGamesOptions) -> Result<AddGamesReport, CatalogError> {
    let index_path = options.root.join(INDEX_FILE_NAME);
    let games_dir = options.root.join(GAMES_DIR_NAME);

    let index = GamesIndex::load(&index_path)?;
    let builds = discover_game_builds(&games_dir, options.night.as_deref())?;
    let added = plan_additions(index.entries(), &builds, &options.created_date);
    info!(
        root = %options.root.display(),
        builds = builds.len(),
        existing = index.len(),
        additions = added.len(),
        "catalog_scan_complete"
    );

    let total = index.len() + added.len();
    let written = !added.is_empty() && !options.dry_run;
    if written {
        index.write_with(&index_path, &added)?;
        info!(path = %index_path.display(), added = added.len(), total, "catalog_written");
    }
    Ok(AddGamesReport {
        index_path,
        added,
        total,
        written,
    })
}
