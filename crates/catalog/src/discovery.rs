use std::fs;
use std::io;
use std::path::Path;

use tracing::warn;

use crate::CatalogError;

pub const BUILD_ENTRY_FILE: &str = "index.html";
pub const SCREENSHOT_FILE: &str = "screenshot.png";

/// A playable build found at `games/<night>/<game_dir>/<framework>/index.html`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct GameBuild {
    pub night: String,
    pub game_dir: String,
    pub framework: String,
    pub has_screenshot: bool,
}

impl GameBuild {
    pub fn relative_path(&self) -> String {
        format!(
            "games/{}/{}/{}/{BUILD_ENTRY_FILE}",
            self.night, self.game_dir, self.framework
        )
    }
}

pub fn discover_game_builds(
    games_dir: &Path,
    night_filter: Option<&str>,
) -> Result<Vec<GameBuild>, CatalogError> {
    if !games_dir.is_dir() {
        return Err(CatalogError::MissingGamesDir {
            path: games_dir.to_path_buf(),
        });
    }

    let nights = list_subdirs(games_dir)?;
    if let Some(filter) = night_filter {
        if !nights.iter().any(|night| night == filter) {
            warn!(night = filter, "catalog_night_not_found");
        }
    }

    let mut builds = Vec::new();
    for night in nights
        .iter()
        .filter(|night| night_filter.map_or(true, |filter| filter == night.as_str()))
    {
        let night_dir = games_dir.join(night);
        for game_dir in list_subdirs(&night_dir)? {
            let game_path = night_dir.join(&game_dir);
            for framework in list_subdirs(&game_path)? {
                let build_dir = game_path.join(&framework);
                if !build_dir.join(BUILD_ENTRY_FILE).is_file() {
                    continue;
                }
                builds.push(GameBuild {
                    night: night.clone(),
                    game_dir: game_dir.clone(),
                    framework,
                    has_screenshot: build_dir.join(SCREENSHOT_FILE).is_file(),
                });
            }
        }
    }
    builds.sort();
    Ok(builds)
}

/// Visible child directory names of `dir`, sorted.
fn list_subdirs(dir: &Path) -> Result<Vec<String>, CatalogError> {
    let read_error = |source: io::Error| CatalogError::Read {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_error)? {
        let entry = entry.map_err(read_error)?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.starts_with('.') || !entry.path().is_dir() {
            continue;
        }
        names.push(name);
    }
    names.sort();
    Ok(names)
}
