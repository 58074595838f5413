use std::collections::HashSet;

use serde_json::Map;

use crate::{GameBuild, GameIndexEntry, SCREENSHOT_FILE};

pub const DEFAULT_GENRE: &str = "arcade";

pub fn entry_id(build: &GameBuild) -> String {
    format!("{}-{}-{}", build.game_dir, build.framework, build.night)
}

/// `alien-breed-mix` -> `Alien Breed Mix`.
pub fn title_case(slug: &str) -> String {
    slug.split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// New entries for every build not yet listed by id or by
/// `(night, gameDir, framework)`, in build order.
pub fn plan_additions(
    existing: &[GameIndexEntry],
    builds: &[GameBuild],
    created_date: &str,
) -> Vec<GameIndexEntry> {
    let mut ids: HashSet<String> = existing.iter().map(|entry| entry.id.clone()).collect();
    let mut keys: HashSet<(String, String, String)> = existing
        .iter()
        .map(|entry| {
            (
                entry.night.clone(),
                entry.game_dir.clone(),
                entry.framework.clone(),
            )
        })
        .collect();

    let mut additions = Vec::new();
    for build in builds {
        let id = entry_id(build);
        let key = (
            build.night.clone(),
            build.game_dir.clone(),
            build.framework.clone(),
        );
        if ids.contains(&id) || keys.contains(&key) {
            continue;
        }
        ids.insert(id.clone());
        keys.insert(key);
        additions.push(new_entry(id, build, created_date));
    }
    additions
}

fn new_entry(id: String, build: &GameBuild, created_date: &str) -> GameIndexEntry {
    GameIndexEntry {
        id,
        night: build.night.clone(),
        game_dir: build.game_dir.clone(),
        framework: build.framework.clone(),
        name: title_case(&build.game_dir),
        genre: DEFAULT_GENRE.to_string(),
        description: String::new(),
        polished: false,
        expanded: false,
        playable: true,
        rating: None,
        screenshot: build.has_screenshot.then(|| SCREENSHOT_FILE.to_string()),
        path: build.relative_path(),
        created_date: Some(created_date.to_string()),
        played: false,
        played_date: None,
        extra: Map::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(night: &str, game_dir: &str, framework: &str, has_screenshot: bool) -> GameBuild {
        GameBuild {
            night: night.to_string(),
            game_dir: game_dir.to_string(),
            framework: framework.to_string(),
            has_screenshot,
        }
    }

    #[test]
    fn title_case_splits_on_dashes_and_underscores() {
        assert_eq!(title_case("alien-breed-mix"), "Alien Breed Mix");
        assert_eq!(title_case("hive_breach"), "Hive Breach");
        assert_eq!(title_case("solo"), "Solo");
        assert_eq!(title_case("--x"), "X");
    }

    #[test]
    fn new_entry_fields_follow_the_build() {
        let builds = [build("night-3", "foo", "canvas", true)];
        let additions = plan_additions(&[], &builds, "2026-10-19");
        assert_eq!(additions.len(), 1);
        let entry = &additions[0];
        assert_eq!(entry.id, "foo-canvas-night-3");
        assert_eq!(entry.name, "Foo");
        assert_eq!(entry.genre, "arcade");
        assert_eq!(entry.screenshot.as_deref(), Some("screenshot.png"));
        assert_eq!(entry.path, "games/night-3/foo/canvas/index.html");
        assert_eq!(entry.created_date.as_deref(), Some("2026-10-19"));
        assert!(entry.playable);
        assert!(!entry.polished && !entry.expanded && !entry.played);
        assert_eq!(entry.rating, None);
        assert_eq!(entry.played_date, None);
    }

    #[test]
    fn listed_builds_are_skipped_by_key_or_id() {
        let seed = [build("night-1", "hive", "canvas", false)];
        let mut listed = plan_additions(&[], &seed, "2026-01-01");
        listed[0].id = "custom-id".to_string();
        let builds = [
            build("night-1", "hive", "canvas", false),
            build("night-1", "hive", "phaser", false),
            build("night-1", "hive", "phaser", false),
        ];
        let additions = plan_additions(&listed, &builds, "2026-10-19");
        assert_eq!(additions.len(), 1);
        assert_eq!(additions[0].id, "hive-phaser-night-1");
        assert_eq!(additions[0].screenshot, None);
    }
}
