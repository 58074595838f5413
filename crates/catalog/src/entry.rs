use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::atomic_io::write_text_atomic;
use crate::CatalogError;

/// One listed build in `games-index.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameIndexEntry {
    pub id: String,
    pub night: String,
    pub game_dir: String,
    pub framework: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub genre: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub polished: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expanded: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub playable: bool,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub screenshot: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub path: String,
    #[serde(default)]
    pub created_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub played: bool,
    #[serde(default)]
    pub played_date: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Hand-edited entries sometimes carry `null` where a value belongs.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The index as loaded from disk.
///
/// Existing entries are kept as raw JSON for writing so their fields,
/// key order and unknown keys survive untouched; the typed view is used
/// for validation and duplicate detection only.
#[derive(Debug, Default)]
pub struct GamesIndex {
    raw: Vec<Value>,
    entries: Vec<GameIndexEntry>,
}

impl GamesIndex {
    /// Loads `path`; a missing file is an empty index.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CatalogError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        Self::parse(path, &text)
    }

    pub(crate) fn parse(path: &Path, text: &str) -> Result<Self, CatalogError> {
        let mut deserializer = serde_json::Deserializer::from_str(text);
        let entries: Vec<GameIndexEntry> = serde_path_to_error::deserialize(&mut deserializer)
            .map_err(|error| {
                let json_path = error.path().to_string();
                CatalogError::MalformedIndex {
                    path: path.to_path_buf(),
                    json_path,
                    message: error.into_inner().to_string(),
                }
            })?;
        let raw: Vec<Value> =
            serde_json::from_str(text).map_err(|error| CatalogError::MalformedIndex {
                path: path.to_path_buf(),
                json_path: ".".to_string(),
                message: error.to_string(),
            })?;
        Ok(Self { raw, entries })
    }

    pub fn entries(&self) -> &[GameIndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders existing entries followed by `additions` as 2-space pretty JSON.
    pub fn render_with(&self, additions: &[GameIndexEntry]) -> Result<String, CatalogError> {
        let mut document = self.raw.clone();
        for entry in additions {
            document.push(serde_json::to_value(entry).map_err(CatalogError::Encode)?);
        }
        let mut text = serde_json::to_string_pretty(&document).map_err(CatalogError::Encode)?;
        text.push('\n');
        Ok(text)
    }

    pub fn write_with(
        &self,
        path: &Path,
        additions: &[GameIndexEntry],
    ) -> Result<(), CatalogError> {
        let text = self.render_with(additions)?;
        write_text_atomic(path, &text).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;

    fn index_path() -> PathBuf {
        PathBuf::from("games-index.json")
    }

    #[test]
    fn entry_serializes_with_camel_case_keys() {
        let entry = GameIndexEntry {
            id: "foo-canvas-night-3".to_string(),
            night: "night-3".to_string(),
            game_dir: "foo".to_string(),
            framework: "canvas".to_string(),
            name: "Foo".to_string(),
            genre: "arcade".to_string(),
            description: String::new(),
            polished: false,
            expanded: false,
            playable: true,
            rating: None,
            screenshot: None,
            path: "games/night-3/foo/canvas/index.html".to_string(),
            created_date: Some("2026-10-19".to_string()),
            played: false,
            played_date: None,
            extra: Map::new(),
        };
        let value = serde_json::to_value(&entry).expect("serialize");
        assert_eq!(value["gameDir"], json!("foo"));
        assert_eq!(value["createdDate"], json!("2026-10-19"));
        assert_eq!(value["playedDate"], json!(null));
        assert_eq!(value["rating"], json!(null));
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn unknown_fields_and_key_order_survive_rendering() {
        let text = r#"[
  {
    "night": "night-1",
    "id": "old-phaser-night-1",
    "gameDir": "old",
    "framework": "phaser",
    "rating": 4,
    "notes": "keep me"
  }
]
"#;
        let index = GamesIndex::parse(&index_path(), text).expect("parse");
        assert_eq!(index.len(), 1);
        assert_eq!(index.entries()[0].extra["notes"], json!("keep me"));
        assert_eq!(index.render_with(&[]).expect("render"), text);
    }

    #[test]
    fn malformed_entry_reports_json_path() {
        let text = r#"[{"id": "a", "night": "n", "gameDir": "g", "framework": "f"}, {"id": 7}]"#;
        let error = GamesIndex::parse(&index_path(), text).expect_err("malformed");
        match error {
            CatalogError::MalformedIndex { json_path, .. } => assert_eq!(json_path, "[1].id"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn null_fields_read_as_defaults_and_stay_null_on_disk() {
        let text = r#"[
  {
    "id": "old-canvas-night-1",
    "night": "night-1",
    "gameDir": "old",
    "framework": "canvas",
    "name": null,
    "description": null,
    "played": null,
    "rating": null
  }
]
"#;
        let index = GamesIndex::parse(&index_path(), text).expect("parse");
        let entry = &index.entries()[0];
        assert_eq!(entry.name, "");
        assert_eq!(entry.description, "");
        assert!(!entry.played);
        assert_eq!(entry.rating, None);
        assert_eq!(index.render_with(&[]).expect("render"), text);
    }

    #[test]
    fn missing_file_loads_as_empty_index() {
        let temp = tempfile::TempDir::new().expect("tempdir");
        let index = GamesIndex::load(&temp.path().join("games-index.json")).expect("load");
        assert!(index.is_empty());
        assert_eq!(index.render_with(&[]).expect("render"), "[]\n");
    }
}
