use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("games directory not found at {path}")]
    MissingGamesDir { path: PathBuf },
    #[error("no catalog root (games-index.json or games/) found at or above {start}")]
    RootNotFound { start: PathBuf },
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("index {path} is malformed at {json_path}: {message}")]
    MalformedIndex {
        path: PathBuf,
        json_path: String,
        message: String,
    },
    #[error("failed to encode index: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
