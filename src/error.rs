use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading a map grid.
#[derive(Debug, Error)]
pub enum MapLoadError {
    #[error("can't open map {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid map character {ch:?} at byte {offset}")]
    InvalidChar { ch: char, offset: usize },
    #[error("map ended after {found} cells, expected {expected}")]
    Truncated { expected: usize, found: usize },
    #[error("map row {row} has {found} cells, expected {expected}")]
    RaggedRow { row: usize, expected: usize, found: usize },
}

/// Errors raised while reading a [`crate::WorldConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid world config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid world config: {reason}")]
    Invalid { reason: String },
}
