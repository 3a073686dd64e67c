//! Top-level error type for the file-facing entry points

use std::path::PathBuf;

use thiserror::Error;

use crate::config::RulesError;
use crate::document::SnapshotError;

/// Errors that can occur around a run: loading inputs and writing outputs.
///
/// The core stages never fail; everything here comes from the adapters.
#[derive(Debug, Error)]
pub enum Error {
    #[error("snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("rules error: {0}")]
    Rules(#[from] RulesError),

    #[error("failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
