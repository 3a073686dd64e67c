//! JSON snapshot reading and writing

use std::path::Path;

use thiserror::Error;

use super::error::DocumentError;
use super::types::Document;

/// Errors that can occur when loading or saving a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse snapshot JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid snapshot: {0}")]
    Invalid(#[from] DocumentError),
}

/// Parse and validate a snapshot from a JSON string
pub fn from_str(content: &str) -> Result<Document, SnapshotError> {
    let doc: Document = serde_json::from_str(content)?;
    doc.validate()?;
    Ok(doc)
}

/// Load and validate a snapshot from a JSON file
pub fn load(path: &Path) -> Result<Document, SnapshotError> {
    let content = std::fs::read_to_string(path)?;
    from_str(&content)
}

pub fn to_string(doc: &Document) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Write a snapshot back out, e.g. after grid correction
pub fn save(doc: &Document, path: &Path) -> Result<(), SnapshotError> {
    std::fs::write(path, to_string(doc)?)?;
    Ok(())
}
