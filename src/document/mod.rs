//! Flattened snapshot of a drawing document
//!
//! Items live in an arena addressed by [`ItemId`]. Containment is expressed
//! through parent indices, so no host object model is needed downstream.

pub mod error;
pub mod snapshot;
pub mod types;

pub use error::DocumentError;
pub use snapshot::SnapshotError;
pub use types::*;
