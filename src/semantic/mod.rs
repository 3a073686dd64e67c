//! Semantic layout model
//!
//! Classified items, with composites carrying their constituent children,
//! addressed on the guide grid and bundled with document context into an
//! exportable [`SemanticDocument`].

pub mod export;
pub mod hierarchy;

pub use export::{export, signature};
pub use hierarchy::{extract_children, extract_composites, top_level_entries, Composites, Consumed};

use serde::Serialize;

use crate::document::{Artboard, Bounds, Item, ItemKind, Layer};
use crate::grid::{CellGrid, Guides};
use crate::naming::PrefixCounts;

/// Exported classification of one item
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticRecord {
    pub name: String,
    pub prefix: String,
    pub kind: ItemKind,
    pub layer: String,
    pub cell: Option<String>,
    pub cell_range: Option<String>,
    pub bounds: Bounds,
}

impl SemanticRecord {
    /// Classify `item` under `prefix` and address it on `grid`
    pub fn new(item: &Item, prefix: &str, grid: &CellGrid) -> Self {
        let cell = grid.locate(&item.bounds);
        Self {
            name: item.name.clone(),
            prefix: prefix.to_string(),
            kind: item.kind,
            layer: item.layer.clone(),
            cell: cell.cell,
            cell_range: cell.range,
            bounds: item.bounds,
        }
    }
}

/// A top-level entry. Composites own their children; children never nest
/// further.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemanticEntry {
    #[serde(flatten)]
    pub record: SemanticRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<SemanticRecord>>,
}

impl SemanticEntry {
    pub fn atomic(record: SemanticRecord) -> Self {
        Self {
            record,
            children: None,
        }
    }

    pub fn composite(record: SemanticRecord, children: Vec<SemanticRecord>) -> Self {
        Self {
            record,
            children: Some(children),
        }
    }

    pub fn name(&self) -> &str {
        &self.record.name
    }

    pub fn is_composite(&self) -> bool {
        self.children.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMeta {
    pub name: String,
    pub grid_unit: f64,
    pub tolerance: f64,
    pub generated_at: String,
    pub coordinate_system: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArtboardRecord {
    pub index: usize,
    pub name: String,
    pub rect: Bounds,
}

impl ArtboardRecord {
    pub fn new(index: usize, artboard: &Artboard) -> Self {
        Self {
            index,
            name: artboard.name.clone(),
            rect: artboard.rect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticSection {
    pub prefixes: Vec<String>,
    pub counts_by_prefix: PrefixCounts,
    pub items: Vec<SemanticEntry>,
}

/// The complete exported model of one run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemanticDocument {
    pub meta: ExportMeta,
    pub artboards: Vec<ArtboardRecord>,
    pub layers: Vec<Layer>,
    pub guides: Guides,
    pub cell_grid: CellGrid,
    pub semantic: SemanticSection,
    pub signature: String,
}

impl SemanticDocument {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Find a top-level entry by name
    pub fn entry(&self, name: &str) -> Option<&SemanticEntry> {
        self.semantic.items.iter().find(|e| e.name() == name)
    }
}
