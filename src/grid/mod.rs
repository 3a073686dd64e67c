//! Guide-derived cell grid
//!
//! Named guide lines become labeled columns (from x-guides) and rows (from
//! y-guides). Element boxes are then addressed as spreadsheet-like cells such
//! as `B3` or ranges such as `A1:C2`.

pub mod build;
pub mod cell;

pub use build::build_grid;
pub use cell::CellRef;

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Rules;
use crate::document::{Bounds, Document, ItemId};
use crate::naming::{self, Axis};

/// A named guide reduced to the single coordinate it fixes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guide {
    #[serde(skip)]
    pub id: ItemId,
    pub name: String,
    /// `None` when the name matches neither axis literal
    pub axis: Option<Axis>,
    #[serde(skip)]
    pub label: String,
    /// `left` for x-guides, `top` for y-guides
    pub coord: Option<f64>,
    pub bounds: Bounds,
    pub layer: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GuideCounts {
    pub x: usize,
    pub y: usize,
    pub unknown: usize,
}

/// All guides found in a document
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Guides {
    pub counts: GuideCounts,
    pub items: Vec<Guide>,
}

impl Guides {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub left: f64,
    pub right: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Row {
    pub name: String,
    pub top: f64,
    pub bottom: f64,
}

/// Columns ordered left to right, rows ordered top to bottom
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CellGrid {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
}

impl CellGrid {
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() || self.rows.is_empty()
    }
}

/// Collect guide-flagged items whose names carry the guide prefix.
///
/// Guides with an unresolved axis are kept (and counted as `unknown`) but
/// carry no coordinate, so the grid builder ignores them.
pub fn collect_guides(doc: &Document, rules: &Rules) -> Guides {
    let mut guides = Guides::default();

    for (id, item) in doc.iter() {
        if !naming::is_guide_item(item, rules) {
            continue;
        }
        if !naming::is_guide_name(&item.name, &rules.guide_prefix) {
            continue;
        }

        let axis = naming::guide_axis(&item.name, &rules.guide_prefix);
        let coord = axis.map(|axis| match axis {
            Axis::X => item.bounds.left,
            Axis::Y => item.bounds.top,
        });
        match axis {
            Some(Axis::X) => guides.counts.x += 1,
            Some(Axis::Y) => guides.counts.y += 1,
            None => {
                warn!(name = %item.name, "guide name has no axis literal; excluded from grid");
                guides.counts.unknown += 1;
            }
        }

        guides.items.push(Guide {
            id,
            name: item.name.clone(),
            axis,
            label: naming::guide_label(&item.name, &rules.guide_prefix)
                .unwrap_or_default()
                .to_string(),
            coord,
            bounds: item.bounds,
            layer: item.layer.clone(),
        });
    }

    debug!(
        x = guides.counts.x,
        y = guides.counts.y,
        unknown = guides.counts.unknown,
        "collected guides"
    );
    guides
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Item, ItemKind};

    fn guide(name: &str, left: f64, top: f64, right: f64, bottom: f64) -> Item {
        Item::new(name, ItemKind::Path, Bounds::new(left, top, right, bottom)).as_guide()
    }

    #[test]
    fn test_collect_uses_axis_coordinate() {
        let mut doc = Document::new("doc");
        doc.push(guide("GUIDE_xA", 13.0, 500.0, 13.0, -500.0));
        doc.push(guide("GUIDE_y1", -500.0, 26.0, 500.0, 26.0));

        let guides = collect_guides(&doc, &Rules::default());
        assert_eq!(guides.len(), 2);
        assert_eq!(guides.items[0].axis, Some(Axis::X));
        assert_eq!(guides.items[0].coord, Some(13.0));
        assert_eq!(guides.items[0].label, "A");
        assert_eq!(guides.items[1].axis, Some(Axis::Y));
        assert_eq!(guides.items[1].coord, Some(26.0));
        assert_eq!(guides.counts, GuideCounts { x: 1, y: 1, unknown: 0 });
    }

    #[test]
    fn test_unresolved_axis_counted_without_coord() {
        let mut doc = Document::new("doc");
        doc.push(guide("GUIDE_middle", 0.0, 10.0, 0.0, -10.0));

        let guides = collect_guides(&doc, &Rules::default());
        assert_eq!(guides.counts.unknown, 1);
        assert_eq!(guides.items[0].axis, None);
        assert_eq!(guides.items[0].coord, None);
    }

    #[test]
    fn test_only_named_host_guides_collected() {
        let mut doc = Document::new("doc");
        // Host guide without the naming convention
        doc.push(guide("Guide 3", 0.0, 10.0, 0.0, -10.0));
        // Guide-named, but an ordinary path on an art layer
        doc.push(
            Item::new("GUIDE_xZ", ItemKind::Path, Bounds::new(0.0, 10.0, 0.0, -10.0))
                .with_layer("Art"),
        );
        // On the guide layer without the host flag
        doc.push(
            Item::new("GUIDE_xB", ItemKind::Path, Bounds::new(5.0, 10.0, 5.0, -10.0))
                .with_layer("Guides"),
        );

        let guides = collect_guides(&doc, &Rules::default());
        let names: Vec<&str> = guides.items.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["GUIDE_xB"]);
    }
}
