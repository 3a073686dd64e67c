//! guidegrid - semantic layout extraction on a guide-derived grid
//!
//! Reads a flattened drawing snapshot, classifies elements by their name
//! prefixes, derives a labeled cell grid from named guide lines and exports a
//! semantic model of the layout. The same rules drive a grid-alignment
//! validator and a corrector that snaps stray elements back onto the grid.
//!
//! # Example
//!
//! ```rust
//! use guidegrid::document::{Bounds, Document, Item, ItemKind};
//! use guidegrid::{export, Rules};
//!
//! let mut doc = Document::new("poster.ai");
//! doc.push(Item::new("GUIDE_xA", ItemKind::Path, Bounds::new(0.0, 100.0, 0.0, 0.0)).as_guide());
//! doc.push(Item::new("GUIDE_xB", ItemKind::Path, Bounds::new(13.0, 100.0, 13.0, 0.0)).as_guide());
//! doc.push(Item::new("ICON_star", ItemKind::Path, Bounds::new(3.25, 9.75, 6.5, 6.5)));
//!
//! let model = export(&doc, &Rules::default(), "2024-01-01 00:00:00");
//! assert_eq!(model.cell_grid.columns[0].name, "A");
//! assert!(model.signature.starts_with("doc=poster.ai|artboards=0|guides=2|semantic=1"));
//! ```

pub mod align;
pub mod config;
pub mod document;
pub mod error;
pub mod grid;
pub mod naming;
pub mod semantic;

pub use align::{CheckScope, SnapOutcome, ValidationReport};
pub use config::{DedupKey, Rounding, RowLabels, Rules, RulesError};
pub use error::Error;
pub use semantic::{export, SemanticDocument};

use document::Document;

/// Check every prefixed item against the grid without changing anything
///
/// # Example
///
/// ```rust
/// use guidegrid::document::{Bounds, Document, Item, ItemKind};
/// use guidegrid::{validate, CheckScope, Rules};
///
/// let mut doc = Document::new("doc");
/// doc.push(Item::new("ICON_a", ItemKind::Path, Bounds::new(1.0, 6.5, 4.0, 3.25)));
///
/// let report = validate(&doc, &Rules::default(), CheckScope::default());
/// assert_eq!(report.counts.off_grid, 1);
/// ```
pub fn validate(doc: &Document, rules: &Rules, scope: CheckScope) -> ValidationReport {
    align::validate(doc, rules, scope)
}

/// Plan grid corrections against the document as it stands, then apply them
pub fn snap(doc: &mut Document, rules: &Rules, scope: CheckScope) -> SnapOutcome {
    let plan = align::plan_corrections(doc, rules, scope);
    align::apply_corrections(doc, plan)
}
