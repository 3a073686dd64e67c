//! Validation results and their plain-text rendering

use serde::Serialize;

use crate::config::Rules;
use crate::document::{Document, Item, ItemId, ItemKind};
use crate::naming::{Axis, PrefixCounts};

use super::check::AxisStatus;

/// One off-grid finding
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentDiagnostic {
    pub id: ItemId,
    pub name: String,
    pub prefix: String,
    pub kind: ItemKind,
    pub layer: String,
    pub left: f64,
    pub top: f64,
    pub left_status: AxisStatus,
    pub top_status: AxisStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide_axis: Option<Axis>,
}

/// Where a flagged item sits, for the detail sections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub kind: ItemKind,
    pub layer: String,
    pub left: f64,
    pub top: f64,
}

impl From<&Item> for ItemSummary {
    fn from(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            kind: item.kind,
            layer: item.layer.clone(),
            left: item.bounds.left,
            top: item.bounds.top,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCounts {
    /// Prefixed items, guides included
    pub semantic_named: usize,
    pub by_prefix: PrefixCounts,
    pub unknown_prefix: usize,
    pub duplicate_names: usize,
    pub unnamed_placed: usize,
    pub off_grid: usize,
    pub off_left: usize,
    pub off_top: usize,
    pub off_grid_by_prefix: PrefixCounts,
    pub composite_children_skipped: usize,
    pub guide_axis_checks: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub document: String,
    pub grid_unit: f64,
    pub tolerance: f64,
    pub counts: ValidationCounts,
    pub unknown_prefix: Vec<ItemSummary>,
    /// One entry per repeat occurrence, in document order
    pub duplicates: Vec<String>,
    pub unnamed_placed: Vec<ItemSummary>,
    pub off_grid: Vec<AlignmentDiagnostic>,
}

impl ValidationReport {
    pub fn new(doc: &Document, rules: &Rules) -> Self {
        let tally = || {
            PrefixCounts::new(
                rules
                    .prefixes
                    .iter()
                    .cloned()
                    .chain(std::iter::once(rules.guide_prefix.clone())),
            )
        };
        Self {
            document: doc.name.clone(),
            grid_unit: rules.grid_unit,
            tolerance: rules.tolerance,
            counts: ValidationCounts {
                by_prefix: tally(),
                off_grid_by_prefix: tally(),
                ..ValidationCounts::default()
            },
            unknown_prefix: Vec::new(),
            duplicates: Vec::new(),
            unnamed_placed: Vec::new(),
            off_grid: Vec::new(),
        }
    }

    pub(super) fn record_named(&mut self, prefix: &str) {
        self.counts.semantic_named += 1;
        self.counts.by_prefix.increment(prefix);
    }

    pub(super) fn record_unknown(&mut self, item: &Item) {
        self.counts.unknown_prefix += 1;
        self.unknown_prefix.push(ItemSummary::from(item));
    }

    pub(super) fn record_duplicate(&mut self, name: &str) {
        self.counts.duplicate_names += 1;
        self.duplicates.push(name.to_string());
    }

    pub(super) fn record_unnamed_placed(&mut self, item: &Item) {
        self.counts.unnamed_placed += 1;
        self.unnamed_placed.push(ItemSummary::from(item));
    }

    pub(super) fn record_off_grid(&mut self, diagnostic: AlignmentDiagnostic) {
        self.counts.off_grid += 1;
        if !diagnostic.left_status.is_ok() {
            self.counts.off_left += 1;
        }
        if !diagnostic.top_status.is_ok() {
            self.counts.off_top += 1;
        }
        self.counts.off_grid_by_prefix.increment(&diagnostic.prefix);
        self.off_grid.push(diagnostic);
    }

    /// True when nothing at all was flagged
    pub fn is_clean(&self) -> bool {
        self.off_grid.is_empty()
            && self.duplicates.is_empty()
            && self.unknown_prefix.is_empty()
            && self.unnamed_placed.is_empty()
    }

    pub fn header(&self, generated_at: &str) -> ReportHeader {
        ReportHeader {
            title: "Validation Report".to_string(),
            document: self.document.clone(),
            grid_unit: self.grid_unit,
            tolerance: self.tolerance,
            generated_at: generated_at.to_string(),
        }
    }

    /// Render as report lines: header, summary, then one detail section per
    /// non-empty finding list.
    pub fn render(&self, generated_at: &str) -> Vec<String> {
        let c = &self.counts;
        let mut lines = self.header(generated_at).lines();

        lines.push("SUMMARY".to_string());
        lines.push(format!("  Named semantic items: {}", c.semantic_named));
        for (prefix, count) in c.by_prefix.iter() {
            lines.push(format!("    {:<8}{}", format!("{prefix}:"), count));
        }
        lines.push(String::new());
        lines.push(format!("  Named items with unknown prefix: {}", c.unknown_prefix));
        lines.push(format!("  Duplicate semantic names: {}", c.duplicate_names));
        lines.push(format!("  Unnamed placed items: {}", c.unnamed_placed));
        lines.push(format!(
            "  Off-grid semantic items: {} (left: {}, top: {})",
            c.off_grid, c.off_left, c.off_top
        ));
        lines.push(format!(
            "  Composite children skipped: {}",
            c.composite_children_skipped
        ));
        lines.push(format!("  Guide axis-only checks: {}", c.guide_axis_checks));
        lines.push(String::new());

        if !self.unknown_prefix.is_empty() {
            lines.push("DETAIL: Named items with unknown prefix".to_string());
            for item in &self.unknown_prefix {
                lines.push(format!("  - {} | {} | layer: {}", item.name, item.kind, item.layer));
            }
            lines.push(String::new());
        }

        if !self.duplicates.is_empty() {
            lines.push("DETAIL: Duplicate semantic names".to_string());
            for name in &self.duplicates {
                lines.push(format!("  - {name}"));
            }
            lines.push(String::new());
        }

        if !self.unnamed_placed.is_empty() {
            lines.push("DETAIL: Unnamed placed items".to_string());
            for item in &self.unnamed_placed {
                lines.push(format!(
                    "  - placed | layer: {} | left: {} | top: {}",
                    item.layer, item.left, item.top
                ));
            }
            lines.push(String::new());
        }

        if !self.off_grid.is_empty() {
            lines.push("DETAIL: Off-grid semantic items".to_string());
            lines.push("  NOTE: x-guides are checked on left only, y-guides on top only.".to_string());
            lines.push("  NOTE: members of composite groups are not checked.".to_string());
            for d in &self.off_grid {
                lines.push(format!(
                    "  - {} | {} | layer: {} | left: {} ({}) | top: {} ({})",
                    d.name, d.kind, d.layer, d.left, d.left_status, d.top, d.top_status
                ));
            }
            lines.push(String::new());
        }

        lines
    }
}

/// Common preamble of the text reports
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub title: String,
    pub document: String,
    pub grid_unit: f64,
    pub tolerance: f64,
    pub generated_at: String,
}

impl ReportHeader {
    /// Header lines followed by a blank separator
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.title.clone(),
            format!("Document: {}", self.document),
            format!("Grid: {} pt", self.grid_unit),
            format!("Tolerance: {}", self.tolerance),
            format!("Generated: {}", self.generated_at),
            String::new(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::align::{validate, CheckScope};
    use crate::document::Bounds;

    #[test]
    fn test_header_lines() {
        let doc = Document::new("poster.ai");
        let report = ValidationReport::new(&doc, &Rules::default());
        let lines = report.header("now").lines();
        assert_eq!(lines[0], "Validation Report");
        assert_eq!(lines[1], "Document: poster.ai");
        assert_eq!(lines[2], "Grid: 3.25 pt");
        assert_eq!(lines[3], "Tolerance: 0.01");
        assert_eq!(lines[4], "Generated: now");
        assert_eq!(lines[5], "");
    }

    #[test]
    fn test_prefix_breakdown_includes_guides() {
        let doc = Document::new("doc");
        let report = ValidationReport::new(&doc, &Rules::default());
        let keys: Vec<&str> = report.counts.by_prefix.iter().map(|(p, _)| p).collect();
        assert_eq!(
            keys,
            vec!["ICON_", "COMP_", "LABEL_", "SHAPE_", "AREA_", "BOUND_", "GUIDE_"]
        );
    }

    #[test]
    fn test_clean_report_has_no_details() {
        let mut doc = Document::new("doc");
        doc.push(Item::new(
            "ICON_ok",
            ItemKind::Path,
            Bounds::new(3.25, 6.5, 6.5, 3.25),
        ));
        let report = validate(&doc, &Rules::default(), CheckScope::default());
        assert!(report.is_clean());
        assert!(!report
            .render("t")
            .iter()
            .any(|line| line.starts_with("DETAIL")));
    }

    #[test]
    fn test_off_grid_detail_line() {
        let mut doc = Document::new("doc");
        doc.push(
            Item::new("LABEL_title", ItemKind::Path, Bounds::new(1.5, 6.5, 10.0, 0.0))
                .with_layer("Text"),
        );
        let report = validate(&doc, &Rules::default(), CheckScope::default());
        let lines = report.render("t");
        assert!(lines.contains(&"  Off-grid semantic items: 1 (left: 1, top: 0)".to_string()));
        assert!(lines.contains(
            &"  - LABEL_title | path | layer: Text | left: 1.5 (OFF) | top: 6.5 (OK)".to_string()
        ));
        assert_eq!(report.counts.off_grid_by_prefix.get("LABEL_"), 1);
    }
}
