//! Staged export pipeline and run signature

use tracing::debug;

use crate::config::Rules;
use crate::document::Document;
use crate::grid::{build_grid, collect_guides};
use crate::naming::{self, NameClass, PrefixCounts};

use super::{
    extract_composites, top_level_entries, ArtboardRecord, ExportMeta, SemanticDocument,
    SemanticSection,
};

/// Bucket for named items that match no semantic prefix
pub const UNKNOWN_BUCKET: &str = "unknown";

/// Derive the semantic model of `doc`.
///
/// Stages run strictly in order (guides, grid, composites, top-level entries)
/// and each consumes only the previous stage's output. `generated_at` is
/// stamped into the metadata verbatim.
pub fn export(doc: &Document, rules: &Rules, generated_at: &str) -> SemanticDocument {
    let guides = collect_guides(doc, rules);
    let grid = build_grid(&guides.items, rules.row_labels);
    let composites = extract_composites(doc, rules, &grid);
    let items = top_level_entries(doc, rules, &grid, composites);

    let mut counts = PrefixCounts::new(rules.prefixes.iter().cloned());
    for entry in &items {
        counts.increment(&entry.record.prefix);
    }

    let artboards: Vec<ArtboardRecord> = doc
        .artboards
        .iter()
        .enumerate()
        .map(|(i, a)| ArtboardRecord::new(i, a))
        .collect();

    let signature = signature(
        &doc.name,
        artboards.len(),
        guides.len(),
        items.len(),
        &counts,
        &rules.signature_prefixes(),
    );
    counts.add(UNKNOWN_BUCKET, count_unknown(doc, rules));

    debug!(semantic = items.len(), %signature, "exported semantic model");

    SemanticDocument {
        meta: ExportMeta {
            name: doc.name.clone(),
            grid_unit: rules.grid_unit,
            tolerance: rules.tolerance,
            generated_at: generated_at.to_string(),
            coordinate_system: "cell-based",
        },
        artboards,
        layers: doc.layers.clone(),
        guides,
        cell_grid: grid,
        semantic: SemanticSection {
            prefixes: rules.prefixes.clone(),
            counts_by_prefix: counts,
            items,
        },
        signature,
    }
}

/// Named items outside the guide system that carry no known prefix
fn count_unknown(doc: &Document, rules: &Rules) -> usize {
    doc.iter()
        .filter(|(_, item)| !naming::is_guide_item(item, rules))
        .filter(|(_, item)| classify_is_unknown(&item.name, rules))
        .count()
}

fn classify_is_unknown(name: &str, rules: &Rules) -> bool {
    matches!(naming::classify(name, rules), NameClass::Unknown)
}

/// Deterministic, diffable digest of a run's semantic shape.
///
/// `doc=<name>|artboards=<n>|guides=<n>|semantic=<n>` followed by one
/// `<TAG>=<count>` field per prefix in the given order, where the tag is the
/// prefix without its trailing underscore.
pub fn signature(
    doc_name: &str,
    artboards: usize,
    guides: usize,
    semantic: usize,
    counts: &PrefixCounts,
    prefixes: &[&str],
) -> String {
    let mut fields = vec![
        format!("doc={doc_name}"),
        format!("artboards={artboards}"),
        format!("guides={guides}"),
        format!("semantic={semantic}"),
    ];
    for &prefix in prefixes {
        fields.push(format!(
            "{}={}",
            prefix.trim_end_matches('_'),
            counts.get(prefix)
        ));
    }
    fields.join("|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Artboard, Bounds, Item, ItemKind};

    fn sample() -> Document {
        let mut doc = Document::new("poster.ai");
        doc.artboards.push(Artboard {
            name: "Main".to_string(),
            rect: Bounds::new(0.0, 100.0, 20.0, 0.0),
        });
        for (name, l, t, r, b) in [
            ("GUIDE_xA", 0.0, 100.0, 0.0, 0.0),
            ("GUIDE_xB", 10.0, 100.0, 10.0, 0.0),
            ("GUIDE_xC", 20.0, 100.0, 20.0, 0.0),
            ("GUIDE_y1", 0.0, 100.0, 20.0, 100.0),
            ("GUIDE_y2", 0.0, 90.0, 20.0, 90.0),
            ("GUIDE_y3", 0.0, 80.0, 20.0, 80.0),
        ] {
            doc.push(Item::new(name, ItemKind::Path, Bounds::new(l, t, r, b)).as_guide());
        }
        let card = doc.push(Item::new(
            "COMP_card",
            ItemKind::Group,
            Bounds::new(1.0, 99.0, 19.0, 81.0),
        ));
        doc.push(
            Item::new("ICON_star", ItemKind::Path, Bounds::new(5.0, 95.0, 8.0, 92.0))
                .with_parent(card),
        );
        doc.push(Item::new(
            "LABEL_caption",
            ItemKind::Path,
            Bounds::new(5.0, 95.0, 15.0, 85.0),
        ));
        doc.push(Item::new("Layer art", ItemKind::Path, Bounds::new(0.0, 1.0, 1.0, 0.0)));
        doc
    }

    #[test]
    fn test_export_sections() {
        let out = export(&sample(), &Rules::default(), "2024-01-01 00:00:00");

        assert_eq!(out.meta.name, "poster.ai");
        assert_eq!(out.meta.generated_at, "2024-01-01 00:00:00");
        assert_eq!(out.artboards.len(), 1);
        assert_eq!(out.guides.counts.x, 3);
        assert_eq!(out.cell_grid.columns.len(), 2);
        assert_eq!(out.cell_grid.rows.len(), 2);

        let caption = out.entry("LABEL_caption").expect("caption exported");
        assert_eq!(caption.record.cell.as_deref(), Some("A1"));
        assert_eq!(caption.record.cell_range.as_deref(), Some("A1:B2"));

        let card = out.entry("COMP_card").expect("card exported");
        let star = &card.children.as_ref().expect("children")[0];
        assert_eq!(star.cell_range.as_deref(), Some("A1"));
        assert!(out.entry("ICON_star").is_none());
    }

    #[test]
    fn test_counts_and_signature() {
        let out = export(&sample(), &Rules::default(), "t");
        assert_eq!(out.semantic.counts_by_prefix.get("COMP_"), 1);
        assert_eq!(out.semantic.counts_by_prefix.get("LABEL_"), 1);
        // Children are attached, not counted at top level
        assert_eq!(out.semantic.counts_by_prefix.get("ICON_"), 0);
        assert_eq!(out.semantic.counts_by_prefix.get(UNKNOWN_BUCKET), 1);
        assert_eq!(
            out.signature,
            "doc=poster.ai|artboards=1|guides=6|semantic=2|ICON=0|COMP=1|AREA=0|BOUND=0|LABEL=1|SHAPE=0"
        );
    }

    #[test]
    fn test_custom_table_signature_uses_table_order() {
        let rules = Rules::default()
            .with_prefixes(["LABEL_", "COMP_", "ICON_"])
            .with_composite_prefix("COMP_");
        let out = export(&sample(), &rules, "t");
        assert!(out
            .signature
            .ends_with("|semantic=2|LABEL=1|COMP=1|ICON=0"));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let a = export(&sample(), &Rules::default(), "first");
        let b = export(&sample(), &Rules::default(), "second");
        assert_eq!(a.signature, b.signature);
    }

    #[test]
    fn test_json_shape() {
        let out = export(&sample(), &Rules::default(), "t");
        let json: serde_json::Value =
            serde_json::from_str(&out.to_json_pretty().unwrap()).unwrap();

        assert_eq!(json["meta"]["gridUnit"], 3.25);
        assert_eq!(json["cellGrid"]["columns"][0]["name"], "A");
        assert_eq!(json["guides"]["items"][0]["axis"], "x");
        assert_eq!(json["guides"]["items"][0]["coord"], 0.0);
        assert_eq!(json["semantic"]["countsByPrefix"]["unknown"], 1);

        let card = &json["semantic"]["items"][0];
        assert_eq!(card["name"], "COMP_card");
        assert_eq!(card["kind"], "group");
        assert_eq!(card["bounds"]["width"], 18.0);
        assert_eq!(card["children"][0]["cellRange"], "A1");

        // Atomic entries carry no children key at all
        let caption = &json["semantic"]["items"][1];
        assert!(caption.get("children").is_none());
    }
}
