//! Per-item alignment verdicts and the validation pass

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::config::Rules;
use crate::document::{Document, ItemId, ItemKind};
use crate::naming::{self, Axis, NameClass};

use super::is_on_grid;
use super::report::{AlignmentDiagnostic, ValidationReport};

/// Which named items take part in a check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckScope {
    /// Semantic items plus guide-named items (axis-only)
    #[default]
    WithGuides,
    /// Semantic items only; guides are validated separately
    SemanticOnly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisStatus {
    Ok,
    Off,
}

impl AxisStatus {
    fn from_check(on_grid: bool) -> Self {
        if on_grid {
            AxisStatus::Ok
        } else {
            AxisStatus::Off
        }
    }

    pub fn is_ok(self) -> bool {
        self == AxisStatus::Ok
    }
}

impl fmt::Display for AxisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisStatus::Ok => write!(f, "OK"),
            AxisStatus::Off => write!(f, "OFF"),
        }
    }
}

/// Why an item was not evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Unnamed,
    /// Named, but no semantic prefix and not a guide
    Unclassified,
    GuideExcluded,
    /// Non-composite item inside a composite group
    CompositeChild,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'r> {
    Skip(SkipReason),
    Checked {
        prefix: &'r str,
        /// Set for guides; only this axis was tested
        guide_axis: Option<Axis>,
        left: AxisStatus,
        top: AxisStatus,
    },
}

impl Verdict<'_> {
    /// True when a checked axis is off grid
    pub fn is_off(&self) -> bool {
        match self {
            Verdict::Skip(_) => false,
            Verdict::Checked { left, top, .. } => !left.is_ok() || !top.is_ok(),
        }
    }
}

/// Walks the parent chain to the root, stopping at the first group named
/// with the composite prefix.
pub fn has_composite_ancestor(doc: &Document, id: ItemId, rules: &Rules) -> bool {
    doc.ancestors(id).any(|(_, ancestor)| {
        ancestor.kind == ItemKind::Group && ancestor.name.starts_with(&rules.composite_prefix)
    })
}

/// Evaluate one item against the grid.
///
/// Semantic items need both `left` and `top` on grid. A guide is tested only
/// on the axis its name resolves to (or, failing that, its geometry implies);
/// the other axis is always `Ok`.
pub fn check_item<'r>(doc: &Document, id: ItemId, rules: &'r Rules, scope: CheckScope) -> Verdict<'r> {
    let Some(item) = doc.get(id) else {
        return Verdict::Skip(SkipReason::Missing);
    };

    let (prefix, is_guide) = match naming::classify(&item.name, rules) {
        NameClass::Unnamed => return Verdict::Skip(SkipReason::Unnamed),
        NameClass::Unknown => return Verdict::Skip(SkipReason::Unclassified),
        NameClass::Guide if scope == CheckScope::SemanticOnly => {
            return Verdict::Skip(SkipReason::GuideExcluded)
        }
        NameClass::Guide => (rules.guide_prefix.as_str(), true),
        NameClass::Semantic(prefix) => (prefix, false),
    };

    if !rules.is_composite_prefix(prefix) && has_composite_ancestor(doc, id, rules) {
        return Verdict::Skip(SkipReason::CompositeChild);
    }

    let guide_axis = is_guide
        .then(|| naming::resolve_guide_axis(&item.name, &item.bounds, &rules.guide_prefix));
    let left = match guide_axis {
        Some(Axis::Y) => AxisStatus::Ok,
        _ => AxisStatus::from_check(is_on_grid(item.bounds.left, rules.grid_unit, rules.tolerance)),
    };
    let top = match guide_axis {
        Some(Axis::X) => AxisStatus::Ok,
        _ => AxisStatus::from_check(is_on_grid(item.bounds.top, rules.grid_unit, rules.tolerance)),
    };

    Verdict::Checked {
        prefix,
        guide_axis,
        left,
        top,
    }
}

/// Run the validator over every item of the document
pub fn validate(doc: &Document, rules: &Rules, scope: CheckScope) -> ValidationReport {
    let mut report = ValidationReport::new(doc, rules);
    let mut seen: HashSet<&str> = HashSet::new();

    for (id, item) in doc.iter() {
        // Unnamed placed images are the usual way semantic meaning gets lost
        if item.kind == ItemKind::Placed && !item.is_named() {
            report.record_unnamed_placed(item);
            continue;
        }

        let prefix = match naming::classify(&item.name, rules) {
            NameClass::Unnamed => continue,
            NameClass::Unknown => {
                report.record_unknown(item);
                continue;
            }
            NameClass::Guide if scope == CheckScope::SemanticOnly => continue,
            NameClass::Guide => rules.guide_prefix.as_str(),
            NameClass::Semantic(prefix) => prefix,
        };

        report.record_named(prefix);
        if !seen.insert(item.name.as_str()) {
            report.record_duplicate(&item.name);
        }

        match check_item(doc, id, rules, scope) {
            Verdict::Skip(SkipReason::CompositeChild) => {
                report.counts.composite_children_skipped += 1;
            }
            Verdict::Skip(_) => {}
            Verdict::Checked {
                prefix,
                guide_axis,
                left,
                top,
            } => {
                if guide_axis.is_some() {
                    report.counts.guide_axis_checks += 1;
                }
                if !left.is_ok() || !top.is_ok() {
                    report.record_off_grid(AlignmentDiagnostic {
                        id,
                        name: item.name.clone(),
                        prefix: prefix.to_string(),
                        kind: item.kind,
                        layer: item.layer.clone(),
                        left: item.bounds.left,
                        top: item.bounds.top,
                        left_status: left,
                        top_status: top,
                        guide_axis,
                    });
                }
            }
        }
    }

    report
}
