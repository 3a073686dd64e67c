//! Grid correction: plan against a frozen snapshot, then translate
//!
//! Planning never mutates anything: it records every checked item as it
//! stood in the snapshot and previews the moves. Applying walks the same
//! items again, enclosing groups first, and evaluates each member at the
//! position the host's accepted moves have carried it to.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Rounding, Rules};
use crate::document::{Document, ItemId, ItemKind};
use crate::naming::Axis;

use super::check::{check_item, CheckScope, SkipReason, Verdict};
use super::report::ReportHeader;
use super::{is_on_grid, snap_value, within_tolerance};

/// Errors a host can raise when asked to move an item
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("item {0} does not exist")]
    Missing(ItemId),
    #[error("item or an enclosing group is locked")]
    Locked,
    #[error("layer '{0}' is locked")]
    LayerLocked(String),
}

/// Host-side translation of one item together with everything it contains
pub trait Translate {
    fn translate(&mut self, id: ItemId, dx: f64, dy: f64) -> Result<(), TranslateError>;
}

impl Translate for Document {
    fn translate(&mut self, id: ItemId, dx: f64, dy: f64) -> Result<(), TranslateError> {
        let item = self.get(id).ok_or(TranslateError::Missing(id))?;
        if let Some(layer) = self.layer(&item.layer).filter(|l| l.locked) {
            return Err(TranslateError::LayerLocked(layer.name.clone()));
        }
        if self.is_locked(id) {
            return Err(TranslateError::Locked);
        }
        self.translate_subtree(id, dx, dy);
        Ok(())
    }
}

/// A planned move of one item onto the grid
#[derive(Debug, Clone, PartialEq)]
pub struct Correction {
    pub id: ItemId,
    pub name: String,
    pub prefix: String,
    pub kind: ItemKind,
    pub guide_axis: Option<Axis>,
    pub from_left: f64,
    pub from_top: f64,
    pub to_left: f64,
    pub to_top: f64,
}

impl Correction {
    pub fn dx(&self) -> f64 {
        self.to_left - self.from_left
    }

    pub fn dy(&self) -> f64 {
        self.to_top - self.from_top
    }

    fn line(&self) -> String {
        let mut line = format!(
            "{} | {} | dx: {} | dy: {} | left: {} -> {} | top: {} -> {}",
            self.name,
            self.kind,
            self.dx(),
            self.dy(),
            self.from_left,
            self.to_left,
            self.from_top,
            self.to_top
        );
        if let Some(axis) = self.guide_axis {
            line.push_str(&format!(" | guide-axis: {axis}"));
        }
        line
    }
}

/// A checked item as it stood in the snapshot
#[derive(Debug, Clone, PartialEq)]
struct Candidate {
    id: ItemId,
    name: String,
    prefix: String,
    kind: ItemKind,
    guide_axis: Option<Axis>,
    left: f64,
    top: f64,
    ancestors: Vec<ItemId>,
}

/// Grid parameters a plan was computed with
#[derive(Debug, Clone, Copy, PartialEq)]
struct Snapping {
    unit: f64,
    tolerance: f64,
    rounding: Rounding,
}

impl Candidate {
    /// The move that puts this item on the grid from `(left, top)`, if any.
    ///
    /// Only failing axes are snapped; a guide's unchecked axis is never
    /// touched. Deltas that both fall within tolerance yield nothing.
    fn correction_at(&self, left: f64, top: f64, grid: Snapping) -> Option<Correction> {
        let left_off =
            self.guide_axis != Some(Axis::Y) && !is_on_grid(left, grid.unit, grid.tolerance);
        let top_off =
            self.guide_axis != Some(Axis::X) && !is_on_grid(top, grid.unit, grid.tolerance);
        if !left_off && !top_off {
            return None;
        }

        let correction = Correction {
            id: self.id,
            name: self.name.clone(),
            prefix: self.prefix.clone(),
            kind: self.kind,
            guide_axis: self.guide_axis,
            from_left: left,
            from_top: top,
            to_left: if left_off {
                snap_value(left, grid.unit, grid.rounding)
            } else {
                left
            },
            to_top: if top_off {
                snap_value(top, grid.unit, grid.rounding)
            } else {
                top
            },
        };
        if within_tolerance(correction.dx(), grid.tolerance)
            && within_tolerance(correction.dy(), grid.tolerance)
        {
            return None;
        }
        Some(correction)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionPlan {
    pub document: String,
    pub grid_unit: f64,
    pub tolerance: f64,
    /// Expected moves when every translation succeeds, in document order
    pub corrections: Vec<Correction>,
    pub composite_children_skipped: usize,
    pub guide_axis_checks: usize,
    rounding: Rounding,
    /// Checked items, enclosing groups first
    candidates: Vec<Candidate>,
}

impl CorrectionPlan {
    pub fn is_empty(&self) -> bool {
        self.corrections.is_empty()
    }

    fn snapping(&self) -> Snapping {
        Snapping {
            unit: self.grid_unit,
            tolerance: self.tolerance,
            rounding: self.rounding,
        }
    }
}

/// Walk the candidates, enclosing groups first, evaluating each one at its
/// snapshot position plus the deltas of the enclosing moves `translate`
/// accepted.
fn settle<F>(
    candidates: &[Candidate],
    grid: Snapping,
    mut translate: F,
) -> (Vec<Correction>, Vec<FailedCorrection>)
where
    F: FnMut(&Correction) -> Result<(), TranslateError>,
{
    let mut applied: HashMap<ItemId, (f64, f64)> = HashMap::new();
    let mut moved = Vec::new();
    let mut failed = Vec::new();

    for candidate in candidates {
        let (carry_x, carry_y) = candidate
            .ancestors
            .iter()
            .filter_map(|a| applied.get(a))
            .fold((0.0, 0.0), |(x, y), (dx, dy)| (x + dx, y + dy));
        let Some(correction) =
            candidate.correction_at(candidate.left + carry_x, candidate.top + carry_y, grid)
        else {
            continue;
        };

        match translate(&correction) {
            Ok(()) => {
                applied.insert(correction.id, (correction.dx(), correction.dy()));
                moved.push(correction);
            }
            Err(error) => failed.push(FailedCorrection { correction, error }),
        }
    }

    moved.sort_by_key(|c| c.id);
    failed.sort_by_key(|f| f.correction.id);
    (moved, failed)
}

/// Compute every correction without touching the document.
///
/// An item nested in a group that is itself being moved is evaluated at the
/// position that move carries it to.
pub fn plan_corrections(doc: &Document, rules: &Rules, scope: CheckScope) -> CorrectionPlan {
    let mut plan = CorrectionPlan {
        document: doc.name.clone(),
        grid_unit: rules.grid_unit,
        tolerance: rules.tolerance,
        corrections: Vec::new(),
        composite_children_skipped: 0,
        guide_axis_checks: 0,
        rounding: rules.rounding,
        candidates: Vec::new(),
    };

    let mut order: Vec<(usize, ItemId)> = doc
        .iter()
        .map(|(id, _)| (doc.ancestors(id).count(), id))
        .collect();
    order.sort();

    for (_, id) in order {
        let Some(item) = doc.get(id) else {
            continue;
        };
        let (prefix, guide_axis) = match check_item(doc, id, rules, scope) {
            Verdict::Skip(SkipReason::CompositeChild) => {
                plan.composite_children_skipped += 1;
                continue;
            }
            Verdict::Skip(_) => continue,
            Verdict::Checked {
                prefix, guide_axis, ..
            } => (prefix, guide_axis),
        };
        if guide_axis.is_some() {
            plan.guide_axis_checks += 1;
        }

        plan.candidates.push(Candidate {
            id,
            name: item.name.clone(),
            prefix: prefix.to_string(),
            kind: item.kind,
            guide_axis,
            left: item.bounds.left,
            top: item.bounds.top,
            ancestors: doc.ancestors(id).map(|(a, _)| a).collect(),
        });
    }

    let (corrections, _) = settle(&plan.candidates, plan.snapping(), |_| Ok(()));
    plan.corrections = corrections;
    debug!(corrections = plan.corrections.len(), "planned grid corrections");
    plan
}

/// A correction the host refused
#[derive(Debug, Clone, PartialEq)]
pub struct FailedCorrection {
    pub correction: Correction,
    pub error: TranslateError,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SnapOutcome {
    pub document: String,
    pub grid_unit: f64,
    pub tolerance: f64,
    pub moved: Vec<Correction>,
    pub failed: Vec<FailedCorrection>,
    pub composite_children_skipped: usize,
    pub guide_axis_checks: usize,
}

impl SnapOutcome {
    pub fn header(&self, generated_at: &str) -> ReportHeader {
        ReportHeader {
            title: "Grid Snap Report".to_string(),
            document: self.document.clone(),
            grid_unit: self.grid_unit,
            tolerance: self.tolerance,
            generated_at: generated_at.to_string(),
        }
    }

    pub fn render(&self, generated_at: &str) -> Vec<String> {
        let mut lines = self.header(generated_at).lines();
        lines.push("NOTES:".to_string());
        lines.push("  - Members of composite groups are not moved.".to_string());
        lines.push("  - x-guides snap left only, y-guides snap top only.".to_string());
        lines.push(String::new());

        lines.extend(self.moved.iter().map(Correction::line));
        for failure in &self.failed {
            let c = &failure.correction;
            lines.push(format!("SKIP: {} | {} | reason: {}", c.name, c.kind, failure.error));
        }
        if !self.moved.is_empty() || !self.failed.is_empty() {
            lines.push(String::new());
        }

        lines.push("SUMMARY".to_string());
        lines.push(format!("  Moved items: {}", self.moved.len()));
        lines.push(format!("  Failed translations: {}", self.failed.len()));
        lines.push(format!(
            "  Composite children skipped: {}",
            self.composite_children_skipped
        ));
        lines.push(format!("  Guide axis-only checks: {}", self.guide_axis_checks));
        lines
    }
}

/// Apply a plan through the host.
///
/// Members of a group are re-evaluated against the moves the host actually
/// made, so a refused group move leaves its members to be corrected on their
/// own. A refused translation is recorded and the run carries on.
pub fn apply_corrections<T: Translate + ?Sized>(target: &mut T, plan: CorrectionPlan) -> SnapOutcome {
    let (moved, failed) = settle(&plan.candidates, plan.snapping(), |correction| {
        let result = target.translate(correction.id, correction.dx(), correction.dy());
        match &result {
            Ok(()) => {
                debug!(item = %correction.name, dx = correction.dx(), dy = correction.dy(), "moved");
            }
            Err(error) => {
                warn!(item = %correction.name, %error, "could not move item onto the grid");
            }
        }
        result
    });

    SnapOutcome {
        document: plan.document,
        grid_unit: plan.grid_unit,
        tolerance: plan.tolerance,
        moved,
        failed,
        composite_children_skipped: plan.composite_children_skipped,
        guide_axis_checks: plan.guide_axis_checks,
    }
}
