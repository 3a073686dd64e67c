//! Grid alignment checking and correction
//!
//! Every semantic item must sit with its `left` and `top` edges on a multiple
//! of the grid unit. Guides are checked only on the axis they fix, and the
//! constituents of composite groups are exempt because a composite's internal
//! layout is authored independently.

pub mod check;
pub mod report;
pub mod snap;

pub use check::{
    check_item, has_composite_ancestor, validate, AxisStatus, CheckScope, SkipReason, Verdict,
};
pub use report::{AlignmentDiagnostic, ItemSummary, ReportHeader, ValidationCounts, ValidationReport};
pub use snap::{
    apply_corrections, plan_corrections, Correction, CorrectionPlan, FailedCorrection, SnapOutcome,
    Translate, TranslateError,
};

use crate::config::Rounding;

/// Resolution at which distances are compared with the tolerance, so binary
/// representation noise cannot flip a boundary decision.
const DISTANCE_RESOLUTION: f64 = 1e-9;

fn quantize(distance: f64) -> f64 {
    (distance / DISTANCE_RESOLUTION).round() * DISTANCE_RESOLUTION
}

/// Whether `delta` is strictly inside the tolerance band around zero
pub fn within_tolerance(delta: f64, tolerance: f64) -> bool {
    quantize(delta.abs()) < tolerance
}

/// Distance from `value` to the nearest multiple of `unit`.
///
/// The remainder is normalized into `[0, unit)` first, so negative
/// coordinates behave like positive ones.
pub fn grid_distance(value: f64, unit: f64) -> f64 {
    let r = value.rem_euclid(unit);
    r.min(unit - r)
}

/// Whether `value` lies within `tolerance` of a grid multiple.
///
/// The band is exclusive: a distance equal to the tolerance is off grid.
/// Checkers that compare with `<=` accept `3.26` at tolerance 0.01 on a 3.25
/// grid, this one reports it.
pub fn is_on_grid(value: f64, unit: f64, tolerance: f64) -> bool {
    within_tolerance(grid_distance(value, unit), tolerance)
}

/// Nearest multiple of `unit`, ties broken by `rounding`
pub fn snap_value(value: f64, unit: f64, rounding: Rounding) -> f64 {
    rounding.apply(value / unit) * unit
}
