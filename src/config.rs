//! Naming and grid rules shared by every stage
//!
//! A [`Rules`] value is immutable for the duration of a run and is passed
//! explicitly into each component, so several rule sets can coexist in one
//! process (e.g. one per document family).

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or validating rules
#[derive(Error, Debug)]
pub enum RulesError {
    #[error("Failed to read rules file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse rules TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("invalid rules: {field} {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl RulesError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// How rows of the cell grid are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowLabels {
    /// "1", "2", ... from the top
    #[default]
    Ordinal,
    /// The label of the row's upper guide
    Guide,
}

/// Tie-break used when snapping a coordinate to the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rounding {
    #[default]
    HalfAwayFromZero,
    HalfEven,
}

impl Rounding {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            Rounding::HalfAwayFromZero => value.round(),
            Rounding::HalfEven => value.round_ties_even(),
        }
    }
}

/// Key used to recognise composite children at the top level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DedupKey {
    /// Snapshot item identity; unrelated items sharing a name are both kept
    #[default]
    Identity,
    /// Item name. Any unrelated item reusing a child's name is suppressed.
    Name,
}

/// Configuration for classification, grid derivation and alignment
#[derive(Debug, Clone, PartialEq)]
pub struct Rules {
    /// Nominal grid spacing
    pub grid_unit: f64,

    /// Slack allowed when testing alignment to the grid unit
    pub tolerance: f64,

    /// Semantic prefixes in match order (first match wins)
    pub prefixes: Vec<String>,

    /// The prefix that marks groups whose members are exported as children
    pub composite_prefix: String,

    /// Prefix of guide names, followed by `x` or `y` and a label
    pub guide_prefix: String,

    /// Layer whose items count as guides even without the host flag
    pub guide_layer: String,

    pub row_labels: RowLabels,

    pub rounding: Rounding,

    pub dedup: DedupKey,

    /// Prefix order of the run signature's count fields
    pub signature_order: Vec<String>,
}

pub const DEFAULT_PREFIXES: [&str; 6] = ["ICON_", "COMP_", "LABEL_", "SHAPE_", "AREA_", "BOUND_"];

/// Signature field order shared with earlier exports of the same documents
pub const DEFAULT_SIGNATURE_ORDER: [&str; 6] =
    ["ICON_", "COMP_", "AREA_", "BOUND_", "LABEL_", "SHAPE_"];

impl Default for Rules {
    fn default() -> Self {
        Self {
            grid_unit: 3.25,
            tolerance: 0.01,
            prefixes: DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect(),
            composite_prefix: "COMP_".to_string(),
            guide_prefix: "GUIDE_".to_string(),
            guide_layer: "Guides".to_string(),
            row_labels: RowLabels::default(),
            rounding: Rounding::default(),
            dedup: DedupKey::default(),
            signature_order: DEFAULT_SIGNATURE_ORDER.iter().map(|p| p.to_string()).collect(),
        }
    }
}

/// TOML structure for deserializing rules; every key is optional
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct TomlRules {
    grid_unit: Option<f64>,
    tolerance: Option<f64>,
    prefixes: Option<Vec<String>>,
    composite_prefix: Option<String>,
    guide_prefix: Option<String>,
    guide_layer: Option<String>,
    row_labels: Option<RowLabels>,
    rounding: Option<Rounding>,
    dedup: Option<DedupKey>,
    signature_order: Option<Vec<String>>,
}

impl Rules {
    /// Create rules with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load rules from a TOML string, falling back to defaults per key
    pub fn from_str(content: &str) -> Result<Self, RulesError> {
        let parsed: TomlRules = toml::from_str(content)?;
        let defaults = Self::default();

        let rules = Rules {
            grid_unit: parsed.grid_unit.unwrap_or(defaults.grid_unit),
            tolerance: parsed.tolerance.unwrap_or(defaults.tolerance),
            prefixes: parsed.prefixes.unwrap_or(defaults.prefixes),
            composite_prefix: parsed.composite_prefix.unwrap_or(defaults.composite_prefix),
            guide_prefix: parsed.guide_prefix.unwrap_or(defaults.guide_prefix),
            guide_layer: parsed.guide_layer.unwrap_or(defaults.guide_layer),
            row_labels: parsed.row_labels.unwrap_or(defaults.row_labels),
            rounding: parsed.rounding.unwrap_or(defaults.rounding),
            dedup: parsed.dedup.unwrap_or(defaults.dedup),
            signature_order: parsed.signature_order.unwrap_or(defaults.signature_order),
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Reject rule sets the algorithms cannot work with
    pub fn validate(&self) -> Result<(), RulesError> {
        if !self.grid_unit.is_finite() || self.grid_unit <= 0.0 {
            return Err(RulesError::invalid("grid-unit", "must be a positive number"));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(RulesError::invalid("tolerance", "must be a positive number"));
        }
        if self.tolerance >= self.grid_unit / 2.0 {
            return Err(RulesError::invalid(
                "tolerance",
                format!("must be below half the grid unit ({})", self.grid_unit / 2.0),
            ));
        }
        if self.prefixes.is_empty() {
            return Err(RulesError::invalid("prefixes", "must not be empty"));
        }
        if self.prefixes.iter().any(|p| p.is_empty()) {
            return Err(RulesError::invalid("prefixes", "must not contain an empty prefix"));
        }
        if !self.prefixes.contains(&self.composite_prefix) {
            return Err(RulesError::invalid(
                "composite-prefix",
                format!("'{}' is not in the prefix table", self.composite_prefix),
            ));
        }
        if self.guide_prefix.is_empty() {
            return Err(RulesError::invalid("guide-prefix", "must not be empty"));
        }
        if self.prefixes.contains(&self.guide_prefix) {
            return Err(RulesError::invalid(
                "guide-prefix",
                format!("'{}' must not be a semantic prefix", self.guide_prefix),
            ));
        }
        Ok(())
    }

    pub fn with_grid_unit(mut self, unit: f64) -> Self {
        self.grid_unit = unit;
        self
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Replace the semantic prefix table
    pub fn with_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_composite_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.composite_prefix = prefix.into();
        self
    }

    pub fn with_guide_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.guide_prefix = prefix.into();
        self
    }

    pub fn with_guide_layer(mut self, layer: impl Into<String>) -> Self {
        self.guide_layer = layer.into();
        self
    }

    pub fn with_row_labels(mut self, row_labels: RowLabels) -> Self {
        self.row_labels = row_labels;
        self
    }

    pub fn with_rounding(mut self, rounding: Rounding) -> Self {
        self.rounding = rounding;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupKey) -> Self {
        self.dedup = dedup;
        self
    }

    /// Replace the signature field order
    pub fn with_signature_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature_order = order.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_composite_prefix(&self, prefix: &str) -> bool {
        prefix == self.composite_prefix
    }

    /// Prefixes in signature order.
    ///
    /// The configured order applies only while it lists exactly the prefix
    /// table; a custom table without a matching order falls back to table
    /// order.
    pub fn signature_prefixes(&self) -> Vec<&str> {
        let covers_table = self.signature_order.len() == self.prefixes.len()
            && self.prefixes.iter().all(|p| self.signature_order.contains(p));
        let order = if covers_table {
            &self.signature_order
        } else {
            &self.prefixes
        };
        order.iter().map(String::as_str).collect()
    }
}
