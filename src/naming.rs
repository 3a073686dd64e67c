//! Name-based classification of items
//!
//! Structural meaning lives entirely in element names: a semantic prefix
//! (`ICON_`, `COMP_`, ...) tags an element's role, and the guide grammar
//! `<guide-prefix>x<label>` / `<guide-prefix>y<label>` names one grid line.

use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::config::Rules;
use crate::document::{Bounds, Item};

/// Which coordinate a guide fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    /// Vertical line, fixes `left`
    X,
    /// Horizontal line, fixes `top`
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Outcome of classifying a name against a rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass<'r> {
    Unnamed,
    /// Starts with the guide prefix
    Guide,
    /// Matched a semantic prefix
    Semantic(&'r str),
    /// Named, but matches nothing
    Unknown,
}

/// First prefix in table order that `name` starts with
pub fn semantic_prefix<'p>(name: &str, prefixes: &'p [String]) -> Option<&'p str> {
    prefixes
        .iter()
        .map(String::as_str)
        .find(|p| name.starts_with(p))
}

pub fn is_guide_name(name: &str, guide_prefix: &str) -> bool {
    !guide_prefix.is_empty() && name.starts_with(guide_prefix)
}

fn split_guide_name<'n>(name: &'n str, guide_prefix: &str) -> Option<(Axis, &'n str)> {
    let rest = name.strip_prefix(guide_prefix)?;
    if let Some(label) = rest.strip_prefix('x') {
        Some((Axis::X, label))
    } else {
        rest.strip_prefix('y').map(|label| (Axis::Y, label))
    }
}

/// Axis named by a guide, or `None` when neither axis literal matches
pub fn guide_axis(name: &str, guide_prefix: &str) -> Option<Axis> {
    split_guide_name(name, guide_prefix).map(|(axis, _)| axis)
}

/// The suffix after the axis literal, taken verbatim (it may be empty)
pub fn guide_label<'n>(name: &'n str, guide_prefix: &str) -> Option<&'n str> {
    split_guide_name(name, guide_prefix).map(|(_, label)| label)
}

/// Orientation from geometry: a box narrower than it is tall is a vertical
/// line and therefore fixes x.
pub fn infer_axis(bounds: &Bounds) -> Axis {
    if bounds.width().abs() < bounds.height().abs() {
        Axis::X
    } else {
        Axis::Y
    }
}

/// The name wins whenever it parses; geometry decides otherwise.
pub fn resolve_guide_axis(name: &str, bounds: &Bounds, guide_prefix: &str) -> Axis {
    guide_axis(name, guide_prefix).unwrap_or_else(|| infer_axis(bounds))
}

/// Host guide flag, or placement on the configured guide layer
pub fn is_guide_item(item: &Item, rules: &Rules) -> bool {
    item.guide || item.layer == rules.guide_layer
}

pub fn classify<'r>(name: &str, rules: &'r Rules) -> NameClass<'r> {
    if name.is_empty() {
        NameClass::Unnamed
    } else if is_guide_name(name, &rules.guide_prefix) {
        NameClass::Guide
    } else if let Some(prefix) = semantic_prefix(name, &rules.prefixes) {
        NameClass::Semantic(prefix)
    } else {
        NameClass::Unknown
    }
}

/// Per-prefix tallies that keep the prefix table's order.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefixCounts {
    entries: Vec<(String, usize)>,
}

impl PrefixCounts {
    pub fn new<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: prefixes.into_iter().map(|p| (p.into(), 0)).collect(),
        }
    }

    /// Count one more hit, adding the key if it is new
    pub fn increment(&mut self, prefix: &str) {
        self.add(prefix, 1);
    }

    /// Add `n` hits; the key is created even when `n` is zero
    pub fn add(&mut self, prefix: &str, n: usize) {
        match self.entries.iter_mut().find(|(p, _)| p == prefix) {
            Some((_, count)) => *count += n,
            None => self.entries.push((prefix.to_string(), n)),
        }
    }

    pub fn get(&self, prefix: &str) -> usize {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map_or(0, |(_, count)| *count)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(p, c)| (p.as_str(), *c))
    }

    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }
}

impl Serialize for PrefixCounts {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (prefix, count) in &self.entries {
            map.serialize_entry(prefix, count)?;
        }
        map.end()
    }
}
