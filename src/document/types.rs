//! Core types for the document snapshot

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::DocumentError;

/// Stable index of an item within its [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub usize);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// An axis-aligned box in page coordinates.
///
/// The vertical axis grows upward, so `top > bottom` for any box with a
/// positive height. Serialized boxes carry derived `width` and `height`
/// fields; those are ignored when reading a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(into = "BoundsRecord")]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

#[derive(Serialize)]
struct BoundsRecord {
    left: f64,
    top: f64,
    right: f64,
    bottom: f64,
    width: f64,
    height: f64,
}

impl From<Bounds> for BoundsRecord {
    fn from(b: Bounds) -> Self {
        Self {
            left: b.left,
            top: b.top,
            right: b.right,
            bottom: b.bottom,
            width: b.width(),
            height: b.height(),
        }
    }
}

impl Bounds {
    pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    /// The same box moved by `(dx, dy)`
    pub fn translated(&self, dx: f64, dy: f64) -> Bounds {
        Bounds::new(self.left + dx, self.top + dy, self.right + dx, self.bottom + dy)
    }
}

/// Host element kind, as far as the grid rules care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Path,
    Group,
    Placed,
    #[default]
    Other,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Path => write!(f, "path"),
            ItemKind::Group => write!(f, "group"),
            ItemKind::Placed => write!(f, "placed"),
            ItemKind::Other => write!(f, "other"),
        }
    }
}

fn unknown_layer() -> String {
    "(unknown)".to_string()
}

/// One drawable element of the snapshot
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Item {
    /// Display name; empty when the element is unnamed
    #[serde(default)]
    pub name: String,
    pub bounds: Bounds,
    #[serde(default = "unknown_layer")]
    pub layer: String,
    #[serde(default)]
    pub kind: ItemKind,
    /// Enclosing group, `None` at the document root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<ItemId>,
    /// Host-side guide flag
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub guide: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub locked: bool,
}

impl Item {
    pub fn new(name: impl Into<String>, kind: ItemKind, bounds: Bounds) -> Self {
        Self {
            name: name.into(),
            bounds,
            layer: unknown_layer(),
            kind,
            parent: None,
            guide: false,
            locked: false,
        }
    }

    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    pub fn with_parent(mut self, parent: ItemId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Mark the item as a host guide
    pub fn as_guide(mut self) -> Self {
        self.guide = true;
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

/// An artboard of the document
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Artboard {
    pub name: String,
    pub rect: Bounds,
}

/// A top-level document layer
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Layer {
    pub name: String,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_true")]
    pub printable: bool,
}

fn default_true() -> bool {
    true
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visible: true,
            locked: false,
            printable: true,
        }
    }
}

/// Flattened, arena-backed document snapshot
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Document {
    pub name: String,
    #[serde(default)]
    pub artboards: Vec<Artboard>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl Document {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Append an item and return its id
    pub fn push(&mut self, item: Item) -> ItemId {
        self.items.push(item);
        ItemId(self.items.len() - 1)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in document order
    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Item)> {
        self.items.iter().enumerate().map(|(i, item)| (ItemId(i), item))
    }

    /// Immediate members of a group, in document order
    pub fn children(&self, group: ItemId) -> impl Iterator<Item = (ItemId, &Item)> {
        self.iter()
            .filter(move |(_, item)| item.parent == Some(group))
    }

    /// Walk from the parent of `id` up to the document root
    pub fn ancestors(&self, id: ItemId) -> Ancestors<'_> {
        Ancestors {
            doc: self,
            next: self.get(id).and_then(|item| item.parent),
            remaining: self.items.len(),
        }
    }

    pub fn is_descendant_of(&self, id: ItemId, ancestor: ItemId) -> bool {
        self.ancestors(id).any(|(a, _)| a == ancestor)
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Check that geometry is finite and the parent arena is well formed.
    pub fn validate(&self) -> Result<(), DocumentError> {
        for (index, artboard) in self.artboards.iter().enumerate() {
            if !artboard.rect.is_finite() {
                return Err(DocumentError::NonFiniteArtboard { index });
            }
        }

        for (index, item) in self.items.iter().enumerate() {
            if !item.bounds.is_finite() {
                return Err(DocumentError::NonFiniteBounds {
                    index,
                    name: item.name.clone(),
                });
            }
            if let Some(ItemId(parent)) = item.parent {
                let parent_item = self
                    .items
                    .get(parent)
                    .ok_or(DocumentError::DanglingParent { index, parent })?;
                if parent_item.kind != ItemKind::Group {
                    return Err(DocumentError::ParentNotGroup { index, parent });
                }
            }
        }

        for index in 0..self.items.len() {
            let mut current = self.items[index].parent;
            let mut steps = 0;
            while let Some(ItemId(p)) = current {
                steps += 1;
                if p == index || steps > self.items.len() {
                    return Err(DocumentError::ParentCycle { index });
                }
                current = self.items[p].parent;
            }
        }

        Ok(())
    }

    /// Whether the item, one of its ancestors, or its layer is locked
    pub fn is_locked(&self, id: ItemId) -> bool {
        let Some(item) = self.get(id) else {
            return false;
        };
        item.locked
            || self.ancestors(id).any(|(_, a)| a.locked)
            || self.layer(&item.layer).is_some_and(|l| l.locked)
    }

    /// Move an item and everything it contains
    pub fn translate_subtree(&mut self, id: ItemId, dx: f64, dy: f64) {
        let targets: Vec<usize> = (0..self.items.len())
            .filter(|&i| i == id.0 || self.is_descendant_of(ItemId(i), id))
            .collect();
        for i in targets {
            let item = &mut self.items[i];
            item.bounds = item.bounds.translated(dx, dy);
        }
    }
}

/// Iterator over the ancestors of an item, nearest first.
///
/// Bounded by the arena size so a malformed parent cycle cannot spin forever.
pub struct Ancestors<'a> {
    doc: &'a Document,
    next: Option<ItemId>,
    remaining: usize,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (ItemId, &'a Item);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.next?;
        let item = self.doc.get(id)?;
        self.remaining -= 1;
        self.next = item.parent;
        Some((id, item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(name: &str, l: f64, t: f64, r: f64, b: f64) -> Item {
        Item::new(name, ItemKind::Path, Bounds::new(l, t, r, b))
    }

    fn group(name: &str) -> Item {
        Item::new(name, ItemKind::Group, Bounds::new(0.0, 10.0, 10.0, 0.0))
    }

    #[test]
    fn test_bounds_dimensions() {
        let b = Bounds::new(5.0, 95.0, 15.0, 85.0);
        assert_eq!(b.width(), 10.0);
        assert_eq!(b.height(), 10.0);
    }

    #[test]
    fn test_children_are_immediate_only() {
        let mut doc = Document::new("doc");
        let outer = doc.push(group("COMP_outer"));
        let inner = doc.push(group("wrapper").with_parent(outer));
        let direct = doc.push(rect("ICON_a", 0.0, 1.0, 1.0, 0.0).with_parent(outer));
        doc.push(rect("ICON_b", 0.0, 1.0, 1.0, 0.0).with_parent(inner));

        let ids: Vec<ItemId> = doc.children(outer).map(|(id, _)| id).collect();
        assert_eq!(ids, vec![inner, direct]);
    }

    #[test]
    fn test_ancestors_walk_to_root() {
        let mut doc = Document::new("doc");
        let a = doc.push(group("a"));
        let b = doc.push(group("b").with_parent(a));
        let c = doc.push(rect("c", 0.0, 1.0, 1.0, 0.0).with_parent(b));

        let chain: Vec<ItemId> = doc.ancestors(c).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![b, a]);
        assert!(doc.is_descendant_of(c, a));
        assert!(!doc.is_descendant_of(a, c));
    }

    #[test]
    fn test_validate_rejects_non_finite_bounds() {
        let mut doc = Document::new("doc");
        doc.push(rect("ICON_nan", f64::NAN, 1.0, 1.0, 0.0));
        assert_eq!(
            doc.validate(),
            Err(DocumentError::NonFiniteBounds {
                index: 0,
                name: "ICON_nan".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_dangling_and_non_group_parents() {
        let mut doc = Document::new("doc");
        doc.push(rect("x", 0.0, 1.0, 1.0, 0.0).with_parent(ItemId(7)));
        assert_eq!(
            doc.validate(),
            Err(DocumentError::DanglingParent { index: 0, parent: 7 })
        );

        let mut doc = Document::new("doc");
        let path = doc.push(rect("p", 0.0, 1.0, 1.0, 0.0));
        doc.push(rect("x", 0.0, 1.0, 1.0, 0.0).with_parent(path));
        assert_eq!(
            doc.validate(),
            Err(DocumentError::ParentNotGroup { index: 1, parent: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_cycles() {
        let mut doc = Document::new("doc");
        doc.push(group("a").with_parent(ItemId(1)));
        doc.push(group("b").with_parent(ItemId(0)));
        assert_eq!(doc.validate(), Err(DocumentError::ParentCycle { index: 0 }));
        // The walk still terminates on the malformed arena
        assert_eq!(doc.ancestors(ItemId(0)).count(), 2);
    }

    #[test]
    fn test_translate_subtree_moves_descendants() {
        let mut doc = Document::new("doc");
        let g = doc.push(group("COMP_card"));
        let child = doc.push(rect("ICON_a", 1.0, 5.0, 2.0, 4.0).with_parent(g));
        let other = doc.push(rect("ICON_b", 1.0, 5.0, 2.0, 4.0));

        doc.translate_subtree(g, 0.5, -1.0);

        assert_eq!(doc.get(g).unwrap().bounds, Bounds::new(0.5, 9.0, 10.5, -1.0));
        assert_eq!(doc.get(child).unwrap().bounds, Bounds::new(1.5, 4.0, 2.5, 3.0));
        assert_eq!(doc.get(other).unwrap().bounds, Bounds::new(1.0, 5.0, 2.0, 4.0));
    }

    #[test]
    fn test_is_locked_through_layer_and_ancestor() {
        let mut doc = Document::new("doc");
        let mut locked_layer = Layer::new("Frozen");
        locked_layer.locked = true;
        doc.layers.push(locked_layer);
        doc.layers.push(Layer::new("Art"));

        let g = doc.push(group("COMP_g").with_layer("Art").locked());
        let child = doc.push(rect("ICON_a", 0.0, 1.0, 1.0, 0.0).with_layer("Art").with_parent(g));
        let frozen = doc.push(rect("ICON_b", 0.0, 1.0, 1.0, 0.0).with_layer("Frozen"));
        let free = doc.push(rect("ICON_c", 0.0, 1.0, 1.0, 0.0).with_layer("Art"));

        assert!(doc.is_locked(child));
        assert!(doc.is_locked(frozen));
        assert!(!doc.is_locked(free));
    }
}
