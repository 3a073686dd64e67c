//! Composite hierarchy extraction and top-level de-duplication
//!
//! Runs as two pure stages: [`extract_composites`] builds every composite
//! entry together with the set of items it consumed, then
//! [`top_level_entries`] emits the document-ordered list minus those items.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::config::{DedupKey, Rules};
use crate::document::{Document, Item, ItemId, ItemKind};
use crate::grid::CellGrid;
use crate::naming;

use super::{SemanticEntry, SemanticRecord};

/// Items already attached to a composite as children
#[derive(Debug, Clone, Default)]
pub struct Consumed {
    key: DedupKey,
    ids: HashSet<ItemId>,
    names: HashSet<String>,
}

impl Consumed {
    pub fn new(key: DedupKey) -> Self {
        Self {
            key,
            ..Self::default()
        }
    }

    pub fn insert(&mut self, id: ItemId, name: &str) {
        self.ids.insert(id);
        self.names.insert(name.to_string());
    }

    /// Whether an item counts as consumed under the configured key.
    ///
    /// With [`DedupKey::Name`] an unrelated item that merely shares a child's
    /// name is reported as consumed too.
    pub fn contains(&self, id: ItemId, name: &str) -> bool {
        match self.key {
            DedupKey::Identity => self.ids.contains(&id),
            DedupKey::Name => self.names.contains(name),
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Output of the composite stage
#[derive(Debug, Clone, Default)]
pub struct Composites {
    pub entries: BTreeMap<ItemId, SemanticEntry>,
    pub consumed: Consumed,
}

/// Named, non-guide items that match a semantic prefix, in document order
pub fn semantic_items<'a>(
    doc: &'a Document,
    rules: &'a Rules,
) -> impl Iterator<Item = (ItemId, &'a Item, &'a str)> + 'a {
    doc.iter().filter_map(move |(id, item)| {
        if !item.is_named()
            || naming::is_guide_name(&item.name, &rules.guide_prefix)
            || naming::is_guide_item(item, rules)
        {
            return None;
        }
        naming::semantic_prefix(&item.name, &rules.prefixes).map(|prefix| (id, item, prefix))
    })
}

/// Semantic children among the immediate members of `group`.
///
/// Nested composites are left out silently; they appear as top-level
/// entries of their own instead.
pub fn extract_children(
    doc: &Document,
    group: ItemId,
    rules: &Rules,
    grid: &CellGrid,
) -> Vec<(ItemId, SemanticRecord)> {
    doc.children(group)
        .filter(|(_, child)| child.is_named())
        .filter(|(_, child)| !naming::is_guide_name(&child.name, &rules.guide_prefix))
        .filter_map(|(id, child)| {
            let prefix = naming::semantic_prefix(&child.name, &rules.prefixes)?;
            if rules.is_composite_prefix(prefix) {
                return None;
            }
            Some((id, SemanticRecord::new(child, prefix, grid)))
        })
        .collect()
}

/// Build all composite entries and record which items they consumed
pub fn extract_composites(doc: &Document, rules: &Rules, grid: &CellGrid) -> Composites {
    let mut composites = Composites {
        entries: BTreeMap::new(),
        consumed: Consumed::new(rules.dedup),
    };

    for (id, item, prefix) in semantic_items(doc, rules) {
        if !rules.is_composite_prefix(prefix) {
            continue;
        }
        let children = if item.kind == ItemKind::Group {
            extract_children(doc, id, rules, grid)
        } else {
            Vec::new()
        };

        let mut records = Vec::with_capacity(children.len());
        for (child_id, record) in children {
            composites.consumed.insert(child_id, &record.name);
            records.push(record);
        }
        composites.entries.insert(
            id,
            SemanticEntry::composite(SemanticRecord::new(item, prefix, grid), records),
        );
    }

    debug!(
        composites = composites.entries.len(),
        children = composites.consumed.len(),
        "extracted composites"
    );
    composites
}

/// Document-ordered top-level entries: every composite plus every atomic
/// item that no composite consumed.
pub fn top_level_entries(
    doc: &Document,
    rules: &Rules,
    grid: &CellGrid,
    composites: Composites,
) -> Vec<SemanticEntry> {
    let Composites {
        mut entries,
        consumed,
    } = composites;
    let mut out = Vec::new();

    for (id, item, prefix) in semantic_items(doc, rules) {
        if rules.is_composite_prefix(prefix) {
            if let Some(entry) = entries.remove(&id) {
                out.push(entry);
            }
        } else if !consumed.contains(id, &item.name) {
            out.push(SemanticEntry::atomic(SemanticRecord::new(item, prefix, grid)));
        }
    }
    out
}
