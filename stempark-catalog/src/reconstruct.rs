//! Rebuilding the editing tree from persisted flat variants
//!
//! Nodes are merged when their names match exactly at the same depth under
//! the same parent. Names are not trimmed or case-folded, so `"Red"` and
//! `"Red "` become two branches; a warning is logged when that happens.

use std::sync::Arc;

use crate::flatten::FlatVariant;
use crate::node::{LeafData, NodeKind, VariantNode};
use crate::tree::VariantTree;

/// Labels used when a product has no variants yet
pub const DEFAULT_LEVEL_LABELS: [&str; 3] = ["Level 1", "Level 2", "Level 3"];

/// Level labels in the order of the first variant's attributes
///
/// Keys that only appear on later, deeper variants are appended in the order
/// they are first seen.
pub fn level_labels_from(variants: &[FlatVariant]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for key in variants.iter().flat_map(|v| v.attributes.keys()) {
        if !labels.contains(key) {
            labels.push(key.clone());
        }
    }
    if labels.is_empty() {
        return DEFAULT_LEVEL_LABELS.iter().map(|label| label.to_string()).collect();
    }
    labels
}

/// Rebuild a tree from flat variants, walking the levels in depth order
///
/// The attribute key for each depth is resolved with
/// [`VariantTree::level_label`], so missing or blank labels use the same
/// `Level_<depth>` fallback that flattening wrote.
pub fn reconstruct_tree(variants: &[FlatVariant], level_labels: &[String]) -> VariantTree {
    let mut tree = VariantTree::new(level_labels.to_vec());
    let mut roots: Vec<Draft> = Vec::new();

    for (position, variant) in variants.iter().enumerate() {
        let names: Vec<&str> = (1..)
            .map(|depth| tree.level_label(depth))
            .map_while(|key| variant.attributes.get(&key).map(String::as_str))
            .collect();

        let target = match names.split_last() {
            Some((last, parents)) => {
                let mut siblings = &mut roots;
                for name in parents {
                    siblings = &mut child_named(siblings, name).children;
                }
                child_named(siblings, last)
            }
            None => {
                tracing::warn!(
                    position,
                    variant = %variant.name,
                    "variant has no value for the first level, keeping it at the root"
                );
                child_named(&mut roots, &variant.name)
            }
        };

        if target.leaf.is_some() {
            tracing::warn!(
                position,
                variant = %variant.name,
                "duplicate attribute path, later variant replaces the earlier one"
            );
        }
        target.leaf = Some(variant.to_leaf());
    }

    tree.nodes = roots.into_iter().map(|draft| Arc::new(draft.build())).collect();
    tree
}

/// Node under construction; may hold leaf data and children at once until built
#[derive(Default)]
struct Draft {
    name: String,
    children: Vec<Draft>,
    leaf: Option<LeafData>,
}

impl Draft {
    fn build(self) -> VariantNode {
        let kind = if self.children.is_empty() {
            NodeKind::Leaf(self.leaf.unwrap_or_default())
        } else {
            if let Some(leaf) = &self.leaf {
                tracing::warn!(node = %self.name, sku = %leaf.sku, "variant is also a parent level, dropping its leaf fields");
            }
            NodeKind::Branch(
                self.children
                    .into_iter()
                    .map(|child| Arc::new(child.build()))
                    .collect(),
            )
        };
        VariantNode {
            id: uuid::Uuid::new_v4(),
            name: self.name,
            kind,
        }
    }
}

/// Existing child with exactly `name`, or a new one appended
fn child_named<'a>(siblings: &'a mut Vec<Draft>, name: &str) -> &'a mut Draft {
    let position = match siblings.iter().position(|d| d.name == name) {
        Some(position) => position,
        None => {
            if let Some(near) = siblings.iter().find(|d| d.name.trim() == name.trim()) {
                tracing::warn!(
                    existing = %near.name,
                    incoming = %name,
                    "names differ only in surrounding whitespace, creating a separate branch"
                );
            }
            siblings.push(Draft {
                name: name.to_string(),
                ..Draft::default()
            });
            siblings.len() - 1
        }
    };
    &mut siblings[position]
}
