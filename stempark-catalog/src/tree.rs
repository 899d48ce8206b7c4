//! Path-addressed product variant tree
//!
//! A [`VariantTree`] is a plain value: every operation borrows the current
//! tree and returns the next one. Nodes are shared through `Arc`, and an
//! edit clones only the nodes on the path it touches, so a previous tree
//! stays valid for any reader still holding it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::VariantError;
use crate::field::FieldUpdate;
use crate::node::{LeafData, NodeKind, StagedFile, VariantNode};
use crate::path::VariantPath;
use crate::pricing::{Currency, VariantDefaults};

/// Label used for a depth that has no explicit level label
pub fn fallback_label(depth: usize) -> String {
    format!("Level_{}", depth)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantTree {
    /// Attribute axis name per depth (`level_labels[0]` names depth 1)
    #[serde(default)]
    pub level_labels: Vec<String>,

    #[serde(default)]
    pub nodes: Vec<Arc<VariantNode>>,

    #[serde(skip)]
    defaults: Arc<VariantDefaults>,
}

impl VariantTree {
    pub fn new(level_labels: Vec<String>) -> Self {
        Self {
            level_labels,
            nodes: Vec::new(),
            defaults: Arc::new(VariantDefaults::default()),
        }
    }

    pub fn from_nodes(level_labels: Vec<String>, nodes: Vec<VariantNode>) -> Self {
        Self {
            level_labels,
            nodes: nodes.into_iter().map(Arc::new).collect(),
            defaults: Arc::new(VariantDefaults::default()),
        }
    }

    /// Use `defaults` to seed nodes added from now on
    pub fn with_defaults(mut self, defaults: Arc<VariantDefaults>) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn defaults(&self) -> &VariantDefaults {
        &self.defaults
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Label of a 1-based depth, falling back to `Level_<depth>`
    pub fn level_label(&self, depth: usize) -> String {
        depth
            .checked_sub(1)
            .and_then(|i| self.level_labels.get(i))
            .filter(|label| !label.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| fallback_label(depth))
    }

    /// Deepest level present in the tree (0 when empty)
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Arc<VariantNode>]) -> usize {
            nodes
                .iter()
                .map(|n| 1 + walk(n.children()))
                .max()
                .unwrap_or(0)
        }
        walk(&self.nodes)
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().map(|n| n.leaf_count()).sum()
    }

    /// Node at `path`, if any
    pub fn get(&self, path: &VariantPath) -> Option<&VariantNode> {
        let (first, rest) = path.indices().split_first()?;
        let mut node = self.nodes.get(*first)?;
        for index in rest {
            node = node.children().get(*index)?;
        }
        Some(node.as_ref())
    }

    /// Replace one field of the node at `path`.
    ///
    /// Every ancestor on the path is copied; all other nodes are shared with
    /// `self`. No range checks happen here.
    pub fn update_node_deep(
        &self,
        path: &VariantPath,
        update: FieldUpdate,
    ) -> Result<VariantTree, VariantError> {
        let mut next = self.clone();
        let node = node_mut(&mut next.nodes, path.indices(), path)?;
        match update {
            FieldUpdate::Name(name) => node.name = name,
            update => {
                let leaf = node.leaf_data_mut().ok_or_else(|| VariantError::NotALeaf {
                    path: path.to_string(),
                    field: update.key(),
                })?;
                update.apply_to_leaf(leaf);
            }
        }
        Ok(next)
    }

    /// Append a fresh node to the root list (empty path) or to the children
    /// of the node at `path`. A leaf parent becomes a branch.
    pub fn add_node(&self, path: &VariantPath) -> Result<VariantTree, VariantError> {
        let mut next = self.clone();
        let node = VariantNode::new_leaf(&self.defaults);
        tracing::debug!(parent = %path, id = %node.id, "adding variant node");
        if path.is_root() {
            next.nodes.push(Arc::new(node));
        } else {
            let parent = node_mut(&mut next.nodes, path.indices(), path)?;
            parent.branch_mut().push(Arc::new(node));
        }
        Ok(next)
    }

    /// Remove the node at `path` together with its subtree.
    ///
    /// A branch that loses its last child becomes a blank leaf again.
    pub fn delete_node_deep(&self, path: &VariantPath) -> Result<VariantTree, VariantError> {
        let (parent_path, index) = path.split_last().ok_or(VariantError::EmptyPath)?;
        let mut next = self.clone();

        if parent_path.is_root() {
            if index >= next.nodes.len() {
                return Err(VariantError::NodeNotFound(path.to_string()));
            }
            next.nodes.remove(index);
        } else {
            let parent = node_mut(&mut next.nodes, parent_path.indices(), path)?;
            let now_empty = match &mut parent.kind {
                NodeKind::Branch(children) if index < children.len() => {
                    children.remove(index);
                    children.is_empty()
                }
                _ => return Err(VariantError::NodeNotFound(path.to_string())),
            };
            if now_empty {
                parent.kind = NodeKind::Leaf(LeafData::seeded(&self.defaults));
            }
        }
        tracing::debug!(path = %path, "deleted variant node");
        Ok(next)
    }

    /// Set the label of a 1-based depth; skipped depths get fallback labels
    pub fn set_level_label(
        &self,
        depth: usize,
        label: impl Into<String>,
    ) -> Result<VariantTree, VariantError> {
        if depth == 0 {
            return Err(VariantError::InvalidDepth);
        }
        let mut next = self.clone();
        while next.level_labels.len() < depth {
            let missing = next.level_labels.len() + 1;
            next.level_labels.push(fallback_label(missing));
        }
        next.level_labels[depth - 1] = label.into();
        Ok(next)
    }

    /// Add an unpriced entry; a currency already on the leaf is rejected
    pub fn add_price(
        &self,
        path: &VariantPath,
        region: impl Into<String>,
        currency: Currency,
    ) -> Result<VariantTree, VariantError> {
        self.with_leaf(path, "pricing", |leaf| leaf.pricing.add(region, currency))
    }

    pub fn remove_price(
        &self,
        path: &VariantPath,
        currency: &Currency,
    ) -> Result<VariantTree, VariantError> {
        self.with_leaf(path, "pricing", |leaf| {
            leaf.pricing
                .remove(currency)
                .map(|_| ())
                .ok_or_else(|| VariantError::CurrencyNotFound(currency.to_string()))
        })
    }

    pub fn set_price_amounts(
        &self,
        path: &VariantPath,
        currency: &Currency,
        original_price: impl Into<String>,
        sale_price: impl Into<String>,
    ) -> Result<VariantTree, VariantError> {
        self.with_leaf(path, "pricing", |leaf| {
            let entry = leaf
                .pricing
                .get_mut(currency)
                .ok_or_else(|| VariantError::CurrencyNotFound(currency.to_string()))?;
            entry.original_price = original_price.into();
            entry.sale_price = sale_price.into();
            Ok(())
        })
    }

    /// Stage a file on a leaf for upload with the next submission
    pub fn stage_file(&self, path: &VariantPath, file: StagedFile) -> Result<VariantTree, VariantError> {
        self.with_leaf(path, "media", |leaf| {
            leaf.staged_files.push(file);
            Ok(())
        })
    }

    /// Drop a previously persisted media item from a leaf
    pub fn remove_media(&self, path: &VariantPath, index: usize) -> Result<VariantTree, VariantError> {
        self.with_leaf(path, "media", |leaf| {
            if index >= leaf.media.len() {
                return Err(VariantError::MediaNotFound {
                    path: path.to_string(),
                    index,
                });
            }
            leaf.media.remove(index);
            Ok(())
        })
    }

    /// Leaves in depth-first order with their paths
    pub fn leaves(&self) -> Vec<(VariantPath, &VariantNode)> {
        fn walk<'a>(
            nodes: &'a [Arc<VariantNode>],
            prefix: &VariantPath,
            out: &mut Vec<(VariantPath, &'a VariantNode)>,
        ) {
            for (i, node) in nodes.iter().enumerate() {
                let path = prefix.child(i);
                if node.is_leaf() {
                    out.push((path, node.as_ref()));
                } else {
                    walk(node.children(), &path, out);
                }
            }
        }
        let mut out = Vec::new();
        walk(&self.nodes, &VariantPath::root(), &mut out);
        out
    }

    /// Same labels and shape, with leaves equal on persisted fields
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.level_labels == other.level_labels
            && self.nodes.len() == other.nodes.len()
            && self
                .nodes
                .iter()
                .zip(&other.nodes)
                .all(|(a, b)| a.is_equivalent(b))
    }

    fn with_leaf<F>(
        &self,
        path: &VariantPath,
        field: &'static str,
        edit: F,
    ) -> Result<VariantTree, VariantError>
    where
        F: FnOnce(&mut LeafData) -> Result<(), VariantError>,
    {
        let mut next = self.clone();
        let node = node_mut(&mut next.nodes, path.indices(), path)?;
        let leaf = node
            .leaf_data_mut()
            .ok_or_else(|| VariantError::NotALeaf {
                path: path.to_string(),
                field,
            })?;
        edit(leaf)?;
        Ok(next)
    }
}

/// Walk `indices` from `nodes`, copying each node on the way if it is shared
fn node_mut<'a>(
    nodes: &'a mut Vec<Arc<VariantNode>>,
    indices: &[usize],
    path: &VariantPath,
) -> Result<&'a mut VariantNode, VariantError> {
    let (first, rest) = indices.split_first().ok_or(VariantError::EmptyPath)?;
    let slot = nodes
        .get_mut(*first)
        .ok_or_else(|| VariantError::NodeNotFound(path.to_string()))?;
    let node = Arc::make_mut(slot);
    if rest.is_empty() {
        return Ok(node);
    }
    match &mut node.kind {
        NodeKind::Branch(children) => node_mut(children, rest, path),
        NodeKind::Leaf(_) => Err(VariantError::NodeNotFound(path.to_string())),
    }
}
