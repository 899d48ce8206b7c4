use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;
use crate::node::{Dimensions, LeafData, MediaRef, StagedFile, VariantNode};
use crate::pricing::PriceList;
use crate::tree::VariantTree;

/// Separator between level names in a flattened variant name
pub const NAME_SEPARATOR: &str = " / ";

/// Multipart field prefix for files staged on the n-th flattened variant
pub const VARIANT_MEDIA_FIELD_PREFIX: &str = "variantMedia_";

/// One sellable variant as persisted by the product store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatVariant {
    /// Level names from root to leaf, joined with `" / "`
    #[serde(default)]
    pub name: String,

    /// Level label → node name, in depth order
    #[serde(default)]
    pub attributes: IndexMap<String, String>,

    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub barcode: String,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub pricing: PriceList,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub dimensions: Dimensions,
    #[serde(default)]
    pub media: Vec<MediaRef>,
}

impl FlatVariant {
    fn from_leaf(name: String, attributes: IndexMap<String, String>, leaf: &LeafData) -> Self {
        Self {
            name,
            attributes,
            sku: leaf.sku.clone(),
            barcode: leaf.barcode.clone(),
            weight: leaf.weight,
            pricing: leaf.pricing.clone(),
            inventory: leaf.inventory,
            dimensions: leaf.dimensions,
            media: leaf.media.clone(),
        }
    }

    /// Leaf fields carried back into a tree node
    pub fn to_leaf(&self) -> LeafData {
        LeafData {
            sku: self.sku.clone(),
            barcode: self.barcode.clone(),
            weight: self.weight,
            pricing: self.pricing.clone(),
            inventory: self.inventory,
            dimensions: self.dimensions,
            media: self.media.clone(),
            staged_files: Vec::new(),
        }
    }
}

/// A staged file bound to the flattened variant it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedUpload {
    /// Position of the owning variant in the flattened list
    pub variant_index: usize,
    pub file: StagedFile,
}

impl StagedUpload {
    /// Multipart field name, e.g. `variantMedia_3`
    pub fn field_name(&self) -> String {
        media_field_name(self.variant_index)
    }
}

pub fn media_field_name(variant_index: usize) -> String {
    format!("{}{}", VARIANT_MEDIA_FIELD_PREFIX, variant_index)
}

/// Variant index encoded in a `variantMedia_<index>` field name
pub fn parse_media_field(field: &str) -> Option<usize> {
    field
        .strip_prefix(VARIANT_MEDIA_FIELD_PREFIX)
        .and_then(|index| index.parse().ok())
}

/// Everything a form submit sends: the flat variants and their new files
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub variants: Vec<FlatVariant>,
    pub uploads: Vec<StagedUpload>,
}

impl VariantTree {
    /// One record per leaf, depth-first in tree order
    pub fn flatten(&self) -> Vec<FlatVariant> {
        let mut out = Vec::with_capacity(self.leaf_count());
        self.walk_leaves(&mut |variant, _| out.push(variant));
        out
    }

    /// Flattened variants plus the staged files keyed by variant position
    pub fn to_submission(&self) -> Submission {
        let mut variants = Vec::with_capacity(self.leaf_count());
        let mut uploads = Vec::new();
        self.walk_leaves(&mut |variant, leaf| {
            let variant_index = variants.len();
            uploads.extend(leaf.staged_files.iter().cloned().map(|file| StagedUpload {
                variant_index,
                file,
            }));
            variants.push(variant);
        });
        Submission { variants, uploads }
    }

    fn walk_leaves(&self, visit: &mut dyn FnMut(FlatVariant, &LeafData)) {
        let mut names = Vec::new();
        let mut attributes = IndexMap::new();
        walk(self, &self.nodes, 1, &mut names, &mut attributes, visit);
    }
}

fn walk<'a>(
    tree: &VariantTree,
    nodes: &'a [Arc<VariantNode>],
    depth: usize,
    names: &mut Vec<&'a str>,
    attributes: &mut IndexMap<String, String>,
    visit: &mut dyn FnMut(FlatVariant, &LeafData),
) {
    let label = tree.level_label(depth);
    for node in nodes {
        names.push(&node.name);
        let previous = attributes.insert(label.clone(), node.name.clone());

        match node.leaf_data() {
            Some(leaf) => {
                let variant = FlatVariant::from_leaf(names.join(NAME_SEPARATOR), attributes.clone(), leaf);
                visit(variant, leaf);
            }
            None => walk(tree, node.children(), depth + 1, names, attributes, visit),
        }

        // Undo this level before visiting the next sibling
        match previous {
            Some(value) => {
                attributes.insert(label.clone(), value);
            }
            None => {
                attributes.shift_remove(&label);
            }
        }
        names.pop();
    }
}
