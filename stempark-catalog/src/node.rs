use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::inventory::Inventory;
use crate::pricing::{PriceList, VariantDefaults};

/// Kind of a persisted media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Guess the kind from a MIME type, falling back to the file extension
    pub fn detect(content_type: Option<&str>, file_name: &str) -> Self {
        if let Some(content_type) = content_type {
            if content_type.starts_with("video/") {
                return MediaKind::Video;
            }
            if content_type.starts_with("image/") {
                return MediaKind::Image;
            }
        }
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "mp4" | "webm" | "mov" | "mkv" | "avi" => MediaKind::Video,
            _ => MediaKind::Image,
        }
    }
}

/// Media already uploaded to the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// File staged on a leaf, uploaded on the next submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl StagedFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            data,
        }
    }

    pub fn kind(&self) -> MediaKind {
        MediaKind::detect(self.content_type.as_deref(), &self.file_name)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default)]
    pub length: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// Sellable-unit data carried only by leaf nodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeafData {
    pub sku: String,
    pub barcode: String,
    pub weight: f64,
    pub pricing: PriceList,
    pub inventory: Inventory,
    pub dimensions: Dimensions,
    pub media: Vec<MediaRef>,
    #[serde(skip)]
    pub staged_files: Vec<StagedFile>,
}

impl LeafData {
    /// Blank leaf seeded with the configured pricing and threshold
    pub fn seeded(defaults: &VariantDefaults) -> Self {
        Self {
            pricing: defaults.pricing.clone(),
            inventory: Inventory::with_threshold(defaults.low_stock_threshold),
            ..Self::default()
        }
    }

    /// Equality over persisted fields; staged files are ignored
    pub fn same_persisted(&self, other: &Self) -> bool {
        self.sku == other.sku
            && self.barcode == other.barcode
            && self.weight == other.weight
            && self.pricing == other.pricing
            && self.inventory == other.inventory
            && self.dimensions == other.dimensions
            && self.media == other.media
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Attribute value with further options below it
    Branch(Vec<Arc<VariantNode>>),
    /// Sellable configuration
    Leaf(LeafData),
}

/// One option value in a product configuration tree (e.g. "Red" under Color)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "NodeDocument", into = "NodeDocument")]
pub struct VariantNode {
    pub id: Uuid,
    pub name: String,
    pub kind: NodeKind,
}

impl VariantNode {
    /// Fresh, unnamed leaf
    pub fn new_leaf(defaults: &VariantDefaults) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            kind: NodeKind::Leaf(LeafData::seeded(defaults)),
        }
    }

    pub fn leaf(name: impl Into<String>, data: LeafData) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: NodeKind::Leaf(data),
        }
    }

    pub fn branch(name: impl Into<String>, children: Vec<VariantNode>) -> Self {
        let mut node = Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind: NodeKind::Branch(children.into_iter().map(Arc::new).collect()),
        };
        node.normalize();
        node
    }

    pub fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    pub fn children(&self) -> &[Arc<VariantNode>] {
        match &self.kind {
            NodeKind::Branch(children) => children,
            NodeKind::Leaf(_) => &[],
        }
    }

    pub fn leaf_data(&self) -> Option<&LeafData> {
        match &self.kind {
            NodeKind::Leaf(data) => Some(data),
            NodeKind::Branch(_) => None,
        }
    }

    pub fn leaf_data_mut(&mut self) -> Option<&mut LeafData> {
        match &mut self.kind {
            NodeKind::Leaf(data) => Some(data),
            NodeKind::Branch(_) => None,
        }
    }

    /// Children list, turning a leaf into an empty branch first.
    ///
    /// Leaf data is dropped; callers push a child immediately afterwards.
    pub(crate) fn branch_mut(&mut self) -> &mut Vec<Arc<VariantNode>> {
        if let NodeKind::Leaf(data) = &self.kind {
            if !data.sku.is_empty() {
                tracing::debug!(node = %self.name, sku = %data.sku, "leaf gained children, dropping its sellable data");
            }
            self.kind = NodeKind::Branch(Vec::new());
        }
        match &mut self.kind {
            NodeKind::Branch(children) => children,
            NodeKind::Leaf(_) => unreachable!("leaf was converted to a branch above"),
        }
    }

    /// An empty branch is a leaf; give it blank leaf data
    fn normalize(&mut self) {
        if matches!(&self.kind, NodeKind::Branch(children) if children.is_empty()) {
            self.kind = NodeKind::Leaf(LeafData::default());
        }
    }

    /// Structural equality ignoring ids and staged files
    pub fn is_equivalent(&self, other: &Self) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.kind, &other.kind) {
            (NodeKind::Leaf(a), NodeKind::Leaf(b)) => a.same_persisted(b),
            (NodeKind::Branch(a), NodeKind::Branch(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.is_equivalent(y))
            }
            _ => false,
        }
    }

    /// Number of leaves at or below this node
    pub fn leaf_count(&self) -> usize {
        match &self.kind {
            NodeKind::Leaf(_) => 1,
            NodeKind::Branch(children) => children.iter().map(|c| c.leaf_count()).sum(),
        }
    }
}

/// Wire shape of a node: leaf fields appear only when `children` is empty
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDocument {
    #[serde(default = "Uuid::new_v4")]
    id: Uuid,
    #[serde(default)]
    name: String,
    #[serde(default)]
    children: Vec<VariantNode>,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    leaf: Option<LeafData>,
}

impl From<NodeDocument> for VariantNode {
    fn from(doc: NodeDocument) -> Self {
        let kind = if doc.children.is_empty() {
            NodeKind::Leaf(doc.leaf.unwrap_or_default())
        } else {
            NodeKind::Branch(doc.children.into_iter().map(Arc::new).collect())
        };
        Self {
            id: doc.id,
            name: doc.name,
            kind,
        }
    }
}

impl From<VariantNode> for NodeDocument {
    fn from(node: VariantNode) -> Self {
        let (children, leaf) = match node.kind {
            NodeKind::Branch(children) => (
                children.into_iter().map(Arc::unwrap_or_clone).collect(),
                None,
            ),
            NodeKind::Leaf(data) => (Vec::new(), Some(data)),
        };
        Self {
            id: node.id,
            name: node.name,
            children,
            leaf,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_leaf_detection_by_children() {
        let leaf = VariantNode::leaf("Large", LeafData::default());
        assert!(leaf.is_leaf());

        let branch = VariantNode::branch("Red", vec![leaf.clone()]);
        assert!(!branch.is_leaf());
        assert!(branch.leaf_data().is_none());
        assert_eq!(branch.leaf_count(), 1);

        let empty = VariantNode::branch("Blue", vec![]);
        assert!(empty.is_leaf());
    }

    #[test]
    fn test_wire_shape() {
        let mut data = LeafData::default();
        data.sku = "R-L-01".to_string();
        let tree = VariantNode::branch("Red", vec![VariantNode::leaf("Large", data)]);

        let value = serde_json::to_value(&tree).unwrap();
        assert_eq!(value["name"], "Red");
        assert!(value.get("sku").is_none());
        assert_eq!(value["children"][0]["sku"], "R-L-01");
        assert_eq!(value["children"][0]["inventory"]["lowStockThreshold"], 5);
        assert_eq!(value["children"][0]["children"], json!([]));

        let back: VariantNode = serde_json::from_value(value).unwrap();
        assert!(back.is_equivalent(&tree));
        assert_eq!(back.id, tree.id);
    }

    #[test]
    fn test_branch_ignores_stray_leaf_fields() {
        let raw = json!({
            "name": "Red",
            "sku": "IGNORED",
            "children": [{ "name": "Small", "sku": "R-S" }]
        });
        let node: VariantNode = serde_json::from_value(raw).unwrap();
        assert!(node.leaf_data().is_none());
        assert_eq!(node.children()[0].leaf_data().unwrap().sku, "R-S");
    }

    #[test]
    fn test_media_kind_detection() {
        assert_eq!(MediaKind::detect(Some("video/mp4"), "clip.bin"), MediaKind::Video);
        assert_eq!(MediaKind::detect(None, "clip.MOV"), MediaKind::Video);
        assert_eq!(MediaKind::detect(None, "photo.png"), MediaKind::Image);
        assert_eq!(MediaKind::detect(Some("image/webp"), "x.mp4"), MediaKind::Image);
    }
}
