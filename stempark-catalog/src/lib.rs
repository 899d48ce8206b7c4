//! Product variant trees for the STEM Park catalog
//!
//! Products are configured as a tree of option values (Color → Size →
//! Material). Leaves are the sellable variants and carry SKU, pricing,
//! inventory, dimensions and media. The tree is edited by path, flattened
//! into [`FlatVariant`] records for storage, and rebuilt from them with
//! [`reconstruct_tree`].

pub mod edit;
pub mod error;
pub mod field;
pub mod flatten;
pub mod inventory;
pub mod node;
pub mod path;
pub mod pricing;
pub mod reconstruct;
pub mod tree;
pub mod validation;

pub use edit::TreeEdit;
pub use error::VariantError;
pub use field::FieldUpdate;
pub use flatten::{parse_media_field, FlatVariant, StagedUpload, Submission};
pub use inventory::Inventory;
pub use node::{Dimensions, LeafData, MediaKind, MediaRef, NodeKind, StagedFile, VariantNode};
pub use path::VariantPath;
pub use pricing::{Currency, PriceEntry, PriceList, VariantDefaults};
pub use reconstruct::{level_labels_from, reconstruct_tree};
pub use tree::VariantTree;
pub use validation::{validate, Problem, ValidationIssue};
