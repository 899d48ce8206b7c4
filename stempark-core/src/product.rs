use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stempark_catalog::{level_labels_from, reconstruct_tree, FlatVariant, VariantTree};
use uuid::Uuid;

/// Fields an admin fills in when creating a product
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

/// A catalog product as stored: the variant tree is kept only in flat form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub variants: Vec<FlatVariant>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn new(draft: NewProduct) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: draft.name,
            description: draft.description,
            category: draft.category,
            variants: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the variant list
    pub fn set_variants(&mut self, variants: Vec<FlatVariant>) {
        self.variants = variants;
        self.updated_at = Utc::now();
    }

    /// Level labels in the order the stored variants use them
    pub fn level_labels(&self) -> Vec<String> {
        level_labels_from(&self.variants)
    }

    /// Editing tree rebuilt from the stored variants
    pub fn variant_tree(&self) -> VariantTree {
        reconstruct_tree(&self.variants, &self.level_labels())
    }

    /// Units available across all variants
    pub fn total_available(&self) -> u32 {
        self.variants
            .iter()
            .map(|v| v.inventory.available())
            .sum()
    }

    /// Variants at or below their low-stock threshold
    pub fn low_stock_variants(&self) -> impl Iterator<Item = &FlatVariant> {
        self.variants.iter().filter(|v| v.inventory.is_low_stock())
    }
}
