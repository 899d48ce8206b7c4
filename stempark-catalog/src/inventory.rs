use serde::{Deserialize, Serialize};

pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

/// Stock counts for one sellable variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inventory {
    #[serde(default)]
    pub stock: u32,

    /// Units held by pending orders; maintained by checkout, never edited here
    #[serde(default)]
    pub reserved: u32,

    #[serde(default = "default_threshold")]
    pub low_stock_threshold: u32,
}

fn default_threshold() -> u32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

impl Inventory {
    pub fn with_threshold(low_stock_threshold: u32) -> Self {
        Self {
            stock: 0,
            reserved: 0,
            low_stock_threshold,
        }
    }

    /// Units that can still be sold
    pub fn available(&self) -> u32 {
        self.stock.saturating_sub(self.reserved)
    }

    pub fn is_low_stock(&self) -> bool {
        self.available() <= self.low_stock_threshold
    }
}

impl Default for Inventory {
    fn default() -> Self {
        Self::with_threshold(DEFAULT_LOW_STOCK_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_levels() {
        let mut inventory = Inventory::default();
        assert_eq!(inventory.low_stock_threshold, 5);
        assert!(inventory.is_low_stock());

        inventory.stock = 20;
        inventory.reserved = 4;
        assert_eq!(inventory.available(), 16);
        assert!(!inventory.is_low_stock());

        // Reservations beyond stock never underflow
        inventory.reserved = 30;
        assert_eq!(inventory.available(), 0);
        assert!(inventory.is_low_stock());
    }

    #[test]
    fn test_missing_threshold_defaults() {
        let inventory: Inventory = serde_json::from_str(r#"{"stock": 3}"#).unwrap();
        assert_eq!(inventory.stock, 3);
        assert_eq!(inventory.reserved, 0);
        assert_eq!(inventory.low_stock_threshold, 5);
    }
}
