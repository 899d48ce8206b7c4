//! Typed single-field replacements addressed by key
//!
//! Editors send `(field, value)` pairs such as `("name", "Red")` or
//! `("inventory.stock", 12)`. [`FieldUpdate::from_key`] turns them into a
//! typed update; type errors surface here, range checks are left to
//! [`crate::validation`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VariantError;
use crate::node::{LeafData, MediaRef};
use crate::pricing::PriceList;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "field", content = "value")]
pub enum FieldUpdate {
    #[serde(rename = "name")]
    Name(String),
    #[serde(rename = "sku")]
    Sku(String),
    #[serde(rename = "barcode")]
    Barcode(String),
    #[serde(rename = "weight")]
    Weight(f64),
    #[serde(rename = "pricing")]
    Pricing(PriceList),
    #[serde(rename = "media")]
    Media(Vec<MediaRef>),
    #[serde(rename = "inventory.stock")]
    Stock(u32),
    #[serde(rename = "inventory.lowStockThreshold")]
    LowStockThreshold(u32),
    #[serde(rename = "dimensions.length")]
    Length(f64),
    #[serde(rename = "dimensions.width")]
    Width(f64),
    #[serde(rename = "dimensions.height")]
    Height(f64),
}

impl FieldUpdate {
    /// Parse a simple or dotted `parent.child` key with a JSON value
    pub fn from_key(field: &str, value: Value) -> Result<Self, VariantError> {
        let update = match field {
            "name" => FieldUpdate::Name(typed(field, value)?),
            "sku" => FieldUpdate::Sku(typed(field, value)?),
            "barcode" => FieldUpdate::Barcode(typed(field, value)?),
            "weight" => FieldUpdate::Weight(number(field, value)?),
            "pricing" => FieldUpdate::Pricing(typed(field, value)?),
            "media" => FieldUpdate::Media(typed(field, value)?),
            "inventory.stock" => FieldUpdate::Stock(count(field, value)?),
            "inventory.lowStockThreshold" => FieldUpdate::LowStockThreshold(count(field, value)?),
            "inventory.reserved" => return Err(VariantError::ReadOnlyField(field.to_string())),
            "dimensions.length" => FieldUpdate::Length(number(field, value)?),
            "dimensions.width" => FieldUpdate::Width(number(field, value)?),
            "dimensions.height" => FieldUpdate::Height(number(field, value)?),
            other => return Err(VariantError::UnknownField(other.to_string())),
        };
        Ok(update)
    }

    /// The key this update was addressed by
    pub fn key(&self) -> &'static str {
        match self {
            FieldUpdate::Name(_) => "name",
            FieldUpdate::Sku(_) => "sku",
            FieldUpdate::Barcode(_) => "barcode",
            FieldUpdate::Weight(_) => "weight",
            FieldUpdate::Pricing(_) => "pricing",
            FieldUpdate::Media(_) => "media",
            FieldUpdate::Stock(_) => "inventory.stock",
            FieldUpdate::LowStockThreshold(_) => "inventory.lowStockThreshold",
            FieldUpdate::Length(_) => "dimensions.length",
            FieldUpdate::Width(_) => "dimensions.width",
            FieldUpdate::Height(_) => "dimensions.height",
        }
    }

    /// Write a leaf field. Nested objects are replaced member-wise.
    pub(crate) fn apply_to_leaf(self, leaf: &mut LeafData) {
        match self {
            FieldUpdate::Name(_) => {}
            FieldUpdate::Sku(sku) => leaf.sku = sku,
            FieldUpdate::Barcode(barcode) => leaf.barcode = barcode,
            FieldUpdate::Weight(weight) => leaf.weight = weight,
            FieldUpdate::Pricing(pricing) => leaf.pricing = pricing,
            FieldUpdate::Media(media) => leaf.media = media,
            FieldUpdate::Stock(stock) => leaf.inventory.stock = stock,
            FieldUpdate::LowStockThreshold(threshold) => leaf.inventory.low_stock_threshold = threshold,
            FieldUpdate::Length(length) => leaf.dimensions.length = length,
            FieldUpdate::Width(width) => leaf.dimensions.width = width,
            FieldUpdate::Height(height) => leaf.dimensions.height = height,
        }
    }
}

fn typed<T: DeserializeOwned>(field: &str, value: Value) -> Result<T, VariantError> {
    serde_json::from_value(value).map_err(|e| VariantError::InvalidFieldValue {
        field: field.to_string(),
        reason: e.to_string(),
    })
}

/// Form inputs send numbers either as JSON numbers or numeric strings
fn number(field: &str, value: Value) -> Result<f64, VariantError> {
    match &value {
        Value::String(raw) if raw.trim().is_empty() => Ok(0.0),
        Value::String(raw) => raw.trim().parse::<f64>().map_err(|e| VariantError::InvalidFieldValue {
            field: field.to_string(),
            reason: e.to_string(),
        }),
        _ => typed(field, value),
    }
}

fn count(field: &str, value: Value) -> Result<u32, VariantError> {
    match &value {
        Value::String(raw) if raw.trim().is_empty() => Ok(0),
        Value::String(raw) => raw.trim().parse::<u32>().map_err(|e| VariantError::InvalidFieldValue {
            field: field.to_string(),
            reason: e.to_string(),
        }),
        _ => typed(field, value),
    }
}
