use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::VariantError;

/// Three-letter currency code, stored upper case
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Currency(String);

impl Currency {
    pub fn new(code: &str) -> Result<Self, VariantError> {
        let code = code.trim();
        if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(VariantError::InvalidCurrency(code.to_string()));
        }
        Ok(Self(code.to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Currency {
    type Err = VariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Currency {
    type Error = VariantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Currency> for String {
    fn from(currency: Currency) -> Self {
        currency.0
    }
}

/// Regional price of one sellable variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub region: String,
    pub currency: Currency,

    /// Decimal amount as string (preserves precision, empty while editing)
    #[serde(default)]
    pub original_price: String,

    #[serde(default)]
    pub sale_price: String,
}

impl PriceEntry {
    /// Entry with no amounts filled in yet
    pub fn unpriced(region: impl Into<String>, currency: Currency) -> Self {
        Self {
            region: region.into(),
            currency,
            original_price: String::new(),
            sale_price: String::new(),
        }
    }

    /// Parsed original price; `Ok(None)` when not filled in
    pub fn original_amount(&self) -> Result<Option<Decimal>, rust_decimal::Error> {
        parse_amount(&self.original_price)
    }

    /// Parsed sale price; `Ok(None)` when not filled in
    pub fn sale_amount(&self) -> Result<Option<Decimal>, rust_decimal::Error> {
        parse_amount(&self.sale_price)
    }
}

fn parse_amount(raw: &str) -> Result<Option<Decimal>, rust_decimal::Error> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(raw).map(Some)
}

/// Ordered price list with at most one entry per currency
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PriceList(Vec<PriceEntry>);

impl PriceList {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Build a list, rejecting repeated currencies
    pub fn from_entries(entries: Vec<PriceEntry>) -> Result<Self, VariantError> {
        let mut list = Self::new();
        for entry in entries {
            list.push(entry)?;
        }
        Ok(list)
    }

    /// Append an unpriced entry for `currency`
    pub fn add(&mut self, region: impl Into<String>, currency: Currency) -> Result<(), VariantError> {
        self.push(PriceEntry::unpriced(region, currency))
    }

    pub fn push(&mut self, entry: PriceEntry) -> Result<(), VariantError> {
        if self.contains(&entry.currency) {
            return Err(VariantError::DuplicateCurrency(entry.currency.to_string()));
        }
        self.0.push(entry);
        Ok(())
    }

    /// Remove the entry for `currency`, returning it if present
    pub fn remove(&mut self, currency: &Currency) -> Option<PriceEntry> {
        let position = self.0.iter().position(|e| &e.currency == currency)?;
        Some(self.0.remove(position))
    }

    pub fn contains(&self, currency: &Currency) -> bool {
        self.0.iter().any(|e| &e.currency == currency)
    }

    pub fn get(&self, currency: &Currency) -> Option<&PriceEntry> {
        self.0.iter().find(|e| &e.currency == currency)
    }

    pub fn get_mut(&mut self, currency: &Currency) -> Option<&mut PriceEntry> {
        self.0.iter_mut().find(|e| &e.currency == currency)
    }

    /// Currencies already priced, in list order
    pub fn currencies(&self) -> impl Iterator<Item = &Currency> {
        self.0.iter().map(|e| &e.currency)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PriceEntry> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for PriceList {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = Vec::<PriceEntry>::deserialize(deserializer)?;
        Self::from_entries(entries).map_err(serde::de::Error::custom)
    }
}

impl<'a> IntoIterator for &'a PriceList {
    type Item = &'a PriceEntry;
    type IntoIter = std::slice::Iter<'a, PriceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Seed values applied to freshly added variant nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDefaults {
    /// Price entries every new node starts with
    pub pricing: PriceList,

    /// Initial low-stock threshold
    pub low_stock_threshold: u32,
}

impl VariantDefaults {
    /// Defaults with custom seed regions given as `(region, currency)` pairs
    pub fn with_regions(
        regions: &[(String, String)],
        low_stock_threshold: u32,
    ) -> Result<Self, VariantError> {
        let mut pricing = PriceList::new();
        for (region, currency) in regions {
            pricing.add(region.clone(), Currency::new(currency)?)?;
        }
        Ok(Self {
            pricing,
            low_stock_threshold,
        })
    }
}

impl Default for VariantDefaults {
    fn default() -> Self {
        let pricing = PriceList(vec![
            PriceEntry::unpriced("Domestic", Currency("INR".to_string())),
            PriceEntry::unpriced("Overseas", Currency("USD".to_string())),
        ]);
        Self {
            pricing,
            low_stock_threshold: crate::inventory::DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }
}
