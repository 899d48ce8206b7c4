use std::collections::HashMap;

use serde::Serialize;

use crate::path::VariantPath;
use crate::tree::VariantTree;

/// What is wrong with one node or with the tree as a whole
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Problem {
    #[error("variant tree has no options")]
    EmptyTree,

    #[error("option name is empty")]
    EmptyName,

    #[error("SKU is required")]
    MissingSku,

    #[error("SKU {sku} is also used at {other}")]
    DuplicateSku { sku: String, other: String },

    #[error("{currency} price {value:?} is not a valid amount")]
    InvalidPrice { currency: String, value: String },

    #[error("{currency} sale price is above the original price")]
    SaleAboveOriginal { currency: String },

    #[error("level label {label:?} is used for more than one level")]
    DuplicateLevelLabel { label: String },
}

/// A problem and where it was found (`None` for tree-wide problems)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub path: Option<VariantPath>,
    #[serde(flatten)]
    pub problem: Problem,
    pub message: String,
}

impl ValidationIssue {
    fn at(path: Option<VariantPath>, problem: Problem) -> Self {
        let message = match &path {
            Some(path) => format!("{}: {}", path, problem),
            None => problem.to_string(),
        };
        Self {
            path,
            problem,
            message,
        }
    }
}

/// Check that a tree is ready to be submitted. Returns every issue found.
pub fn validate(tree: &VariantTree) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if tree.is_empty() {
        issues.push(ValidationIssue::at(None, Problem::EmptyTree));
        return issues;
    }

    let mut seen_labels = HashMap::new();
    for depth in 1..=tree.depth() {
        let label = tree.level_label(depth);
        if seen_labels.insert(label.clone(), depth).is_some() {
            issues.push(ValidationIssue::at(None, Problem::DuplicateLevelLabel { label }));
        }
    }

    check_names(&tree.nodes, &VariantPath::root(), &mut issues);

    let mut skus: HashMap<&str, VariantPath> = HashMap::new();
    for (path, node) in tree.leaves() {
        let Some(leaf) = node.leaf_data() else { continue };

        let sku = leaf.sku.trim();
        if sku.is_empty() {
            issues.push(ValidationIssue::at(Some(path.clone()), Problem::MissingSku));
        } else if let Some(other) = skus.get(sku) {
            issues.push(ValidationIssue::at(
                Some(path.clone()),
                Problem::DuplicateSku {
                    sku: sku.to_string(),
                    other: other.to_string(),
                },
            ));
        } else {
            skus.insert(sku, path.clone());
        }

        for entry in &leaf.pricing {
            let currency = entry.currency.to_string();
            let original = check_amount(&path, &currency, &entry.original_price, entry.original_amount(), &mut issues);
            let sale = check_amount(&path, &currency, &entry.sale_price, entry.sale_amount(), &mut issues);
            if let (Some(original), Some(sale)) = (original, sale) {
                if sale > original {
                    issues.push(ValidationIssue::at(
                        Some(path.clone()),
                        Problem::SaleAboveOriginal { currency },
                    ));
                }
            }
        }
    }

    issues
}

fn check_names(
    nodes: &[std::sync::Arc<crate::node::VariantNode>],
    prefix: &VariantPath,
    issues: &mut Vec<ValidationIssue>,
) {
    for (i, node) in nodes.iter().enumerate() {
        let path = prefix.child(i);
        if node.name.trim().is_empty() {
            issues.push(ValidationIssue::at(Some(path.clone()), Problem::EmptyName));
        }
        check_names(node.children(), &path, issues);
    }
}

fn check_amount(
    path: &VariantPath,
    currency: &str,
    raw: &str,
    parsed: Result<Option<rust_decimal::Decimal>, rust_decimal::Error>,
    issues: &mut Vec<ValidationIssue>,
) -> Option<rust_decimal::Decimal> {
    match parsed {
        Ok(Some(amount)) if amount.is_sign_negative() => {
            issues.push(ValidationIssue::at(
                Some(path.clone()),
                Problem::InvalidPrice {
                    currency: currency.to_string(),
                    value: raw.to_string(),
                },
            ));
            None
        }
        Ok(amount) => amount,
        Err(_) => {
            issues.push(ValidationIssue::at(
                Some(path.clone()),
                Problem::InvalidPrice {
                    currency: currency.to_string(),
                    value: raw.to_string(),
                },
            ));
            None
        }
    }
}
