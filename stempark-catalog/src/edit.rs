use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::VariantError;
use crate::field::FieldUpdate;
use crate::path::VariantPath;
use crate::pricing::Currency;
use crate::tree::VariantTree;

/// One editor action, as sent by an admin form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum TreeEdit {
    Add {
        #[serde(default)]
        path: VariantPath,
    },
    Update {
        path: VariantPath,
        field: String,
        value: Value,
    },
    Delete {
        path: VariantPath,
    },
    SetLevelLabel {
        depth: usize,
        label: String,
    },
    AddPrice {
        path: VariantPath,
        region: String,
        currency: Currency,
    },
    RemovePrice {
        path: VariantPath,
        currency: Currency,
    },
}

impl VariantTree {
    pub fn apply(&self, edit: &TreeEdit) -> Result<VariantTree, VariantError> {
        match edit {
            TreeEdit::Add { path } => self.add_node(path),
            TreeEdit::Update { path, field, value } => {
                let update = FieldUpdate::from_key(field, value.clone())?;
                self.update_node_deep(path, update)
            }
            TreeEdit::Delete { path } => self.delete_node_deep(path),
            TreeEdit::SetLevelLabel { depth, label } => self.set_level_label(*depth, label.clone()),
            TreeEdit::AddPrice {
                path,
                region,
                currency,
            } => self.add_price(path, region.clone(), currency.clone()),
            TreeEdit::RemovePrice { path, currency } => self.remove_price(path, currency),
        }
    }

    /// Apply edits in order; the first failure aborts and leaves `self` as is
    pub fn apply_all(&self, edits: &[TreeEdit]) -> Result<VariantTree, (usize, VariantError)> {
        edits
            .iter()
            .enumerate()
            .try_fold(self.clone(), |tree, (i, edit)| tree.apply(edit).map_err(|e| (i, e)))
    }
}
