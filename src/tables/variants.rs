use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::key::StatKey;

/// Weapon sheet → variant id (2..=5) → stats granted by that variant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariantStatMap {
    pub sheets: BTreeMap<String, BTreeMap<u8, StatKey>>,
}

impl VariantStatMap {
    pub fn insert_sheet(&mut self, sheet: impl Into<String>, variants: BTreeMap<u8, StatKey>) {
        self.sheets.insert(sheet.into(), variants);
    }

    pub fn stats_for(&self, sheet: &str, variant_id: u8) -> Option<&StatKey> {
        self.sheets.get(sheet).and_then(|variants| variants.get(&variant_id))
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(String::as_str)
    }
}
