//! Tier bonus tables: (tier, level, stat) → value, built from the
//! "Tier N Variant Values" sheets.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::workbook::CellValue;
use crate::mapping::key::{StatKey, COMPOSITE_SEPARATOR};

pub const MAX_BONUS_LEVEL: u8 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Tier1,
    Tier2,
}

impl Tier {
    /// Variant ids 2/3 draw from tier 1, 4/5 from tier 2. Other ids carry no bonuses.
    pub fn for_variant(variant_id: u8) -> Option<Tier> {
        match variant_id {
            2 | 3 => Some(Tier::Tier1),
            4 | 5 => Some(Tier::Tier2),
            _ => None,
        }
    }
}

/// A bonus cell, classified once at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BonusValue {
    Number(f64),
    Composite(Vec<i64>),
    /// Text that is neither a number nor a numeric composite. Kept verbatim, emits nothing.
    Raw(String),
}

impl BonusValue {
    /// Classify a raw cell. Empty cells and non-finite numbers have no value
    /// at all; NaN or infinity spelled out as text stays `Raw`.
    pub fn from_cell(cell: &CellValue) -> Option<BonusValue> {
        match cell {
            CellValue::Empty => None,
            CellValue::Number(n) if !n.is_finite() => None,
            CellValue::Number(n) => Some(BonusValue::Number(*n)),
            CellValue::Text(text) => {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return None;
                }
                if let Some(n) = parse_finite(trimmed) {
                    return Some(BonusValue::Number(n));
                }
                if trimmed.contains(COMPOSITE_SEPARATOR) {
                    let parsed: Option<Vec<i64>> = trimmed
                        .split(COMPOSITE_SEPARATOR)
                        .map(|part| parse_finite(part.trim()).map(|v| v.trunc() as i64))
                        .collect();
                    if let Some(values) = parsed {
                        return Some(BonusValue::Composite(values));
                    }
                }
                Some(BonusValue::Raw(text.clone()))
            }
        }
    }

    /// Integer values in positional order. Numbers truncate toward zero.
    pub fn values(&self) -> Vec<i64> {
        match self {
            BonusValue::Number(n) => vec![n.trunc() as i64],
            BonusValue::Composite(values) => values.clone(),
            BonusValue::Raw(_) => Vec::new(),
        }
    }
}

fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One level's worth of bonus cells, keyed by header.
pub type BonusRow = BTreeMap<StatKey, BonusValue>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TierBonuses {
    pub levels: BTreeMap<u8, BonusRow>,
}

impl TierBonuses {
    pub fn row(&self, level: i64) -> Option<&BonusRow> {
        u8::try_from(level).ok().and_then(|l| self.levels.get(&l))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatBonusTable {
    pub tier1: TierBonuses,
    pub tier2: TierBonuses,
}

impl StatBonusTable {
    pub fn tier(&self, tier: Tier) -> &TierBonuses {
        match tier {
            Tier::Tier1 => &self.tier1,
            Tier::Tier2 => &self.tier2,
        }
    }

    pub fn row(&self, tier: Tier, level: i64) -> Option<&BonusRow> {
        self.tier(tier).row(level)
    }
}

/// Build one tier from its header list and raw rows keyed by level.
///
/// Only levels 0..=5 are kept. A level missing from `rows`, or a cell that is
/// empty or beyond the end of its row, leaves that stat absent for the level.
pub fn build_tier(headers: &[StatKey], rows: &BTreeMap<u8, Vec<CellValue>>) -> TierBonuses {
    let mut levels = BTreeMap::new();
    for level in 0..=MAX_BONUS_LEVEL {
        let mut row = BonusRow::new();
        if let Some(cells) = rows.get(&level) {
            for (header, cell) in headers.iter().zip(cells.iter()) {
                if header.is_empty() {
                    continue;
                }
                if let Some(value) = BonusValue::from_cell(cell) {
                    if let BonusValue::Raw(raw) = &value {
                        tracing::debug!(stat = %header, level, raw = %raw, "keeping non-numeric bonus cell verbatim");
                    }
                    row.insert(header.clone(), value);
                }
            }
        }
        levels.insert(level, row);
    }
    TierBonuses { levels }
}
