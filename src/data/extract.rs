//! Pulls the contractual cell ranges out of the balance workbook into plain
//! tables. No interpretation happens here beyond locating cells.

use std::collections::BTreeMap;

use crate::config::SheetLayout;
use crate::data::workbook::{column_index, CellValue, Sheet};
use crate::mapping::key::StatKey;

/// First variant id carried by the variant row (column A).
pub const FIRST_VARIANT_ID: u8 = 2;

/// Tier sheet contents: header names and raw rows keyed by level
/// (first data row = level 0).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TierGrid {
    pub headers: Vec<StatKey>,
    pub rows: BTreeMap<u8, Vec<CellValue>>,
}

/// One data row of a weapon sheet's damage block, before conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct DamageRow {
    pub sheet_row: u32,
    pub level: CellValue,
    pub min: CellValue,
    pub max: CellValue,
}

/// Variant id → stat key, read from the variant row (A..D → ids 2..5).
pub fn extract_variant_stats(sheet: &Sheet, layout: &SheetLayout) -> BTreeMap<u8, StatKey> {
    let mut variants = BTreeMap::new();
    for (offset, letters) in layout.variant_columns.iter().enumerate() {
        let Some(col) = column_index(letters) else {
            tracing::warn!(column = %letters, "ignoring invalid variant column");
            continue;
        };
        let Some(text) = sheet.cell(layout.variant_row, col).as_text() else {
            continue;
        };
        let key = StatKey::parse(&text);
        if key.is_empty() {
            continue;
        }
        let Some(id) = u8::try_from(offset)
            .ok()
            .and_then(|o| FIRST_VARIANT_ID.checked_add(o))
        else {
            tracing::warn!(column = %letters, "variant column beyond the last variant id, ignoring");
            continue;
        };
        variants.insert(id, key);
    }
    variants
}

/// Header row runs from column A until the first empty cell.
pub fn extract_tier_grid(sheet: &Sheet, layout: &SheetLayout) -> TierGrid {
    let mut headers = Vec::new();
    for col in 1..=layout.tier_max_columns {
        match sheet.cell(layout.tier_header_row, col).as_text() {
            Some(text) => headers.push(StatKey::parse(&text)),
            None => break,
        }
    }

    let mut rows = BTreeMap::new();
    for sheet_row in layout.tier_first_row..=layout.tier_last_row {
        let cells: Vec<CellValue> = (1..=headers.len() as u32)
            .map(|col| sheet.cell(sheet_row, col).clone())
            .collect();
        if cells.iter().all(CellValue::is_empty) {
            continue;
        }
        let Ok(level) = u8::try_from(sheet_row - layout.tier_first_row) else {
            tracing::warn!(row = sheet_row, "tier row beyond the last level, ignoring");
            continue;
        };
        rows.insert(level, cells);
    }
    TierGrid { headers, rows }
}

/// Column positions of the damage block, located by header text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageColumns {
    pub level: u32,
    pub min: u32,
    pub max: u32,
}

/// Case-insensitive substring match on the header row; the last matching
/// column wins. `None` unless all three columns are present.
pub fn find_damage_columns(sheet: &Sheet, layout: &SheetLayout) -> Option<DamageColumns> {
    let (mut level, mut min, mut max) = (None, None, None);
    for col in 1..=layout.damage_max_columns {
        let Some(text) = sheet.cell(layout.damage_header_row, col).as_text() else {
            continue;
        };
        let header = text.to_lowercase();
        if header.contains("level") {
            level = Some(col);
        } else if header.contains("new min damage") {
            min = Some(col);
        } else if header.contains("new max damage") {
            max = Some(col);
        }
    }
    Some(DamageColumns {
        level: level?,
        min: min?,
        max: max?,
    })
}

pub fn extract_damage_rows(sheet: &Sheet, layout: &SheetLayout) -> Option<Vec<DamageRow>> {
    let columns = find_damage_columns(sheet, layout)?;
    let rows = (layout.damage_first_row..=layout.damage_last_row)
        .map(|sheet_row| DamageRow {
            sheet_row,
            level: sheet.cell(sheet_row, columns.level).clone(),
            min: sheet.cell(sheet_row, columns.min).clone(),
            max: sheet.cell(sheet_row, columns.max).clone(),
        })
        .collect();
    Some(rows)
}
