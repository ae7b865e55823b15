use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::extract::DamageRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRange {
    pub min: i64,
    pub max: i64,
}

impl fmt::Display for DamageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.min, self.max)
    }
}

/// Spreadsheet level (-1..=5) → damage range, for one weapon sheet.
pub type DamageLevels = BTreeMap<i32, DamageRange>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DamageTable {
    pub sheets: BTreeMap<String, DamageLevels>,
}

impl DamageTable {
    pub fn get(&self, sheet: &str, level: i32) -> Option<DamageRange> {
        self.sheets.get(sheet).and_then(|levels| levels.get(&level)).copied()
    }

    pub fn contains_sheet(&self, sheet: &str) -> bool {
        self.sheets.contains_key(sheet)
    }

    pub fn insert_sheet(&mut self, sheet: impl Into<String>, levels: DamageLevels) {
        self.sheets.insert(sheet.into(), levels);
    }
}

/// Rows without a level are skipped silently; rows whose level, min or max
/// cannot be read as numbers are skipped with a warning.
pub fn build_damage_levels(sheet: &str, rows: &[DamageRow]) -> DamageLevels {
    let mut levels = DamageLevels::new();
    for row in rows {
        if row.level.is_empty() {
            continue;
        }
        let Some(level) = row.level.as_i64().and_then(|l| i32::try_from(l).ok()) else {
            tracing::warn!(sheet, row = row.sheet_row, "unreadable damage level cell");
            continue;
        };
        match (row.min.as_i64(), row.max.as_i64()) {
            (Some(min), Some(max)) => {
                levels.insert(level, DamageRange { min, max });
            }
            _ if row.min.is_empty() || row.max.is_empty() => {}
            _ => tracing::warn!(sheet, row = row.sheet_row, "unreadable damage min/max cells"),
        }
    }
    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::workbook::CellValue;

    fn row(sheet_row: u32, level: CellValue, min: CellValue, max: CellValue) -> DamageRow {
        DamageRow {
            sheet_row,
            level,
            min,
            max,
        }
    }

    #[test]
    fn builds_levels_from_numeric_and_text_cells() {
        use CellValue::*;
        let rows = vec![
            row(6, Number(-1.0), Number(2.0), Number(4.0)),
            row(7, Text("0".into()), Text("3".into()), Number(6.9)),
            row(8, Number(1.0), Empty, Number(8.0)),
            row(9, Empty, Number(1.0), Number(1.0)),
            row(10, Text("lvl".into()), Number(1.0), Number(1.0)),
            row(11, Number(3.0), Text("?".into()), Number(1.0)),
        ];
        let levels = build_damage_levels("Pistol", &rows);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[&-1], DamageRange { min: 2, max: 4 });
        assert_eq!(levels[&0], DamageRange { min: 3, max: 6 });
    }

    #[test]
    fn table_lookup_by_sheet_and_level() {
        let mut table = DamageTable::default();
        let mut levels = DamageLevels::new();
        levels.insert(1, DamageRange { min: 4, max: 8 });
        table.insert_sheet("Pistol", levels);
        assert_eq!(table.get("Pistol", 1), Some(DamageRange { min: 4, max: 8 }));
        assert_eq!(table.get("Pistol", 2), None);
        assert_eq!(table.get("Rifle", 1), None);
        assert_eq!(DamageRange { min: 4, max: 8 }.to_string(), "4-8");
    }
}
