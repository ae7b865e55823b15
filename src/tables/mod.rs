//! Lookup tables built once from the workbook and shared read-only by the patcher.

pub mod bonus;
pub mod damage;
pub mod variants;

use serde::{Deserialize, Serialize};

use crate::config::MigrationConfig;
use crate::data::extract::{extract_damage_rows, extract_tier_grid, extract_variant_stats};
use crate::data::workbook::Workbook;
use crate::error::{MigrationError, Result};
use crate::mapping::key::StatKey;
use crate::mapping::stat::NameMapping;
use crate::mapping::weapon::WeaponResolver;

pub use bonus::{build_tier, BonusRow, BonusValue, StatBonusTable, Tier, TierBonuses};
pub use damage::{build_damage_levels, DamageRange, DamageTable};
pub use variants::VariantStatMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MigrationTables {
    pub bonuses: StatBonusTable,
    pub damage: DamageTable,
    pub variants: VariantStatMap,
    pub stat_names: NameMapping,
}

impl MigrationTables {
    /// Resolver over every sheet that contributes damage or variant stats.
    pub fn weapon_resolver(&self, config: &MigrationConfig) -> WeaponResolver {
        let sheets = self
            .damage
            .sheets
            .keys()
            .map(String::as_str)
            .chain(self.variants.sheet_names())
            .map(str::to_string)
            .collect::<Vec<_>>();
        WeaponResolver::new(config.weapon_overrides.clone(), sheets)
    }
}

/// Run every extractor and builder over the workbook.
///
/// The two tier sheets are required; a configured weapon sheet that is absent
/// is skipped with a warning. Damage blocks are read from every sheet that has
/// the damage headers.
pub fn build_tables(workbook: &Workbook, config: &MigrationConfig) -> Result<MigrationTables> {
    let layout = &config.layout;

    let mut variants = VariantStatMap::default();
    for name in &config.weapon_sheets {
        let Some(sheet) = workbook.sheet(name) else {
            tracing::warn!(sheet = %name, "weapon sheet not found in workbook");
            continue;
        };
        let stats = extract_variant_stats(sheet, layout);
        if !stats.is_empty() {
            tracing::debug!(sheet = %name, variants = stats.len(), "variant stats extracted");
            variants.insert_sheet(name.clone(), stats);
        }
    }

    let tier_sheet = |name: &str| {
        workbook
            .sheet(name)
            .ok_or_else(|| MigrationError::MissingSheet(name.to_string()))
    };
    let tier1 = extract_tier_grid(tier_sheet(&config.tier_sheets.tier1)?, layout);
    let tier2 = extract_tier_grid(tier_sheet(&config.tier_sheets.tier2)?, layout);
    let bonuses = StatBonusTable {
        tier1: build_tier(&tier1.headers, &tier1.rows),
        tier2: build_tier(&tier2.headers, &tier2.rows),
    };

    let mut damage = DamageTable::default();
    for sheet in workbook.sheets() {
        let Some(rows) = extract_damage_rows(sheet, layout) else {
            tracing::debug!(sheet = %sheet.name, "no damage columns");
            continue;
        };
        let levels = build_damage_levels(&sheet.name, &rows);
        if !levels.is_empty() {
            damage.insert_sheet(sheet.name.clone(), levels);
        }
    }

    let mut stat_names = NameMapping::builtin();
    stat_names.extend(
        config
            .stat_names
            .iter()
            .map(|(name, target)| (StatKey::parse(name), target.clone())),
    );

    tracing::info!(
        variant_sheets = variants.sheets.len(),
        damage_sheets = damage.sheets.len(),
        tier1_stats = tier1.headers.len(),
        tier2_stats = tier2.headers.len(),
        stat_names = stat_names.len(),
        "migration tables built"
    );

    Ok(MigrationTables {
        bonuses,
        damage,
        variants,
        stat_names,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::workbook::{CellValue, Sheet};

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn tier_sheet(name: &str, header: &str, value: CellValue) -> Sheet {
        let mut sheet = Sheet::new(name);
        sheet.set(8, 1, text(header));
        sheet.set(9, 1, value);
        sheet
    }

    fn pistol() -> Sheet {
        let mut sheet = Sheet::new("Pistol");
        sheet.set(5, 1, text("Level"));
        sheet.set(5, 2, text("New Min Damage"));
        sheet.set(5, 3, text("New Max Damage"));
        for (i, (level, min, max)) in [(-1.0, 2.0, 4.0), (0.0, 3.0, 6.0), (1.0, 4.0, 8.0)]
            .into_iter()
            .enumerate()
        {
            let row = 6 + i as u32;
            sheet.set(row, 1, CellValue::Number(level));
            sheet.set(row, 2, CellValue::Number(min));
            sheet.set(row, 3, CellValue::Number(max));
        }
        sheet.set(22, 1, text("Dodge"));
        sheet
    }

    #[test]
    fn builds_all_tables_from_workbook() {
        let workbook = Workbook::new(vec![
            pistol(),
            tier_sheet("Tier 1 Variant Values", "Dodge", CellValue::Number(3.0)),
            tier_sheet("Tier 2 Variant Values", "Dodge", CellValue::Number(6.0)),
        ]);
        let tables = build_tables(&workbook, &MigrationConfig::default()).unwrap();

        assert_eq!(tables.damage.get("Pistol", 0), Some(DamageRange { min: 3, max: 6 }));
        assert_eq!(tables.variants.stats_for("Pistol", 2), Some(&StatKey::parse("Dodge")));
        assert_eq!(
            tables.bonuses.row(Tier::Tier2, 0).unwrap()[&StatKey::parse("Dodge")],
            BonusValue::Number(6.0)
        );
        assert!(!tables.stat_names.is_empty());

        let resolver = tables.weapon_resolver(&MigrationConfig::default());
        assert_eq!(resolver.resolve("Pistol").unwrap().sheet, "Pistol");
    }

    #[test]
    fn missing_tier_sheet_is_an_error() {
        let workbook = Workbook::new(vec![pistol()]);
        let err = build_tables(&workbook, &MigrationConfig::default()).unwrap_err();
        assert!(matches!(err, MigrationError::MissingSheet(name) if name == "Tier 1 Variant Values"));
    }
}
