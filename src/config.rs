//! Migration settings. Every field has a default matching the production
//! workbook and item files, so an empty YAML file is a valid config.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};
use crate::mapping::stat::StatTarget;

pub const CONFIG_ENV_VAR: &str = "ARMORER_CONFIG";
pub const DEFAULT_WORKBOOK_PATH: &str = "tls_weapon_docs.xlsx";
pub const DEFAULT_SNAPSHOT_PATH: &str = "weapon_mapping.json";
pub const DEFAULT_CHANGE_LOG_PATH: &str = "weapon_changes.json";

const DEFAULT_DOCUMENTS: &[&str] = &[
    "modded_files/ItemDefinitions_Weapons",
    "modded_files/ItemDefinitions_DLC1",
    "modded_files/ItemDefinitions_DLC2",
    "modded_files/ItemDefinitions_Usables",
];

const DEFAULT_WEAPON_SHEETS: &[&str] = &[
    "sword", "Hammer", "1h Axe", "Dagger", "2h sword", "2H Hammer", "2H AXE", "Spear",
    "Hand crossbow", "Crossbow", "Pistol", "Shortbow", "Longbow", "Rifle", "Wand", "Scepter",
    "Tome of Secrets", "Magic orb", "power staff", "druid staff", "War Shield", "Claws",
    "Cannon", "Boomerang", "Gauntlet", "Sacred Flower",
];

/// Names that no mechanical rule recovers (abbreviations, reworded sheets).
const DEFAULT_WEAPON_OVERRIDES: &[(&str, &str)] = &[
    ("Axe", "1h Axe"),
    ("MagicWand", "Wand"),
    ("MagicScepter", "Scepter"),
    ("MagicStaff", "power staff"),
    ("TomeOfMagic", "Tome of Secrets"),
    ("DruidicStaff", "druid staff"),
    ("WarShield", "War Shield"),
    ("2HHammer", "2H Hammer"),
    ("2HAxe", "2H AXE"),
    ("HandCrossbow", "Hand crossbow"),
    ("MagicOrb", "Magic orb"),
    ("ManaFlower", "Sacred Flower"),
];

const DEFAULT_OFFHAND_FAMILIES: &[&str] = &[
    "BattleMageMagicWand",
    "BattleMageSword",
    "DuelingPistol",
    "MysticHammer",
    "ParryingDagger",
    "PreciseHandCrossbow",
    "ReliableMagicScepter",
    "SwiftAxe",
    "TransferMagicOrb",
    "WarpCrystal",
    "GauntletOffhand",
    "BoomerangOffhand",
];

const DEFAULT_SCROLLS: &[(&str, Option<&str>)] = &[
    ("AxeBoomerangScroll", Some("1h Axe")),
    ("ThrowingDaggersScroll", Some("Dagger")),
    ("ChargeScroll", Some("2h sword")),
    ("SwordBlastScroll", Some("2h sword")),
    ("SuperSpinScroll", Some("2H AXE")),
    ("GroundSmashScroll", Some("2H Hammer")),
    ("TripleSwipeScroll", Some("Spear")),
    ("GrapeshotScroll", Some("Pistol")),
    ("RainOfArrowsScroll", Some("Shortbow")),
    ("ExplosiveBoltScroll", Some("Crossbow")),
    ("AssassinateScroll", Some("Rifle")),
    ("MagicMissilesScroll", Some("Wand")),
    ("HammerOfFaithScroll", Some("Scepter")),
    ("DeathRayScroll", Some("Magic orb")),
    ("ScorchingWaveScroll", Some("power staff")),
    ("FireThrowerScroll", Some("power staff")),
    ("FireballScroll", Some("Tome of Secrets")),
    ("LightningStrikeScroll", Some("Tome of Secrets")),
    ("BeeStingScroll", Some("druid staff")),
    ("TeleportationScroll", None),
];

/// Fixed cell coordinates of the balance workbook (1-based rows and columns).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetLayout {
    pub variant_row: u32,
    /// Column letters holding the stat names for variant ids 2, 3, 4, 5.
    pub variant_columns: Vec<String>,
    pub tier_header_row: u32,
    pub tier_first_row: u32,
    pub tier_last_row: u32,
    pub tier_max_columns: u32,
    pub damage_header_row: u32,
    pub damage_first_row: u32,
    pub damage_last_row: u32,
    pub damage_max_columns: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            variant_row: 22,
            variant_columns: ["A", "B", "C", "D"].iter().map(|c| c.to_string()).collect(),
            tier_header_row: 8,
            tier_first_row: 9,
            tier_last_row: 24,
            tier_max_columns: 30,
            damage_header_row: 5,
            damage_first_row: 6,
            damage_last_row: 12,
            damage_max_columns: 19,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierSheets {
    pub tier1: String,
    pub tier2: String,
}

impl Default for TierSheets {
    fn default() -> Self {
        Self {
            tier1: "Tier 1 Variant Values".to_string(),
            tier2: "Tier 2 Variant Values".to_string(),
        }
    }
}

/// Shield-class weapons carry a fixed mobility penalty on every variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShieldRule {
    pub sheets: Vec<String>,
    pub stat: String,
    pub value: i64,
}

impl Default for ShieldRule {
    fn default() -> Self {
        Self {
            sheets: vec!["War Shield".to_string()],
            stat: "Dodge".to_string(),
            value: -20,
        }
    }
}

impl ShieldRule {
    pub fn applies_to(&self, sheet: &str) -> bool {
        self.sheets.iter().any(|s| s.eq_ignore_ascii_case(sheet))
    }
}

/// Element and attribute names of the item-definition documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentSchema {
    pub record: String,
    pub record_id: String,
    pub levels: String,
    pub level: String,
    pub level_id: String,
    pub damage: String,
    pub damage_min: String,
    pub damage_max: String,
    pub bonuses: String,
    pub bonus: String,
    pub bonus_stat: String,
    pub bonus_value: String,
}

impl Default for DocumentSchema {
    fn default() -> Self {
        Self {
            record: "ItemDefinition".to_string(),
            record_id: "Id".to_string(),
            levels: "LevelVariations".to_string(),
            level: "Level".to_string(),
            level_id: "Id".to_string(),
            damage: "BaseDamage".to_string(),
            damage_min: "Min".to_string(),
            damage_max: "Max".to_string(),
            bonuses: "BaseStatBonuses".to_string(),
            bonus: "BaseStatBonus".to_string(),
            bonus_stat: "Stat".to_string(),
            bonus_value: "Value".to_string(),
        }
    }
}

/// How newly written bonus entries carry their value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BonusStyle {
    /// `<BaseStatBonus Stat="Dodge">-20</BaseStatBonus>`
    #[default]
    Text,
    /// `<BaseStatBonus Stat="Dodge" Value="-20"/>`
    Attribute,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub workbook: PathBuf,
    pub documents: Vec<PathBuf>,
    pub snapshot: PathBuf,
    pub change_log: PathBuf,
    pub layout: SheetLayout,
    pub tier_sheets: TierSheets,
    pub weapon_sheets: Vec<String>,
    pub weapon_overrides: BTreeMap<String, String>,
    pub offhand_families: BTreeSet<String>,
    pub shield: ShieldRule,
    pub scrolls: BTreeMap<String, Option<String>>,
    /// Merged over the built-in stat vocabulary.
    pub stat_names: BTreeMap<String, StatTarget>,
    pub schema: DocumentSchema,
    pub bonus_style: BonusStyle,
    pub indent: String,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            workbook: PathBuf::from(DEFAULT_WORKBOOK_PATH),
            documents: DEFAULT_DOCUMENTS.iter().map(PathBuf::from).collect(),
            snapshot: PathBuf::from(DEFAULT_SNAPSHOT_PATH),
            change_log: PathBuf::from(DEFAULT_CHANGE_LOG_PATH),
            layout: SheetLayout::default(),
            tier_sheets: TierSheets::default(),
            weapon_sheets: DEFAULT_WEAPON_SHEETS.iter().map(|s| s.to_string()).collect(),
            weapon_overrides: DEFAULT_WEAPON_OVERRIDES
                .iter()
                .map(|(family, sheet)| (family.to_string(), sheet.to_string()))
                .collect(),
            offhand_families: DEFAULT_OFFHAND_FAMILIES.iter().map(|s| s.to_string()).collect(),
            shield: ShieldRule::default(),
            scrolls: DEFAULT_SCROLLS
                .iter()
                .map(|(id, sheet)| (id.to_string(), sheet.map(str::to_string)))
                .collect(),
            stat_names: BTreeMap::new(),
            schema: DocumentSchema::default(),
            bonus_style: BonusStyle::default(),
            indent: "  ".to_string(),
        }
    }
}

impl MigrationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| MigrationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Explicit path first, then `ARMORER_CONFIG`, then built-in defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) if !path.is_empty() => Self::load(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = MigrationConfig::from_yaml("").unwrap();
        assert_eq!(config, MigrationConfig::default());
        assert_eq!(config.layout.variant_row, 22);
        assert_eq!(config.weapon_overrides["2HAxe"], "2H AXE");
        assert!(config.offhand_families.contains("ParryingDagger"));
        assert_eq!(config.scrolls["TeleportationScroll"], None);
    }

    #[test]
    fn partial_yaml_overrides_only_given_fields() {
        let yaml = r#"
workbook: balance.xlsx
bonus_style: attribute
shield:
  value: -25
layout:
  variant_row: 30
stat_names:
  Lifesteal: LifeSteal
  "Crit;Crit Power": [Critical, CriticalPower]
"#;
        let config = MigrationConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.workbook, PathBuf::from("balance.xlsx"));
        assert_eq!(config.bonus_style, BonusStyle::Attribute);
        assert_eq!(config.shield.value, -25);
        assert_eq!(config.shield.stat, "Dodge");
        assert_eq!(config.layout.variant_row, 30);
        assert_eq!(config.layout.tier_header_row, 8);
        assert_eq!(
            config.stat_names["Crit;Crit Power"],
            StatTarget::Composite(vec!["Critical".into(), "CriticalPower".into()])
        );
        assert_eq!(config.stat_names["Lifesteal"], StatTarget::Single("LifeSteal".into()));
    }

    #[test]
    fn shield_rule_matches_case_insensitively() {
        let rule = ShieldRule::default();
        assert!(rule.applies_to("war shield"));
        assert!(!rule.applies_to("Pistol"));
    }
}
