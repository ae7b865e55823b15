//! Stat bonus computation for variant records and the rewrite of a level's
//! bonus block.

use std::fmt;

use crate::config::{BonusStyle, DocumentSchema, ShieldRule};
use crate::mapping::{find_stat_value, StatKey, StatTarget};
use crate::tables::{BonusRow, MigrationTables, Tier};
use crate::xml::{Element, Node};

/// Highest variant id covered by the bonus scheme.
const LAST_SCHEME_VARIANT: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatBonus {
    pub stat: String,
    pub value: i64,
}

impl StatBonus {
    pub fn new(stat: impl Into<String>, value: i64) -> Self {
        Self {
            stat: stat.into(),
            value,
        }
    }
}

impl fmt::Display for StatBonus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.stat, self.value)
    }
}

/// Bonus entry as found in a document, value kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistingBonus {
    pub stat: String,
    pub value: String,
}

/// Complete bonus set for one level of a record, or `None` when the variant
/// is outside the scheme and its bonus block must be left untouched.
///
/// Variants 0 and 1 get nothing but the shield penalty; 2-5 read their
/// stat list from the variant map and their values from the tier table.
pub fn compute_bonuses(
    tables: &MigrationTables,
    shield: &ShieldRule,
    sheet: &str,
    variant_id: u8,
    level: i32,
) -> Option<Vec<StatBonus>> {
    if variant_id > LAST_SCHEME_VARIANT {
        return None;
    }
    let mut bonuses = match Tier::for_variant(variant_id) {
        Some(tier) => generated_bonuses(tables, sheet, variant_id, tier, level),
        None => Vec::new(),
    };
    if shield.applies_to(sheet) {
        enforce_shield(&mut bonuses, shield);
    }
    Some(bonuses)
}

fn generated_bonuses(
    tables: &MigrationTables,
    sheet: &str,
    variant_id: u8,
    tier: Tier,
    level: i32,
) -> Vec<StatBonus> {
    let mut bonuses = Vec::new();
    let Some(key) = tables.variants.stats_for(sheet, variant_id) else {
        return bonuses;
    };
    let Some(row) = tables.bonuses.row(tier, i64::from(level)) else {
        return bonuses;
    };

    if key.is_composite() {
        if let Some(target) = tables.stat_names.resolve(key) {
            emit(key, target, row, &mut bonuses);
            return bonuses;
        }
    }
    for part in key.parts() {
        let part_key = StatKey::single(part);
        match tables.stat_names.resolve(&part_key) {
            Some(target) => emit(&part_key, target, row, &mut bonuses),
            None => tracing::debug!(sheet, stat = %part, "stat name has no document mapping"),
        }
    }
    bonuses
}

fn emit(key: &StatKey, target: &StatTarget, row: &BonusRow, out: &mut Vec<StatBonus>) {
    let Some(value) = find_stat_value(key, row) else {
        return;
    };
    let values = value.values();
    match target {
        StatTarget::Single(stat) => {
            if let Some(first) = values.first() {
                out.push(StatBonus::new(stat.as_str(), *first));
            }
        }
        StatTarget::Composite(stats) => {
            for (stat, v) in stats.iter().zip(values) {
                out.push(StatBonus::new(stat.as_str(), v));
            }
        }
    }
}

/// Every entry for the penalty stat is pinned to the penalty value; one is
/// appended if none exists.
pub fn enforce_shield(bonuses: &mut Vec<StatBonus>, shield: &ShieldRule) {
    let mut found = false;
    for bonus in bonuses.iter_mut().filter(|b| b.stat == shield.stat) {
        bonus.value = shield.value;
        found = true;
    }
    if !found {
        bonuses.push(StatBonus::new(shield.stat.as_str(), shield.value));
    }
}

/// Entries of a bonus block, reading the value from the text content or,
/// failing that, the value attribute.
pub fn read_bonuses(block: &Element, schema: &DocumentSchema) -> Vec<ExistingBonus> {
    block
        .children_named(&schema.bonus)
        .map(|entry| {
            let text = entry.text();
            let value = match text.trim() {
                "" => entry.attr(&schema.bonus_value).unwrap_or_default().trim().to_string(),
                trimmed => trimmed.to_string(),
            };
            ExistingBonus {
                stat: entry.attr(&schema.bonus_stat).unwrap_or_default().to_string(),
                value,
            }
        })
        .collect()
}

fn same_bonuses(existing: &[ExistingBonus], computed: &[StatBonus]) -> bool {
    existing.len() == computed.len()
        && existing.iter().zip(computed).all(|(old, new)| {
            old.stat == new.stat
                && old
                    .value
                    .parse::<f64>()
                    .map(|v| v == new.value as f64)
                    .unwrap_or(false)
        })
}

pub fn build_block(bonuses: &[StatBonus], schema: &DocumentSchema, style: BonusStyle) -> Element {
    let mut block = Element::new(schema.bonuses.as_str());
    for bonus in bonuses {
        let entry = Element::new(schema.bonus.as_str()).with_attr(&schema.bonus_stat, bonus.stat.as_str());
        let entry = match style {
            BonusStyle::Text => entry.with_text(bonus.value.to_string()),
            BonusStyle::Attribute => entry.with_attr(&schema.bonus_value, bonus.value.to_string()),
        };
        block.children.push(Node::Element(entry));
    }
    block
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BonusEdit {
    Replaced { old: String, new: String },
    Removed { old: String },
}

/// Replace the level's bonus block in place (appending when absent), or drop
/// it when `bonuses` is empty. Equal blocks are left as they are.
pub fn apply_bonuses(
    level: &mut Element,
    bonuses: &[StatBonus],
    schema: &DocumentSchema,
    style: BonusStyle,
) -> Option<BonusEdit> {
    let position = level.position_of(&schema.bonuses);
    let existing = position
        .and_then(|i| level.children[i].as_element())
        .map(|block| read_bonuses(block, schema));

    match (position, existing) {
        (None, _) if bonuses.is_empty() => None,
        (Some(_), Some(old)) if bonuses.is_empty() => {
            level.remove_children_named(&schema.bonuses);
            Some(BonusEdit::Removed {
                old: render_existing(&old),
            })
        }
        (Some(_), Some(old)) if same_bonuses(&old, bonuses) => None,
        (position, old) => {
            let old = old.map(|o| render_existing(&o)).unwrap_or_else(|| "None".to_string());
            level.remove_children_named(&schema.bonuses);
            let block = Node::Element(build_block(bonuses, schema, style));
            match position {
                Some(index) => level.children.insert(index.min(level.children.len()), block),
                None => level.children.push(block),
            }
            Some(BonusEdit::Replaced {
                old,
                new: render_bonuses(bonuses),
            })
        }
    }
}

pub fn render_bonuses(bonuses: &[StatBonus]) -> String {
    if bonuses.is_empty() {
        return "None".to_string();
    }
    bonuses.iter().map(StatBonus::to_string).collect::<Vec<_>>().join(", ")
}

fn render_existing(bonuses: &[ExistingBonus]) -> String {
    if bonuses.is_empty() {
        return "None".to_string();
    }
    bonuses
        .iter()
        .map(|b| format!("{}={}", b.stat, b.value))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::mapping::NameMapping;
    use crate::tables::{BonusValue, TierBonuses};

    fn tables() -> MigrationTables {
        let mut tables = MigrationTables {
            stat_names: NameMapping::builtin(),
            ..MigrationTables::default()
        };
        let mut variants = BTreeMap::new();
        variants.insert(2, StatKey::parse("Move Points;Dodge"));
        variants.insert(3, StatKey::parse("Health"));
        variants.insert(4, StatKey::parse("Critical;Teleport Range"));
        tables.variants.insert_sheet("Pistol", variants);

        let mut row = BonusRow::new();
        row.insert(StatKey::parse("Move Points;Dodge"), BonusValue::Composite(vec![7, 2]));
        row.insert(StatKey::parse("Health;Health Regen"), BonusValue::Composite(vec![40, 8]));
        row.insert(StatKey::parse("Critical"), BonusValue::Number(5.9));
        let mut levels = BTreeMap::new();
        levels.insert(0, row);
        tables.bonuses.tier1 = TierBonuses { levels: levels.clone() };
        tables.bonuses.tier2 = TierBonuses { levels };
        tables
    }

    #[test]
    fn composite_variant_key_emits_positionally() {
        let bonuses = compute_bonuses(&tables(), &ShieldRule::default(), "Pistol", 2, 0).unwrap();
        assert_eq!(
            bonuses,
            vec![StatBonus::new("MovePointsTotal", 7), StatBonus::new("Dodge", 2)]
        );
    }

    #[test]
    fn single_stat_reads_component_of_composite_header() {
        let bonuses = compute_bonuses(&tables(), &ShieldRule::default(), "Pistol", 3, 0).unwrap();
        assert_eq!(bonuses, vec![StatBonus::new("HealthTotal", 40)]);
    }

    #[test]
    fn unmapped_parts_are_dropped_and_numbers_truncate() {
        let bonuses = compute_bonuses(&tables(), &ShieldRule::default(), "Pistol", 4, 0).unwrap();
        assert_eq!(bonuses, vec![StatBonus::new("Critical", 5)]);
    }

    #[test]
    fn base_variants_get_nothing_and_high_digits_are_untouched() {
        let shield = ShieldRule::default();
        assert_eq!(compute_bonuses(&tables(), &shield, "Pistol", 0, 0), Some(vec![]));
        assert_eq!(compute_bonuses(&tables(), &shield, "Pistol", 1, 0), Some(vec![]));
        assert_eq!(compute_bonuses(&tables(), &shield, "Pistol", 7, 0), None);
        assert_eq!(compute_bonuses(&tables(), &shield, "Pistol", 2, 9), Some(vec![]));
    }

    #[test]
    fn shield_penalty_overrides_and_appends() {
        let shield = ShieldRule::default();
        let mut bonuses = vec![StatBonus::new("Dodge", 2), StatBonus::new("Dodge", 4)];
        enforce_shield(&mut bonuses, &shield);
        assert!(bonuses.iter().all(|b| b.value == -20));

        assert_eq!(
            compute_bonuses(&tables(), &shield, "War Shield", 0, 0),
            Some(vec![StatBonus::new("Dodge", -20)])
        );
    }

    #[test]
    fn reads_text_and_attribute_values() {
        let schema = DocumentSchema::default();
        let block = Element::new("BaseStatBonuses")
            .with_child(Element::new("BaseStatBonus").with_attr("Stat", "Dodge").with_text(" 2 "))
            .with_child(
                Element::new("BaseStatBonus")
                    .with_attr("Stat", "MovePointsTotal")
                    .with_attr("Value", "7"),
            );
        let read = read_bonuses(&block, &schema);
        assert_eq!(read[0], ExistingBonus { stat: "Dodge".into(), value: "2".into() });
        assert_eq!(read[1], ExistingBonus { stat: "MovePointsTotal".into(), value: "7".into() });
    }

    #[test]
    fn replaces_block_in_place_and_skips_equal_blocks() {
        let schema = DocumentSchema::default();
        let mut level = Element::new("Level")
            .with_child(Element::new("BaseDamage"))
            .with_child(
                Element::new("BaseStatBonuses").with_child(
                    Element::new("BaseStatBonus").with_attr("Stat", "Dodge").with_attr("Value", "1"),
                ),
            )
            .with_child(Element::new("Tail"));
        let new = vec![StatBonus::new("Dodge", 2)];
        let edit = apply_bonuses(&mut level, &new, &schema, BonusStyle::Text).unwrap();
        assert_eq!(
            edit,
            BonusEdit::Replaced {
                old: "Dodge=1".into(),
                new: "Dodge=2".into()
            }
        );
        assert_eq!(level.position_of("BaseStatBonuses"), Some(1));
        let entry = level.child("BaseStatBonuses").unwrap().child("BaseStatBonus").unwrap();
        assert_eq!(entry.text(), "2");

        assert_eq!(apply_bonuses(&mut level, &new, &schema, BonusStyle::Attribute), None);
    }

    #[test]
    fn empty_set_removes_block_and_appends_when_missing() {
        let schema = DocumentSchema::default();
        let mut level = Element::new("Level").with_child(Element::new("BaseStatBonuses"));
        assert_eq!(
            apply_bonuses(&mut level, &[], &schema, BonusStyle::Text),
            Some(BonusEdit::Removed { old: "None".into() })
        );
        assert!(level.children.is_empty());
        assert_eq!(apply_bonuses(&mut level, &[], &schema, BonusStyle::Text), None);

        let edit = apply_bonuses(&mut level, &[StatBonus::new("Dodge", -20)], &schema, BonusStyle::Attribute);
        assert!(matches!(edit, Some(BonusEdit::Replaced { ref old, .. }) if old == "None"));
        let entry = level.child("BaseStatBonuses").unwrap().child("BaseStatBonus").unwrap();
        assert_eq!(entry.attr("Value"), Some("-20"));
    }
}
