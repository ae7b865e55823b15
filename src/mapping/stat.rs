//! Spreadsheet stat names → document stat identifiers, and the
//! composite-aware value lookup in a tier bonus row.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mapping::key::StatKey;
use crate::tables::bonus::{BonusRow, BonusValue};

/// Document-side identifier(s) for one spreadsheet stat key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatTarget {
    Single(String),
    Composite(Vec<String>),
}

const BUILTIN_STATS: &[(&str, &str)] = &[
    ("Momentum", "MomentumAttacks"),
    ("Opportunism", "OpportunisticAttacks"),
    ("Isolation", "IsolatedAttacks"),
    ("Physical Damage", "PhysicalDamage"),
    ("Ranged Damage", "RangedDamage"),
    ("Magic Damage", "MagicalDamage"),
    ("Skill Range", "SkillRangeModifier"),
    ("Move Points", "MovePointsTotal"),
    ("Dodge", "Dodge"),
    ("Stun Chance", "StunChanceModifier"),
    ("XP gain", "ExperienceGainMultiplier"),
    ("Block", "Block"),
    ("Health", "HealthTotal"),
    ("Health Regen", "HealthRegen"),
    ("Mana", "ManaTotal"),
    ("Mana Regen", "ManaRegen"),
    ("Reliability", "Reliability"),
    ("Critical Power", "CriticalPower"),
    ("Critical", "Critical"),
    ("Poison Damage", "PoisonDamageModifier"),
    ("Accuracy", "Accuracy"),
    ("Armor", "ArmorTotal"),
    ("Resistance", "Resistance"),
    ("Resistance Reduction", "ResistanceReduction"),
    ("Resistance reduction", "ResistanceReduction"),
    ("Propagation Bounces", "PropagationBouncesModifier"),
    ("Propagation Damage", "PropagationDamage"),
];

const BUILTIN_COMPOSITES: &[(&str, &[&str])] = &[
    ("Health;Health Regen", &["HealthTotal", "HealthRegen"]),
    ("Move Points;Dodge", &["MovePointsTotal", "Dodge"]),
    ("Armor;Resistance", &["ArmorTotal", "Resistance"]),
    ("Mana;Mana Regen", &["ManaTotal", "ManaRegen"]),
];

/// Closed vocabulary of stat names. Unknown names resolve to `None` and the
/// caller drops that stat.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameMapping {
    entries: BTreeMap<StatKey, StatTarget>,
}

impl NameMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// The curated production vocabulary, with lower-cased duplicates.
    pub fn builtin() -> Self {
        let mut mapping = Self::new();
        for (name, id) in BUILTIN_STATS {
            mapping.insert(StatKey::parse(name), StatTarget::Single(id.to_string()));
        }
        for (name, ids) in BUILTIN_COMPOSITES {
            mapping.insert(
                StatKey::parse(name),
                StatTarget::Composite(ids.iter().map(|id| id.to_string()).collect()),
            );
        }
        mapping.with_lowercase_aliases()
    }

    pub fn insert(&mut self, key: StatKey, target: StatTarget) {
        self.entries.insert(key, target);
    }

    /// Layer extra mappings (e.g. from config) over this one.
    pub fn extend<I>(&mut self, extra: I)
    where
        I: IntoIterator<Item = (StatKey, StatTarget)>,
    {
        for (key, target) in extra {
            self.entries.insert(key.to_lowercase(), target.clone());
            self.entries.insert(key, target);
        }
    }

    fn with_lowercase_aliases(mut self) -> Self {
        let aliases: Vec<(StatKey, StatTarget)> = self
            .entries
            .iter()
            .map(|(key, target)| (key.to_lowercase(), target.clone()))
            .collect();
        for (key, target) in aliases {
            self.entries.entry(key).or_insert(target);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exact match first, then case-insensitive.
    pub fn resolve(&self, key: &StatKey) -> Option<&StatTarget> {
        if let Some(target) = self.entries.get(key) {
            return Some(target);
        }
        self.entries
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_case(key))
            .map(|(_, target)| target)
    }
}

/// Value of `key` in a tier row.
///
/// Order: exact header, case-insensitive header, then, for a single stat name,
/// the matching component of a composite header (`Health` in
/// `Health;Health Regen` → first value of `"40;8"`).
pub fn find_stat_value(key: &StatKey, row: &BonusRow) -> Option<BonusValue> {
    if let Some(value) = row.get(key) {
        return Some(value.clone());
    }
    if let Some((_, value)) = row.iter().find(|(header, _)| header.eq_ignore_case(key)) {
        return Some(value.clone());
    }
    let [name] = key.parts() else {
        return None;
    };
    for (header, value) in row.iter().filter(|(header, _)| header.is_composite()) {
        if let Some(index) = header.position_of(name) {
            let values = value.values();
            if let Some(v) = values.get(index) {
                return Some(BonusValue::Number(*v as f64));
            }
        }
    }
    None
}
