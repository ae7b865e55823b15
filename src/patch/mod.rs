//! In-place patching of item-definition documents against the lookup tables.

pub mod bonuses;
pub mod damage;
pub mod record;
pub mod safety;
mod scrolls;

use std::collections::BTreeMap;

use crate::changelog::{ChangeKind, ChangeRecord};
use crate::config::MigrationConfig;
use crate::mapping::{WeaponMatch, WeaponResolver};
use crate::tables::MigrationTables;
use crate::xml::{Document, Element};

pub use bonuses::{apply_bonuses, compute_bonuses, BonusEdit, StatBonus};
pub use damage::{update_damage, DamageEdit};
pub use record::{family, variant_id, LevelMapping};
pub use safety::check_write_safety;

/// Everything the patcher reads; nothing in here is mutated while patching.
#[derive(Debug, Clone, Copy)]
pub struct PatchContext<'a> {
    pub tables: &'a MigrationTables,
    pub resolver: &'a WeaponResolver,
    pub config: &'a MigrationConfig,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedFamily {
    pub family: String,
    pub example_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousFamily {
    pub family: String,
    pub chosen: WeaponMatch,
}

/// Outcome of patching one document tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    pub document: String,
    pub records: usize,
    pub damage_updates: usize,
    pub damage_removals: usize,
    pub bonus_updates: usize,
    pub bonus_removals: usize,
    pub unresolved: Vec<UnresolvedFamily>,
    pub ambiguous: Vec<AmbiguousFamily>,
    pub changes: Vec<ChangeRecord>,
}

impl PatchReport {
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            ..Self::default()
        }
    }

    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    pub(crate) fn note_unresolved(&mut self, family: &str, record_id: &str) {
        if self.unresolved.iter().any(|u| u.family == family) {
            return;
        }
        tracing::warn!(document = %self.document, family, example = record_id, "no sheet matches weapon family");
        self.unresolved.push(UnresolvedFamily {
            family: family.to_string(),
            example_id: record_id.to_string(),
        });
    }

    fn note_ambiguous(&mut self, family: &str, chosen: &WeaponMatch) {
        if self.ambiguous.iter().any(|a| a.family == family) {
            return;
        }
        self.ambiguous.push(AmbiguousFamily {
            family: family.to_string(),
            chosen: chosen.clone(),
        });
    }

    pub(crate) fn push_change(&mut self, change: ChangeRecord) {
        tracing::debug!(document = %self.document, change = %change, "applied");
        self.changes.push(change);
    }
}

/// Patch every item record of `doc` in place.
///
/// Records are found at any depth below the root. Ids without a trailing
/// digit are skipped, scroll ids take their own path, and off-hand families
/// receive damage only.
pub fn patch_document(doc: &mut Document, document: &str, ctx: &PatchContext<'_>) -> PatchReport {
    let schema = &ctx.config.schema;
    let mut report = PatchReport::new(document);
    report.records = doc.root.count_named(&schema.record);
    let mut resolved: BTreeMap<String, Option<WeaponMatch>> = BTreeMap::new();

    doc.root.for_each_named_mut(&schema.record, &mut |record| {
        let Some(record_id) = record.attr(&schema.record_id).map(str::to_string) else {
            return;
        };
        if let Some(source) = ctx.config.scrolls.get(&record_id) {
            scrolls::patch_scroll(record, &record_id, source.as_deref(), ctx, &mut report);
            return;
        }
        let Some(variant) = variant_id(&record_id) else {
            return;
        };
        let family = family(&record_id);
        let found = resolved
            .entry(family.to_string())
            .or_insert_with(|| ctx.resolver.resolve(family));
        let Some(found) = found.as_ref() else {
            report.note_unresolved(family, &record_id);
            return;
        };
        if found.is_ambiguous() {
            report.note_ambiguous(family, found);
        }
        let offhand = ctx.config.offhand_families.contains(family);
        patch_weapon(record, &record_id, variant, offhand, &found.sheet, ctx, &mut report);
    });

    tracing::info!(
        document,
        records = report.records,
        damage = report.damage_updates,
        bonuses = report.bonus_updates,
        bonus_removals = report.bonus_removals,
        unresolved = report.unresolved.len(),
        "document patched"
    );
    report
}

fn patch_weapon(
    record: &mut Element,
    record_id: &str,
    variant: u8,
    offhand: bool,
    sheet: &str,
    ctx: &PatchContext<'_>,
    report: &mut PatchReport,
) {
    let schema = &ctx.config.schema;
    let mapping = LevelMapping::for_record(variant, offhand);
    let Some(levels) = record.child_mut(&schema.levels) else {
        return;
    };
    for level in levels.elements_mut().filter(|e| e.name == schema.level) {
        let level_id = level.attr(&schema.level_id).unwrap_or_default().to_string();
        let Some(doc_level) = record::parse_level(&level_id) else {
            continue;
        };

        let Some(sheet_level) = mapping.spreadsheet_level(doc_level) else {
            tracing::warn!(record = record_id, level = %level_id, "level id has no spreadsheet level, skipping");
            continue;
        };
        if let Some(range) = ctx.tables.damage.get(sheet, sheet_level) {
            if let Some(edit) = update_damage(level, range, schema) {
                report.damage_updates += 1;
                report.push_change(ChangeRecord {
                    document: report.document.clone(),
                    record_id: record_id.to_string(),
                    level: level_id.clone(),
                    kind: ChangeKind::Damage,
                    spreadsheet_level: Some(sheet_level),
                    old: edit.old,
                    new: edit.new,
                });
            }
        }

        if offhand {
            continue;
        }
        let Some(bonuses) = compute_bonuses(ctx.tables, &ctx.config.shield, sheet, variant, doc_level)
        else {
            continue;
        };
        let (kind, old, new) = match apply_bonuses(level, &bonuses, schema, ctx.config.bonus_style) {
            None => continue,
            Some(BonusEdit::Replaced { old, new }) => {
                report.bonus_updates += 1;
                (ChangeKind::Bonuses, old, new)
            }
            Some(BonusEdit::Removed { old }) => {
                report.bonus_removals += 1;
                (ChangeKind::BonusesRemoved, old, "None".to_string())
            }
        };
        report.push_change(ChangeRecord {
            document: report.document.clone(),
            record_id: record_id.to_string(),
            level: level_id,
            kind,
            spreadsheet_level: None,
            old,
            new,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::mapping::{NameMapping, StatKey};
    use crate::tables::{BonusRow, BonusValue, DamageRange, TierBonuses};
    use crate::xml::parse_document;

    fn tables() -> MigrationTables {
        let mut tables = MigrationTables {
            stat_names: NameMapping::builtin(),
            ..MigrationTables::default()
        };
        let mut pistol = BTreeMap::new();
        pistol.insert(-1, DamageRange { min: 1, max: 2 });
        pistol.insert(0, DamageRange { min: 3, max: 6 });
        pistol.insert(1, DamageRange { min: 4, max: 8 });
        tables.damage.insert_sheet("Pistol", pistol);

        let mut variants = BTreeMap::new();
        variants.insert(2, StatKey::parse("Move Points;Dodge"));
        tables.variants.insert_sheet("Pistol", variants);

        let mut row = BonusRow::new();
        row.insert(StatKey::parse("Move Points;Dodge"), BonusValue::Composite(vec![7, 2]));
        let mut levels = BTreeMap::new();
        levels.insert(1, row);
        tables.bonuses.tier1 = TierBonuses { levels };
        tables
    }

    fn patch(src: &str, config: &MigrationConfig) -> (Document, PatchReport) {
        let tables = tables();
        let resolver = tables.weapon_resolver(config);
        let ctx = PatchContext {
            tables: &tables,
            resolver: &resolver,
            config,
        };
        let mut doc = parse_document(src).unwrap();
        let report = patch_document(&mut doc, "Weapons", &ctx);
        (doc, report)
    }

    fn damage_of(doc: &Document, id: &str) -> (String, String) {
        let mut found = None;
        let mut root = doc.root.clone();
        root.for_each_named_mut("ItemDefinition", &mut |r| {
            if r.attr("Id") == Some(id) {
                let d = r
                    .child("LevelVariations")
                    .and_then(|l| l.child("Level"))
                    .and_then(|l| l.child("BaseDamage"))
                    .unwrap();
                found = Some((
                    d.attr("Min").unwrap_or_default().to_string(),
                    d.attr("Max").unwrap_or_default().to_string(),
                ));
            }
        });
        found.unwrap()
    }

    const DOC: &str = r#"<Items>
  <ItemDefinition Id="Pistol0"><LevelVariations><Level Id="1"><BaseDamage Min="0" Max="0"/></Level></LevelVariations></ItemDefinition>
  <ItemDefinition Id="Pistol2"><LevelVariations><Level Id="1"><BaseDamage Min="0" Max="0"/></Level></LevelVariations></ItemDefinition>
  <ItemDefinition Id="DuelingPistol0"><LevelVariations><Level Id="1"><BaseDamage Min="0" Max="0"/><BaseStatBonuses><BaseStatBonus Stat="Dodge">3</BaseStatBonus></BaseStatBonuses></Level></LevelVariations></ItemDefinition>
  <ItemDefinition Id="Lantern"/>
  <ItemDefinition Id="Banjo2"/>
</Items>"#;

    #[test]
    fn applies_level_regimes_and_bonuses() {
        let mut config = MigrationConfig::default();
        config.weapon_overrides.insert("DuelingPistol".into(), "Pistol".into());
        let (doc, report) = patch(DOC, &config);

        assert_eq!(report.records, 5);
        assert_eq!(damage_of(&doc, "Pistol0"), ("3".into(), "6".into()));
        assert_eq!(damage_of(&doc, "Pistol2"), ("4".into(), "8".into()));
        assert_eq!(damage_of(&doc, "DuelingPistol0"), ("4".into(), "8".into()));
        assert_eq!(report.damage_updates, 3);
        assert_eq!(report.bonus_updates, 1);
        assert_eq!(report.bonus_removals, 0);

        let bonus = report
            .changes
            .iter()
            .find(|c| c.kind == ChangeKind::Bonuses)
            .unwrap();
        assert_eq!(bonus.record_id, "Pistol2");
        assert_eq!(bonus.new, "MovePointsTotal=7, Dodge=2");
        assert_eq!(
            report.unresolved,
            vec![UnresolvedFamily {
                family: "Banjo".into(),
                example_id: "Banjo2".into()
            }]
        );
    }

    #[test]
    fn offhand_bonus_block_is_untouched() {
        let mut config = MigrationConfig::default();
        config.weapon_overrides.insert("DuelingPistol".into(), "Pistol".into());
        let (doc, _) = patch(DOC, &config);
        let mut root = doc.root.clone();
        let mut kept = false;
        root.for_each_named_mut("ItemDefinition", &mut |r| {
            if r.attr("Id") == Some("DuelingPistol0") {
                kept = r
                    .child("LevelVariations")
                    .and_then(|l| l.child("Level"))
                    .and_then(|l| l.child("BaseStatBonuses"))
                    .is_some();
            }
        });
        assert!(kept);
    }

    #[test]
    fn second_pass_changes_nothing() {
        let config = MigrationConfig::default();
        let (doc, first) = patch(DOC, &config);
        assert!(first.has_changes());
        let tables = tables();
        let resolver = tables.weapon_resolver(&config);
        let ctx = PatchContext {
            tables: &tables,
            resolver: &resolver,
            config: &config,
        };
        let mut again = doc.clone();
        let second = patch_document(&mut again, "Weapons", &ctx);
        assert!(!second.has_changes());
        assert_eq!(again, doc);
    }

    #[test]
    fn lowest_level_id_on_base_variant_is_skipped() {
        let src = r#"<Items>
  <ItemDefinition Id="Pistol0"><LevelVariations><Level Id="-2147483648"><BaseDamage Min="9" Max="9"/></Level></LevelVariations></ItemDefinition>
</Items>"#;
        let (doc, report) = patch(src, &MigrationConfig::default());
        assert_eq!(report.records, 1);
        assert!(!report.has_changes());
        assert_eq!(damage_of(&doc, "Pistol0"), ("9".into(), "9".into()));
    }
}
