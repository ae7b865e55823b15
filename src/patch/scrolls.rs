//! Scroll items borrow their damage from a weapon sheet, level for level, or
//! lose their damage entirely when they have no source.

use crate::changelog::{ChangeKind, ChangeRecord};
use crate::patch::damage::{remove_damage, update_damage};
use crate::patch::record::{parse_level, LevelMapping};
use crate::patch::{PatchContext, PatchReport};
use crate::xml::Element;

pub(crate) fn patch_scroll(
    record: &mut Element,
    record_id: &str,
    source_sheet: Option<&str>,
    ctx: &PatchContext<'_>,
    report: &mut PatchReport,
) {
    let schema = &ctx.config.schema;
    if let Some(sheet) = source_sheet {
        if !ctx.tables.damage.contains_sheet(sheet) {
            report.note_unresolved(sheet, record_id);
            return;
        }
    }
    let Some(levels) = record.child_mut(&schema.levels) else {
        return;
    };
    for level in levels.elements_mut().filter(|e| e.name == schema.level) {
        let level_id = level.attr(&schema.level_id).unwrap_or_default().to_string();
        match source_sheet {
            None => {
                for old in remove_damage(level, schema) {
                    report.damage_removals += 1;
                    report.push_change(ChangeRecord {
                        document: report.document.clone(),
                        record_id: record_id.to_string(),
                        level: level_id.clone(),
                        kind: ChangeKind::DamageRemoved,
                        spreadsheet_level: None,
                        old,
                        new: "None".to_string(),
                    });
                }
            }
            Some(sheet) => {
                let Some(doc_level) = parse_level(&level_id) else {
                    continue;
                };
                let Some(sheet_level) = LevelMapping::Direct.spreadsheet_level(doc_level) else {
                    continue;
                };
                let Some(range) = ctx.tables.damage.get(sheet, sheet_level) else {
                    continue;
                };
                if let Some(edit) = update_damage(level, range, schema) {
                    report.damage_updates += 1;
                    report.push_change(ChangeRecord {
                        document: report.document.clone(),
                        record_id: record_id.to_string(),
                        level: level_id,
                        kind: ChangeKind::Damage,
                        spreadsheet_level: Some(sheet_level),
                        old: edit.old,
                        new: edit.new,
                    });
                }
            }
        }
    }
}
