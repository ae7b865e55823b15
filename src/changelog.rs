//! Audit trail of every field the patcher touched. Written as JSON, or as CSV
//! when the target path ends in `.csv`.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Damage,
    DamageRemoved,
    Bonuses,
    BonusesRemoved,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Damage => "damage",
            Self::DamageRemoved => "damage_removed",
            Self::Bonuses => "bonuses",
            Self::BonusesRemoved => "bonuses_removed",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub document: String,
    pub record_id: String,
    pub level: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spreadsheet_level: Option<i32>,
    pub old: String,
    pub new: String,
}

impl fmt::Display for ChangeRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} level {} {}: {} -> {}",
            self.record_id, self.level, self.kind, self.old, self.new
        )
    }
}

pub fn write_change_log(path: &Path, records: &[ChangeRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MigrationError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let is_csv = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    let payload = if is_csv {
        to_csv(records)?
    } else {
        serde_json::to_string_pretty(records)?
    };
    fs::write(path, payload).map_err(|source| MigrationError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), records = records.len(), "change log written");
    Ok(())
}

fn to_csv(records: &[ChangeRecord]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "document",
        "record_id",
        "level",
        "kind",
        "spreadsheet_level",
        "old",
        "new",
    ])?;
    for record in records {
        let kind = record.kind.to_string();
        let spreadsheet_level = record
            .spreadsheet_level
            .map(|l| l.to_string())
            .unwrap_or_default();
        writer.write_record([
            record.document.as_str(),
            record.record_id.as_str(),
            record.level.as_str(),
            kind.as_str(),
            spreadsheet_level.as_str(),
            record.old.as_str(),
            record.new.as_str(),
        ])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| MigrationError::Io(err.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}
