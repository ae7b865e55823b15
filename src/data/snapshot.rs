//! Mapping snapshot: the built tables persisted as JSON so the patch phase can
//! run without re-reading the workbook.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MigrationError, Result};
use crate::tables::MigrationTables;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingSnapshot {
    #[serde(default)]
    pub source_workbook: Option<String>,
    #[serde(default)]
    pub generated_at: Option<String>,
    pub tables: MigrationTables,
}

impl MappingSnapshot {
    pub fn new(tables: MigrationTables, source_workbook: Option<&Path>) -> Self {
        Self {
            source_workbook: source_workbook.map(|p| p.display().to_string()),
            generated_at: Some(chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()),
            tables,
        }
    }
}

pub fn save_snapshot(path: &Path, snapshot: &MappingSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| MigrationError::Write {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let payload = serde_json::to_string_pretty(snapshot)?;
    fs::write(path, payload).map_err(|source| MigrationError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), "mapping snapshot written");
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<MappingSnapshot> {
    let raw = fs::read_to_string(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&raw)?)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::mapping::key::StatKey;
    use crate::mapping::stat::NameMapping;
    use crate::tables::{BonusValue, DamageRange};

    #[test]
    fn snapshot_survives_disk_round_trip() {
        let mut tables = MigrationTables {
            stat_names: NameMapping::builtin(),
            ..MigrationTables::default()
        };
        let mut levels = BTreeMap::new();
        levels.insert(-1, DamageRange { min: 2, max: 4 });
        tables.damage.insert_sheet("Pistol", levels);
        tables
            .bonuses
            .tier1
            .levels
            .entry(0)
            .or_default()
            .insert(StatKey::parse("Move Points;Dodge"), BonusValue::Composite(vec![7, 2]));
        tables
            .bonuses
            .tier1
            .levels
            .entry(0)
            .or_default()
            .insert(StatKey::parse("Notes"), BonusValue::Raw("tbd".into()));
        let mut variants = BTreeMap::new();
        variants.insert(2, StatKey::parse("Dodge"));
        tables.variants.insert_sheet("Pistol", variants);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/snapshot.json");
        let snapshot = MappingSnapshot::new(tables, Some(Path::new("balance.xlsx")));
        save_snapshot(&path, &snapshot).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        pretty_assertions::assert_eq!(loaded, snapshot);
        assert_eq!(loaded.source_workbook.as_deref(), Some("balance.xlsx"));
    }

    #[test]
    fn missing_snapshot_reports_path() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/snapshot.json"));
    }
}
