//! Batch driver: one document at a time, failures isolated per file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::changelog::ChangeRecord;
use crate::error::{MigrationError, Result};
use crate::patch::{check_write_safety, patch_document, PatchContext, PatchReport};
use crate::xml::{parse_document, reformat, write_document, ReformatOptions};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Run every step, safety checks included, but write nothing.
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    pub path: PathBuf,
    pub patch: PatchReport,
    pub original_bytes: usize,
    pub output_bytes: usize,
    pub written: bool,
}

#[derive(Debug)]
pub struct DocumentFailure {
    pub path: PathBuf,
    pub error: MigrationError,
}

#[derive(Debug, Default)]
pub struct RunReport {
    pub documents: Vec<DocumentReport>,
    pub failures: Vec<DocumentFailure>,
}

impl RunReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn changes(&self) -> impl Iterator<Item = &ChangeRecord> {
        self.documents.iter().flat_map(|d| d.patch.changes.iter())
    }
}

/// Display name used in reports: the file stem.
pub fn document_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read, patch, reformat, serialize and check one document, then write it
/// back unless this is a dry run. Nothing is written when any step fails.
pub fn process_document(
    path: &Path,
    ctx: &PatchContext<'_>,
    options: RunOptions,
) -> Result<DocumentReport> {
    let original = fs::read_to_string(path).map_err(|source| MigrationError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut doc = parse_document(&original)?;

    let patch = patch_document(&mut doc, &document_name(path), ctx);

    reformat(
        &mut doc,
        &ReformatOptions {
            indent: ctx.config.indent.clone(),
            record: ctx.config.schema.record.clone(),
        },
    );
    let serialized = write_document(&doc)?;
    let records = doc.root.count_named(&ctx.config.schema.record);
    check_write_safety(records, original.len(), serialized.len())?;

    let written = !options.dry_run && serialized != original;
    if written {
        fs::write(path, &serialized).map_err(|source| MigrationError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    Ok(DocumentReport {
        path: path.to_path_buf(),
        patch,
        original_bytes: original.len(),
        output_bytes: serialized.len(),
        written,
    })
}

/// Process each document in order. A failing document is recorded and
/// skipped; the rest of the batch still runs.
pub fn run_documents<P: AsRef<Path>>(
    paths: &[P],
    ctx: &PatchContext<'_>,
    options: RunOptions,
) -> RunReport {
    let mut report = RunReport::default();
    for path in paths {
        let path = path.as_ref();
        match process_document(path, ctx, options) {
            Ok(document) => {
                tracing::info!(
                    path = %path.display(),
                    changes = document.patch.changes.len(),
                    bytes = document.output_bytes,
                    written = document.written,
                    "document processed"
                );
                report.documents.push(document);
            }
            Err(error) => {
                tracing::error!(path = %path.display(), %error, "document aborted, nothing written");
                report.failures.push(DocumentFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }
    report
}
