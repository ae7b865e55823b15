use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use crate::changelog::write_change_log;
use crate::config::{MigrationConfig, CONFIG_ENV_VAR};
use crate::data::snapshot::{load_snapshot, save_snapshot, MappingSnapshot};
use crate::data::workbook::load_workbook;
use crate::error::Result;
use crate::patch::PatchContext;
use crate::pipeline::{document_name, run_documents, RunOptions, RunReport};
use crate::tables::{build_tables, MigrationTables};

#[derive(Debug, Parser)]
#[command(name = "armorer", author, version, about)]
pub struct Cli {
    /// YAML settings file; built-in defaults when absent.
    #[arg(long, global = true, env = CONFIG_ENV_VAR, value_name = "PATH")]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build every lookup table from the workbook and save the snapshot.
    Extract {
        #[arg(long, value_name = "PATH")]
        workbook: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Patch item documents from a snapshot or straight from the workbook.
    Patch {
        #[arg(long, value_name = "PATH", conflicts_with = "workbook")]
        snapshot: Option<PathBuf>,
        #[arg(long, value_name = "PATH")]
        workbook: Option<PathBuf>,
        #[arg(long = "change-log", value_name = "PATH")]
        change_log: Option<PathBuf>,
        #[arg(long = "dry-run")]
        dry_run: bool,
        #[arg(value_name = "DOCUMENT")]
        documents: Vec<PathBuf>,
    },
    /// Extract, save the snapshot, then patch the configured documents.
    Run {
        #[arg(long = "dry-run")]
        dry_run: bool,
    },
    /// Show which sheet each weapon family resolves to.
    Resolve {
        #[arg(long, value_name = "PATH")]
        snapshot: Option<PathBuf>,
        #[arg(required = true, value_name = "FAMILY")]
        families: Vec<String>,
    },
}

pub fn run_with_args(args: &[String]) -> i32 {
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return err.exit_code();
        }
    };
    let config = match MigrationConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match cli.command {
        Command::Extract { workbook, out } => handle_extract(&config, workbook, out),
        Command::Patch {
            snapshot,
            workbook,
            change_log,
            dry_run,
            documents,
        } => handle_patch(
            &config,
            TableSource::pick(snapshot, workbook, &config),
            change_log,
            RunOptions { dry_run },
            documents,
        ),
        Command::Run { dry_run } => handle_run(&config, RunOptions { dry_run }),
        Command::Resolve { snapshot, families } => handle_resolve(&config, snapshot, &families),
    }
}

enum TableSource {
    Snapshot(PathBuf),
    Workbook(PathBuf),
}

impl TableSource {
    fn pick(snapshot: Option<PathBuf>, workbook: Option<PathBuf>, config: &MigrationConfig) -> Self {
        match (snapshot, workbook) {
            (_, Some(workbook)) => TableSource::Workbook(workbook),
            (Some(snapshot), None) => TableSource::Snapshot(snapshot),
            (None, None) => TableSource::Snapshot(config.snapshot.clone()),
        }
    }

    fn load(&self, config: &MigrationConfig) -> Result<MigrationTables> {
        match self {
            TableSource::Snapshot(path) => Ok(load_snapshot(path)?.tables),
            TableSource::Workbook(path) => extract_tables(path, config),
        }
    }
}

fn extract_tables(workbook: &Path, config: &MigrationConfig) -> Result<MigrationTables> {
    let workbook = load_workbook(workbook)?;
    build_tables(&workbook, config)
}

fn extract_and_save(workbook: &Path, out: &Path, config: &MigrationConfig) -> Result<MigrationTables> {
    let tables = extract_tables(workbook, config)?;
    save_snapshot(out, &MappingSnapshot::new(tables.clone(), Some(workbook)))?;
    Ok(tables)
}

fn handle_extract(config: &MigrationConfig, workbook: Option<PathBuf>, out: Option<PathBuf>) -> i32 {
    let workbook = workbook.unwrap_or_else(|| config.workbook.clone());
    let out = out.unwrap_or_else(|| config.snapshot.clone());
    match extract_and_save(&workbook, &out, config) {
        Ok(tables) => {
            println!(
                "extract complete: damage_sheets={}, variant_sheets={}, stat_names={}, snapshot='{}'",
                tables.damage.sheets.len(),
                tables.variants.sheets.len(),
                tables.stat_names.len(),
                out.display()
            );
            0
        }
        Err(err) => {
            eprintln!("extract failed: {err}");
            1
        }
    }
}

fn handle_patch(
    config: &MigrationConfig,
    source: TableSource,
    change_log: Option<PathBuf>,
    options: RunOptions,
    documents: Vec<PathBuf>,
) -> i32 {
    let tables = match source.load(config) {
        Ok(tables) => tables,
        Err(err) => {
            eprintln!("failed to load mapping tables: {err}");
            return 1;
        }
    };
    let documents = if documents.is_empty() {
        config.documents.clone()
    } else {
        documents
    };
    let change_log = change_log.unwrap_or_else(|| config.change_log.clone());
    patch_all(config, &tables, &documents, &change_log, options)
}

fn handle_run(config: &MigrationConfig, options: RunOptions) -> i32 {
    let tables = match extract_and_save(&config.workbook, &config.snapshot, config) {
        Ok(tables) => tables,
        Err(err) => {
            eprintln!("extract failed: {err}");
            return 1;
        }
    };
    patch_all(config, &tables, &config.documents, &config.change_log, options)
}

fn patch_all(
    config: &MigrationConfig,
    tables: &MigrationTables,
    documents: &[PathBuf],
    change_log: &Path,
    options: RunOptions,
) -> i32 {
    let resolver = tables.weapon_resolver(config);
    let ctx = PatchContext {
        tables,
        resolver: &resolver,
        config,
    };
    let report = run_documents(documents, &ctx, options);
    print_summary(&report, options);

    if !options.dry_run {
        let changes: Vec<_> = report.changes().cloned().collect();
        if let Err(err) = write_change_log(change_log, &changes) {
            eprintln!("failed to write change log: {err}");
            return 1;
        }
    }
    if report.has_failures() {
        1
    } else {
        0
    }
}

fn print_summary(report: &RunReport, options: RunOptions) {
    for document in &report.documents {
        let patch = &document.patch;
        println!(
            "patched {}: records={}, damage={}, bonuses={}, bonus_removals={}, damage_removals={}, unresolved={}, written={}",
            patch.document,
            patch.records,
            patch.damage_updates,
            patch.bonus_updates,
            patch.bonus_removals,
            patch.damage_removals,
            patch.unresolved.len(),
            document.written
        );
        for unresolved in &patch.unresolved {
            println!("  unresolved family '{}' (e.g. {})", unresolved.family, unresolved.example_id);
        }
        for tie in &patch.ambiguous {
            println!(
                "  ambiguous family '{}': chose '{}' over {:?}",
                tie.family, tie.chosen.sheet, tie.chosen.ambiguous_with
            );
        }
    }
    for failure in &report.failures {
        eprintln!("aborted {}: {}", document_name(&failure.path), failure.error);
    }
    if options.dry_run {
        println!("dry run: no files written");
    }
}

fn handle_resolve(config: &MigrationConfig, snapshot: Option<PathBuf>, families: &[String]) -> i32 {
    let path = snapshot.unwrap_or_else(|| config.snapshot.clone());
    let tables = match load_snapshot(&path) {
        Ok(snapshot) => snapshot.tables,
        Err(err) => {
            eprintln!("failed to load snapshot: {err}");
            return 1;
        }
    };
    let resolver = tables.weapon_resolver(config);
    let mut missing = 0;
    for family in families {
        match resolver.resolve(family) {
            Some(found) if found.is_ambiguous() => println!(
                "{family} -> {} ({}; also {:?})",
                found.sheet, found.rule, found.ambiguous_with
            ),
            Some(found) => println!("{family} -> {} ({})", found.sheet, found.rule),
            None => {
                println!("{family} -> unresolved");
                missing += 1;
            }
        }
    }
    if missing > 0 {
        let known: Vec<&str> = resolver.sheets().collect();
        println!("known sheets: {}", known.join(", "));
        1
    } else {
        0
    }
}
