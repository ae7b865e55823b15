//! Migrates weapon item definitions to the values of a balancing workbook:
//! spreadsheet extraction, lookup tables, name reconciliation, and in-place
//! document patching.

pub mod changelog;
pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod mapping;
pub mod patch;
pub mod pipeline;
pub mod tables;
pub mod xml;

pub use config::MigrationConfig;
pub use error::{MigrationError, Result, WriteSafetyViolation};
