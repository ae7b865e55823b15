//! Crate-wide error type. Only conditions that stop a whole step surface here;
//! unresolved names, odd cells and missing sub-elements are absorbed where they
//! are found and end up in reports instead.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrationError>;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to open workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },
    #[error("sheet '{0}' is missing from the workbook")]
    MissingSheet(String),
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("document has no root element")]
    MissingRoot,
    #[error("serialized document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    WriteSafety(#[from] WriteSafetyViolation),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Reasons a patched document is refused before it reaches disk.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteSafetyViolation {
    #[error("document contains no item records")]
    NoRecords,
    #[error("serialized output shrank from {original} to {serialized} bytes")]
    OutputShrank { original: usize, serialized: usize },
}
