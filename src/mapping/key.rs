use std::fmt;

use serde::{Deserialize, Serialize};

pub const COMPOSITE_SEPARATOR: char = ';';

/// A spreadsheet stat name. Composite keys such as `Health;Health Regen` keep
/// their components in order so a single cell can feed several stats.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct StatKey {
    parts: Vec<String>,
}

impl StatKey {
    pub fn parse(raw: &str) -> Self {
        let parts = raw
            .split(COMPOSITE_SEPARATOR)
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect();
        Self { parts }
    }

    pub fn single(name: &str) -> Self {
        Self {
            parts: vec![name.trim().to_string()],
        }
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_composite(&self) -> bool {
        self.parts.len() > 1
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Component-wise comparison ignoring case.
    pub fn eq_ignore_case(&self, other: &StatKey) -> bool {
        self.parts.len() == other.parts.len()
            && self
                .parts
                .iter()
                .zip(&other.parts)
                .all(|(a, b)| a.to_lowercase() == b.to_lowercase())
    }

    /// Position of `name` among the components, ignoring case.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        let needle = name.trim().to_lowercase();
        self.parts.iter().position(|part| part.to_lowercase() == needle)
    }

    pub fn to_lowercase(&self) -> Self {
        Self {
            parts: self.parts.iter().map(|part| part.to_lowercase()).collect(),
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.parts.join(";"))
    }
}

impl From<String> for StatKey {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

impl From<&str> for StatKey {
    fn from(value: &str) -> Self {
        Self::parse(value)
    }
}

impl From<StatKey> for String {
    fn from(value: StatKey) -> Self {
        value.to_string()
    }
}
