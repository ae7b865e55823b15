//! Weapon family (document side, e.g. `2HAxe`) → spreadsheet sheet name.
//!
//! Rules are tried in order: hand-written overrides, case-insensitive equality,
//! equality ignoring spaces and hyphens, equality on alphanumerics only.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    Override,
    CaseInsensitive,
    IgnoreSpacing,
    AlphanumericOnly,
}

impl fmt::Display for MatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Override => "override",
            Self::CaseInsensitive => "case-insensitive",
            Self::IgnoreSpacing => "ignore-spacing",
            Self::AlphanumericOnly => "alphanumeric-only",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WeaponMatch {
    pub sheet: String,
    pub rule: MatchRule,
    /// Other sheets the same rule accepted. The lexically smallest sheet wins.
    pub ambiguous_with: Vec<String>,
}

impl WeaponMatch {
    pub fn is_ambiguous(&self) -> bool {
        !self.ambiguous_with.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WeaponResolver {
    overrides: BTreeMap<String, String>,
    sheets: BTreeSet<String>,
}

impl WeaponResolver {
    pub fn new<I, S>(overrides: BTreeMap<String, String>, sheets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            overrides,
            sheets: sheets.into_iter().map(Into::into).collect(),
        }
    }

    pub fn sheets(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(String::as_str)
    }

    pub fn resolve(&self, family: &str) -> Option<WeaponMatch> {
        if let Some(sheet) = self.overrides.get(family) {
            return Some(WeaponMatch {
                sheet: sheet.clone(),
                rule: MatchRule::Override,
                ambiguous_with: Vec::new(),
            });
        }

        let rules: [(MatchRule, fn(&str) -> String); 3] = [
            (MatchRule::CaseInsensitive, |s| s.to_lowercase()),
            (MatchRule::IgnoreSpacing, strip_spacing),
            (MatchRule::AlphanumericOnly, alphanumeric_only),
        ];
        for (rule, normalize) in rules {
            let wanted = normalize(family);
            if wanted.is_empty() {
                continue;
            }
            // BTreeSet iteration is lexical, so the first hit is the tie-break winner.
            let mut hits = self.sheets.iter().filter(|sheet| normalize(sheet) == wanted);
            if let Some(first) = hits.next() {
                let ambiguous_with: Vec<String> = hits.cloned().collect();
                if !ambiguous_with.is_empty() {
                    tracing::warn!(
                        family,
                        chosen = %first,
                        others = ?ambiguous_with,
                        %rule,
                        "weapon family matches several sheets"
                    );
                }
                return Some(WeaponMatch {
                    sheet: first.clone(),
                    rule,
                    ambiguous_with,
                });
            }
        }
        None
    }
}

fn strip_spacing(s: &str) -> String {
    s.to_lowercase().replace([' ', '-'], "")
}

fn alphanumeric_only(s: &str) -> String {
    s.to_lowercase().chars().filter(|c| c.is_alphanumeric()).collect()
}
