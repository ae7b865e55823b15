//! Item id conventions: `<Family><digit>`, e.g. `Pistol2` is variant 2 of
//! the `Pistol` family.

/// Last character of the id as a digit.
pub fn variant_id(record_id: &str) -> Option<u8> {
    let last = record_id.chars().last()?;
    last.to_digit(10).map(|d| d as u8)
}

/// Id with every trailing digit stripped.
pub fn family(record_id: &str) -> &str {
    record_id.trim_end_matches(|c: char| c.is_ascii_digit())
}

/// How a document level id maps onto a damage-table level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelMapping {
    /// Base variants: document level L reads spreadsheet level L - 1.
    Shifted,
    Direct,
}

impl LevelMapping {
    pub fn for_record(variant_id: u8, offhand: bool) -> Self {
        if variant_id == 0 && !offhand {
            LevelMapping::Shifted
        } else {
            LevelMapping::Direct
        }
    }

    /// `None` when the shifted level would fall below `i32::MIN`.
    pub fn spreadsheet_level(self, document_level: i32) -> Option<i32> {
        match self {
            LevelMapping::Shifted => document_level.checked_sub(1),
            LevelMapping::Direct => Some(document_level),
        }
    }
}

/// Integer level id; surrounding whitespace is tolerated.
pub fn parse_level(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}
