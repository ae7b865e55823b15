//! In-memory workbook: named sheets of typed cells, addressed the way the
//! balance sheets are documented (1-based rows, columns A=1).

use std::path::Path;

use calamine::{DataType, Reader};

use crate::error::{MigrationError, Result};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            CellValue::Number(_) => false,
        }
    }

    /// Cell rendered as text; numbers without a fractional part print as integers.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Empty => None,
            CellValue::Text(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            CellValue::Number(n) if n.fract() == 0.0 => Some(format!("{}", *n as i64)),
            CellValue::Number(n) => Some(n.to_string()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n).filter(|n| n.is_finite()),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            CellValue::Empty => None,
        }
    }

    /// Integer value, truncating toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        self.as_f64().map(|v| v.trunc() as i64)
    }
}

impl From<&calamine::Data> for CellValue {
    fn from(d: &calamine::Data) -> Self {
        match d {
            calamine::Data::Empty | calamine::Data::Error(_) => CellValue::Empty,
            calamine::Data::String(s) => CellValue::Text(s.clone()),
            calamine::Data::Float(f) if !f.is_finite() => CellValue::Empty,
            calamine::Data::Float(f) => CellValue::Number(*f),
            calamine::Data::Int(i) => CellValue::Number(*i as f64),
            calamine::Data::Bool(b) => CellValue::Text(b.to_string()),
            calamine::Data::DateTimeIso(s) | calamine::Data::DurationIso(s) => {
                CellValue::Text(s.clone())
            }
            // Excel date/times: keep the serial number.
            other => match DataType::as_f64(other) {
                Some(serial) if serial.is_finite() => CellValue::Number(serial),
                _ => CellValue::Empty,
            },
        }
    }
}

/// A 2-D grid of cells. Row 0 / column 0 are unused so coordinates match the sheet.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    /// Build a sheet whose first given row is spreadsheet row 1, first cell column A.
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let mut sheet = Sheet::new(name);
        for (r, row) in rows.into_iter().enumerate() {
            for (c, cell) in row.into_iter().enumerate() {
                sheet.set(r as u32 + 1, c as u32 + 1, cell);
            }
        }
        sheet
    }

    pub fn set(&mut self, row: u32, col: u32, value: CellValue) {
        let (r, c) = (row as usize, col as usize);
        if self.rows.len() <= r {
            self.rows.resize_with(r + 1, Vec::new);
        }
        let cells = &mut self.rows[r];
        if cells.len() <= c {
            cells.resize(c + 1, CellValue::Empty);
        }
        cells[c] = value;
    }

    /// Cell at 1-based (row, column). Out-of-range coordinates read as empty.
    pub fn cell(&self, row: u32, col: u32) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .unwrap_or(&EMPTY)
    }

    pub fn height(&self) -> u32 {
        self.rows.len().saturating_sub(1) as u32
    }

    pub fn width(&self) -> u32 {
        self.rows
            .iter()
            .map(|cells| cells.len().saturating_sub(1))
            .max()
            .unwrap_or(0) as u32
    }
}

/// Spreadsheet column letter ("A", "D", "AA") to its 1-based index.
pub fn column_index(letters: &str) -> Option<u32> {
    let mut index = 0u32;
    for ch in letters.trim().chars() {
        if !ch.is_ascii_alphabetic() {
            return None;
        }
        index = index * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }
    (index > 0).then_some(index)
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new(sheets: Vec<Sheet>) -> Self {
        Self { sheets }
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

/// Read every sheet of an .xlsx/.xls/.ods workbook into memory.
pub fn load_workbook(path: &Path) -> Result<Workbook> {
    let open_err = |source| MigrationError::Workbook {
        path: path.to_path_buf(),
        source,
    };
    let mut wb = calamine::open_workbook_auto(path).map_err(open_err)?;
    let names = wb.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = wb.worksheet_range(&name).map_err(open_err)?;
        let (row0, col0) = range.start().unwrap_or((0, 0));
        let mut sheet = Sheet::new(name.clone());
        for (r, c, cell) in range.used_cells() {
            let value = CellValue::from(cell);
            if value != CellValue::Empty {
                sheet.set(row0 + r as u32 + 1, col0 + c as u32 + 1, value);
            }
        }
        tracing::debug!(sheet = %name, rows = sheet.height(), cols = sheet.width(), "loaded sheet");
        sheets.push(sheet);
    }
    tracing::info!(path = %path.display(), sheets = sheets.len(), "workbook loaded");
    Ok(Workbook::new(sheets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_uses_one_based_coordinates() {
        let sheet = Sheet::from_rows(
            "Pistol",
            vec![
                vec![CellValue::Text("a".into())],
                vec![CellValue::Empty, CellValue::Number(4.0)],
            ],
        );
        assert_eq!(sheet.cell(1, 1), &CellValue::Text("a".into()));
        assert_eq!(sheet.cell(2, 2), &CellValue::Number(4.0));
        assert_eq!(sheet.cell(40, 40), &CellValue::Empty);
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.width(), 2);
    }

    #[test]
    fn non_finite_numbers_read_as_absent() {
        assert_eq!(CellValue::from(&calamine::Data::Float(f64::NAN)), CellValue::Empty);
        assert_eq!(CellValue::from(&calamine::Data::Float(f64::INFINITY)), CellValue::Empty);
        assert_eq!(CellValue::from(&calamine::Data::Float(2.5)), CellValue::Number(2.5));
        assert_eq!(CellValue::Text("inf".into()).as_f64(), None);
        assert_eq!(CellValue::Text("NaN".into()).as_i64(), None);
        assert_eq!(CellValue::Number(f64::NAN).as_i64(), None);
    }

    #[test]
    fn column_letters_map_to_indices() {
        assert_eq!(column_index("A"), Some(1));
        assert_eq!(column_index("d"), Some(4));
        assert_eq!(column_index("AA"), Some(27));
        assert_eq!(column_index("1"), None);
    }

    #[test]
    fn cell_text_and_numbers() {
        assert_eq!(CellValue::Number(7.0).as_text().as_deref(), Some("7"));
        assert_eq!(CellValue::Text("  Dodge ".into()).as_text().as_deref(), Some("Dodge"));
        assert_eq!(CellValue::Text("  ".into()).as_text(), None);
        assert_eq!(CellValue::Text("-1".into()).as_i64(), Some(-1));
        assert_eq!(CellValue::Number(3.9).as_i64(), Some(3));
        assert!(CellValue::Text(" ".into()).is_empty());
    }
}
