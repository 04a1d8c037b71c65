//! Dictionary loader - id→label lookup
//!
//! Model exports identify land-use classes by integer codes. The dictionary
//! spreadsheet maps those codes to human-readable labels. Two layouts occur
//! in the wild:
//!
//! - **Two columns**: code in the first cell, label in the second. The first
//!   row is a header and skipped.
//! - **Single column**: one cell per row like `"3 Bosque nativo"`; leading
//!   digits are the code, the remainder the label. No header row.
//!
//! A missing or unreadable dictionary is not fatal: the stage proceeds with
//! an empty lookup and codes render through the `"ID <code>"` fallback.

use calamine::{Data, Reader, Xlsx};
use std::collections::HashMap;
use std::io::Cursor;

#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    labels: HashMap<String, String>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the first worksheet of an xlsx/xlsm file. Unreadable
    /// workbooks degrade to an empty dictionary with a warning.
    pub fn from_xlsx(bytes: &[u8]) -> Self {
        let mut workbook: Xlsx<_> = match Xlsx::new(Cursor::new(bytes)) {
            Ok(wb) => wb,
            Err(err) => {
                log::warn!("diccionario ilegible, se continúa sin etiquetas: {err}");
                return Self::new();
            }
        };
        let range = match workbook.worksheet_range_at(0) {
            Some(Ok(range)) => range,
            Some(Err(err)) => {
                log::warn!("hoja de diccionario ilegible: {err}");
                return Self::new();
            }
            None => return Self::new(),
        };

        let rows = range.rows().map(|row| {
            row.iter()
                .filter(|cell| !matches!(cell, Data::Empty))
                .map(cell_to_string)
                .collect::<Vec<_>>()
        });
        Self::from_rows(rows)
    }

    /// Core row logic, over plain cell rows so layouts can be tested without
    /// workbook bytes. The first row is treated as a header and skipped when
    /// it has two or more meaningful cells.
    pub fn from_rows<I, R>(rows: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let mut dict = Self::new();
        for (index, row) in rows.into_iter().enumerate() {
            let cells = row.as_ref();
            if index == 0 && cells.len() >= 2 {
                continue;
            }
            match cells {
                [code, label, ..] => dict.insert(code, label),
                [single] => {
                    if let Some((code, label)) = split_leading_code(single) {
                        dict.insert(&code, &label);
                    }
                }
                [] => {}
            }
        }
        dict
    }

    pub fn insert(&mut self, code: &str, label: &str) {
        let code = code.trim();
        let label = label.trim();
        if code.is_empty() || label.is_empty() {
            return;
        }
        self.labels.insert(code.to_string(), label.to_string());
    }

    /// Strict lookup. `None` means the caller must drop the row (with a
    /// warning) rather than invent a label.
    pub fn get(&self, code: &str) -> Option<&str> {
        self.labels.get(code).map(String::as_str)
    }

    /// Total lookup: unknown codes become `"ID <code>"`. Never fails.
    pub fn resolve(&self, code: &str) -> String {
        match self.get(code) {
            Some(label) => label.to_string(),
            None => format!("ID {code}"),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// `"12 Bosque nativo"` → `("12", "Bosque nativo")`. Leading digits, then
/// whitespace, then the label.
fn split_leading_code(cell: &str) -> Option<(String, String)> {
    let cell = cell.trim();
    let digits_end = cell.find(|c: char| !c.is_ascii_digit())?;
    if digits_end == 0 {
        return None;
    }
    let (code, rest) = cell.split_at(digits_end);
    let label = rest.trim();
    if label.is_empty() {
        return None;
    }
    Some((code.to_string(), label.to_string()))
}

/// Integer-valued numeric cells stringify without a trailing `.0` so they
/// match the codes that appear in the CSV exports.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}
