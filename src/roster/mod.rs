//! Roster model: rows as field-name → value maps plus the ordered column
//! list from the header row of the uploaded file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub mod parse;

/// A single cell of a roster row. CSV ingestion yields text cells, workbook
/// ingestion may yield numeric cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Render the cell as a normalized identifier key: trimmed text, with
    /// integral floats printed without a fractional part so a numeric
    /// spreadsheet cell matches typed scan input ("42", not "42.0").
    pub fn as_key(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(s) => s.trim().to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.is_empty(),
            CellValue::Number(_) => false,
        }
    }
}

/// One roster row or one marked attendee.
pub type Record = HashMap<String, CellValue>;

/// Normalize scanned input the same way roster cells are keyed.
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_string()
}

/// The uploaded list of registered people. `columns` preserves the header
/// order of the source file; `records` preserves row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl Roster {
    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
