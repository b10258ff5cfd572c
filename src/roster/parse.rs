//! Roster ingestion: extension dispatch over CSV (header row, empty lines
//! skipped) and XLSX/XLS (first sheet only, header row as field names).

use std::fmt;
use std::fs;
use std::path::Path;

use calamine::Reader;

use crate::roster::{CellValue, Record, Roster};

#[derive(Debug)]
pub enum RosterError {
    UnsupportedExtension(String),
    Read(std::io::Error),
    Csv(csv::Error),
    Workbook(calamine::Error),
    NoSheets,
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedExtension(ext) if ext.is_empty() => {
                write!(f, "unsupported roster file (expected .csv, .xlsx, or .xls)")
            }
            Self::UnsupportedExtension(ext) => write!(
                f,
                "unsupported roster format '.{ext}' (expected .csv, .xlsx, or .xls)"
            ),
            Self::Read(err) => write!(f, "failed to read roster file: {err}"),
            Self::Csv(err) => write!(f, "failed to parse roster CSV: {err}"),
            Self::Workbook(err) => write!(f, "failed to parse roster workbook: {err}"),
            Self::NoSheets => write!(f, "roster workbook has no sheets"),
        }
    }
}

impl std::error::Error for RosterError {}

/// Load a roster from disk, dispatching on the lowercased file extension.
/// Unsupported extensions are an input error; no partial roster is produced.
pub fn load_roster_file(path: &Path) -> Result<Roster, RosterError> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => {
            let raw = fs::read_to_string(path).map_err(RosterError::Read)?;
            parse_csv(&raw)
        }
        "xlsx" | "xls" => parse_workbook(path),
        _ => Err(RosterError::UnsupportedExtension(extension)),
    }
}

/// Parse CSV text with the header row as field names. Empty lines are
/// skipped; empty fields become empty cells. Columns with blank header
/// names are dropped.
pub fn parse_csv(text: &str) -> Result<Roster, RosterError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let header = reader.headers().map_err(RosterError::Csv)?.clone();
    let columns: Vec<(usize, String)> = header
        .iter()
        .enumerate()
        .map(|(i, name)| (i, name.trim().to_string()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(RosterError::Csv)?;
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let mut record = Record::new();
        for (index, name) in &columns {
            let cell = match row.get(*index) {
                Some("") | None => CellValue::Empty,
                Some(value) => CellValue::Text(value.to_string()),
            };
            record.insert(name.clone(), cell);
        }
        records.push(record);
    }

    Ok(Roster {
        columns: columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}

fn cell_value(d: &calamine::Data) -> CellValue {
    match d {
        calamine::Data::Empty => CellValue::Empty,
        calamine::Data::String(s) if s.is_empty() => CellValue::Empty,
        calamine::Data::String(s) => CellValue::Text(s.clone()),
        calamine::Data::Float(f) => CellValue::Number(*f),
        calamine::Data::Int(i) => CellValue::Number(*i as f64),
        calamine::Data::Bool(b) => CellValue::Text(b.to_string()),
        other => CellValue::Text(format!("{other:?}")),
    }
}

/// Parse the first sheet of an XLSX/XLS workbook. The first row supplies
/// field names; fully-empty rows are skipped.
pub fn parse_workbook(path: &Path) -> Result<Roster, RosterError> {
    let mut workbook = calamine::open_workbook_auto(path).map_err(RosterError::Workbook)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or(RosterError::NoSheets)?;
    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(RosterError::Workbook)?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Roster::default());
    };

    let columns: Vec<(usize, String)> = header_row
        .iter()
        .enumerate()
        .map(|(i, cell)| (i, cell_value(cell).as_key()))
        .filter(|(_, name)| !name.is_empty())
        .collect();

    let mut records = Vec::new();
    for row in rows {
        if row.iter().all(|cell| cell_value(cell).is_empty()) {
            continue;
        }
        let mut record = Record::new();
        for (index, name) in &columns {
            let cell = row.get(*index).map(cell_value).unwrap_or(CellValue::Empty);
            record.insert(name.clone(), cell);
        }
        records.push(record);
    }

    Ok(Roster {
        columns: columns.into_iter().map(|(_, name)| name).collect(),
        records,
    })
}
