//! Export writer: serialize the three partitions into one workbook with the
//! sheets "Attendance", "Did Not Attend", and "Not Registered".

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};
use serde::Serialize;

use crate::roster::{CellValue, Record};
use crate::session::{Partitions, Session};

pub const ATTENDANCE_SHEET: &str = "Attendance";
pub const DID_NOT_ATTEND_SHEET: &str = "Did Not Attend";
pub const NOT_REGISTERED_SHEET: &str = "Not Registered";

#[derive(Debug)]
pub enum ExportError {
    NotConfigured,
    Xlsx(XlsxError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConfigured => write!(
                f,
                "export requires a loaded roster, an identifier column, and an event name"
            ),
            Self::Xlsx(err) => write!(f, "failed to write export workbook: {err}"),
        }
    }
}

impl std::error::Error for ExportError {}

impl From<XlsxError> for ExportError {
    fn from(err: XlsxError) -> Self {
        Self::Xlsx(err)
    }
}

/// Counts and destination of a completed export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub path: String,
    pub attended: usize,
    pub not_attended: usize,
    pub not_registered: usize,
}

fn sanitize_event_name(name: &str) -> String {
    let s: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    let s = s.trim_matches('_');
    if s.is_empty() {
        "event".to_string()
    } else {
        s.to_string()
    }
}

/// `{event}_{UTC timestamp}.xlsx`, colon-free so the name is portable.
pub fn export_filename(event_name: &str, now: DateTime<Utc>) -> String {
    format!(
        "{}_{}.xlsx",
        sanitize_event_name(event_name),
        now.format("%Y%m%dT%H%M%SZ")
    )
}

fn write_cell(sheet: &mut Worksheet, row: u32, col: u16, cell: &CellValue) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => Ok(()),
        CellValue::Number(n) => sheet.write_number(row, col, *n).map(|_| ()),
        CellValue::Text(s) => sheet.write_string(row, col, s.as_str()).map(|_| ()),
    }
}

fn write_sheet(
    sheet: &mut Worksheet,
    columns: &[String],
    records: &[Record],
) -> Result<(), XlsxError> {
    for (col, name) in columns.iter().enumerate() {
        sheet.write_string(0, col as u16, name.as_str())?;
    }
    for (row, record) in records.iter().enumerate() {
        for (col, name) in columns.iter().enumerate() {
            if let Some(cell) = record.get(name) {
                write_cell(sheet, row as u32 + 1, col as u16, cell)?;
            }
        }
    }
    Ok(())
}

/// Write the three partitions to `path`. Sheets 1 and 2 carry the full
/// roster column structure; sheet 3 has only the identifier column.
pub fn write_workbook(
    partitions: &Partitions,
    columns: &[String],
    id_column: &str,
    path: &Path,
) -> Result<(), ExportError> {
    let mut workbook = Workbook::new();

    let attended = workbook.add_worksheet();
    attended.set_name(ATTENDANCE_SHEET)?;
    write_sheet(attended, columns, &partitions.attended)?;

    let not_attended = workbook.add_worksheet();
    not_attended.set_name(DID_NOT_ATTEND_SHEET)?;
    write_sheet(not_attended, columns, &partitions.not_attended)?;

    let not_registered = workbook.add_worksheet();
    not_registered.set_name(NOT_REGISTERED_SHEET)?;
    let id_columns = vec![id_column.to_string()];
    write_sheet(not_registered, &id_columns, &partitions.not_registered)?;

    workbook.save(path)?;
    Ok(())
}

/// Export the session into `out_dir` under the timestamped filename.
pub fn export_session(session: &Session, out_dir: &Path) -> Result<ExportReport, ExportError> {
    let roster = session.roster.as_ref().ok_or(ExportError::NotConfigured)?;
    if session.identifier_column.is_empty() || session.event_name.is_empty() {
        return Err(ExportError::NotConfigured);
    }

    let partitions = session.partitions();
    let filename = export_filename(&session.event_name, Utc::now());
    let path: PathBuf = out_dir.join(filename);
    write_workbook(&partitions, &roster.columns, &session.identifier_column, &path)?;

    Ok(ExportReport {
        path: path.to_string_lossy().into_owned(),
        attended: partitions.attended.len(),
        not_attended: partitions.not_attended.len(),
        not_registered: partitions.not_registered.len(),
    })
}
