//! Workbook reader (calamine)

use super::RawTable;
use crate::error::DataLoadError;
use crate::record::Cell;
use bytes::Bytes;
use calamine::{open_workbook_auto, open_workbook_auto_from_rs, Data, Reader, Sheets};
use std::io::{Cursor, Read, Seek};
use std::path::Path;

/// Read a worksheet from a workbook on disk
pub(super) fn read_path(path: &Path, sheet: Option<&str>) -> Result<RawTable, DataLoadError> {
    let source_name = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|e| {
        DataLoadError::unreadable(&source_name, format!("failed to open workbook: {e}"))
    })?;
    read_sheet(&mut workbook, &source_name, sheet)
}

/// Read a worksheet from an uploaded workbook
pub(super) fn read_bytes(
    source_name: &str,
    bytes: &Bytes,
    sheet: Option<&str>,
) -> Result<RawTable, DataLoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.clone())).map_err(|e| {
        DataLoadError::unreadable(source_name, format!("failed to open workbook: {e}"))
    })?;
    read_sheet(&mut workbook, source_name, sheet)
}

fn read_sheet<RS: Read + Seek>(
    workbook: &mut Sheets<RS>,
    source_name: &str,
    sheet: Option<&str>,
) -> Result<RawTable, DataLoadError> {
    let sheet_name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| DataLoadError::unreadable(source_name, "workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| {
        DataLoadError::unreadable(source_name, format!("cannot read sheet '{sheet_name}': {e}"))
    })?;

    let mut rows = range.rows();
    let header: Vec<String> = rows
        .next()
        .ok_or_else(|| {
            DataLoadError::unreadable(source_name, format!("sheet '{sheet_name}' is empty"))
        })?
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();
    let rows: Vec<Vec<Cell>> = rows.map(|row| row.iter().map(cell_from_data).collect()).collect();

    tracing::debug!(sheet = %sheet_name, columns = header.len(), rows = rows.len(), "read worksheet");
    Ok(RawTable { header, rows })
}

#[allow(clippy::cast_precision_loss)]
fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::Empty | Data::Error(_) => Cell::Empty,
        // Dates and durations stay textual; they are never metrics
        other => Cell::Text(other.to_string()),
    }
}
