//! Spreadsheet fixtures for integration tests

#![allow(dead_code)]

use rust_xlsxwriter::{Workbook, XlsxError};
use statboard::record::Cell;
use std::path::Path;

/// Header used by most fixtures
pub const PLAYER_COLUMNS: [&str; 5] = ["name", "tag", "rating", "kd_ratio", "headshot_percent"];

fn build_workbook(sheet: &str, header: &[&str], rows: &[Vec<Cell>]) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col, title) in (0u16..).zip(header) {
        worksheet.write_string(0, col, *title)?;
    }
    for (row, cells) in (1u32..).zip(rows) {
        for (col, cell) in (0u16..).zip(cells) {
            match cell {
                Cell::Empty => {}
                Cell::Text(s) => {
                    worksheet.write_string(row, col, s)?;
                }
                Cell::Number(v) => {
                    worksheet.write_number(row, col, *v)?;
                }
            }
        }
    }
    Ok(workbook)
}

/// Write an .xlsx file with one worksheet
pub fn write_xlsx(path: &Path, sheet: &str, header: &[&str], rows: &[Vec<Cell>]) {
    let mut workbook = build_workbook(sheet, header, rows).unwrap();
    workbook.save(path).unwrap();
}

/// Build an .xlsx file in memory
pub fn xlsx_bytes(sheet: &str, header: &[&str], rows: &[Vec<Cell>]) -> Vec<u8> {
    let mut workbook = build_workbook(sheet, header, rows).unwrap();
    workbook.save_to_buffer().unwrap()
}

/// `name, tag, rating, kd_ratio, headshot_percent` row
pub fn player(name: &str, tag: &str, rating: impl Into<Cell>, kd: f64, hs: f64) -> Vec<Cell> {
    vec![name.into(), tag.into(), rating.into(), kd.into(), hs.into()]
}
