//! Reading the first sheet of an XLSX file into header-keyed records

use crate::error::ExcelError;
use crate::parse::excel_to_naive_datetime;
use crate::types::{CellValue, Record};
use calamine::{Data, Reader, Xlsx};
use chrono::NaiveDateTime;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::Path;

/// Parse XLSX bytes and convert the first sheet into records.
///
/// The first row supplies the keys; each later non-blank row becomes one
/// record, with missing cells defaulted to an empty string.
pub fn read_excel_to_records(bytes: &[u8]) -> Result<Vec<Record>, ExcelError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;

    let sheet_name = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or(ExcelError::NoWorksheets)?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        log::debug!("Sheet '{}' is empty", sheet_name);
        return Ok(Vec::new());
    };
    let keys = header_keys(header);

    let records: Vec<Record> = rows
        .filter(|row| row.iter().any(|cell| !is_blank(cell)))
        .map(|row| {
            keys.iter()
                .enumerate()
                .map(|(idx, key)| {
                    let value = row
                        .get(idx)
                        .map(to_cell_value)
                        .unwrap_or_else(|| CellValue::String(String::new()));
                    (key.clone(), value)
                })
                .collect()
        })
        .collect();

    log::debug!(
        "Read {} records with {} columns from sheet '{}'",
        records.len(),
        keys.len(),
        sheet_name
    );

    Ok(records)
}

/// Read an XLSX file from disk into records
pub fn read_excel_file(path: impl AsRef<Path>) -> Result<Vec<Record>, ExcelError> {
    let bytes = std::fs::read(path)?;
    read_excel_to_records(&bytes)
}

/// Build unique record keys from the header row.
/// Blank headers become `__EMPTY`; repeats get `_1`, `_2`, ... suffixes.
fn header_keys(header: &[Data]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(header.len());
    header
        .iter()
        .map(|cell| {
            let text = to_cell_value(cell).to_string();
            let base = if text.is_empty() {
                "__EMPTY".to_string()
            } else {
                text
            };
            let mut key = base.clone();
            let mut suffix = 1;
            while !seen.insert(key.clone()) {
                key = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            key
        })
        .collect()
}

fn is_blank(cell: &Data) -> bool {
    match cell {
        Data::Empty => true,
        Data::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Map a parsed cell onto the string/number/boolean/date value model
fn to_cell_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::String(String::new()),
        Data::String(s) => CellValue::String(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Boolean(*b),
        Data::DateTime(dt) => dt
            .as_datetime()
            .or_else(|| excel_to_naive_datetime(dt.as_f64()))
            .map_or(CellValue::Number(dt.as_f64()), CellValue::Date),
        Data::DateTimeIso(s) => s
            .parse::<NaiveDateTime>()
            .map_or_else(|_| CellValue::String(s.clone()), CellValue::Date),
        Data::DurationIso(s) => CellValue::String(s.clone()),
        Data::Error(e) => CellValue::String(e.to_string()),
    }
}
