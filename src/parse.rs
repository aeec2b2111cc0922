//! Parsing and utility functions

use crate::error::ExcelError;
use crate::types::{CellValue, ColumnConfig, ColumnType, DateOrder, MergeRange, DATETIME_PATTERNS};
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Timelike};

/// Maximum safe integer for lossless f64 representation (2^53).
const MAX_SAFE_INT: i64 = 1 << 53;

/// Excel epoch is December 30, 1899 (accounting for the 1900 leap year bug)
fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or(NaiveDate::MIN)
}

/// Try to read a date or datetime out of free text.
///
/// RFC 3339 timestamps are normalized to UTC; everything else is taken as a
/// naive local value.
pub(crate) fn parse_date(text: &str, date_order: DateOrder) -> Option<NaiveDateTime> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    // Datetime before date, as datetime patterns are more specific
    for pattern in DATETIME_PATTERNS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, pattern) {
            return Some(dt);
        }
    }

    for pattern in date_order.patterns() {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, pattern) {
            return Some(date.and_time(chrono::NaiveTime::MIN));
        }
    }

    None
}

/// Convert NaiveDate to Excel serial date number
pub(crate) fn naive_date_to_excel(date: NaiveDate) -> f64 {
    let duration = date.signed_duration_since(excel_epoch());
    duration.num_days() as f64
}

/// Convert NaiveDateTime to Excel serial datetime number
pub(crate) fn naive_datetime_to_excel(dt: NaiveDateTime) -> f64 {
    let date_part = naive_date_to_excel(dt.date());
    let time = dt.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    date_part + seconds / 86400.0
}

/// Convert an Excel serial datetime number back to NaiveDateTime, to the millisecond
pub(crate) fn excel_to_naive_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let millis = (serial * 86_400_000.0).round() as i64;
    excel_epoch()
        .and_time(chrono::NaiveTime::MIN)
        .checked_add_signed(Duration::milliseconds(millis))
}

/// Parse a cell reference like "A1" into (row, col) - 0-based
pub(crate) fn parse_cell_ref(cell_ref: &str) -> Result<(u32, u16), ExcelError> {
    let cell_ref = cell_ref.trim().to_uppercase();
    if cell_ref.is_empty() {
        return Err(ExcelError::InvalidArgument("Empty cell reference".to_string()));
    }

    // Find where letters end and numbers begin
    let col_end = cell_ref
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .count();
    if col_end == 0 {
        return Err(ExcelError::InvalidArgument(format!(
            "Invalid cell reference '{}': no column letters",
            cell_ref
        )));
    }

    let col_str = &cell_ref[..col_end];
    let row_str = &cell_ref[col_end..];

    if row_str.is_empty() {
        return Err(ExcelError::InvalidArgument(format!(
            "Invalid cell reference '{}': no row number",
            cell_ref
        )));
    }

    // Convert column letters to 0-based index (A=0, B=1, ..., Z=25, AA=26, etc.)
    let col = col_str
        .chars()
        .try_fold(0u32, |acc, c| {
            acc.checked_mul(26)?
                .checked_add(c as u32 - 'A' as u32 + 1)
        })
        .and_then(|n| u16::try_from(n - 1).ok())
        .ok_or_else(|| {
            ExcelError::InvalidArgument(format!(
                "Invalid cell reference '{}': column out of range",
                cell_ref
            ))
        })?;

    // Excel rows are 1-based, so must be >= 1
    let row_1based: u32 = row_str.parse::<u32>().map_err(|_| {
        ExcelError::InvalidArgument(format!(
            "Invalid row number in cell reference '{}'",
            cell_ref
        ))
    })?;

    if row_1based == 0 {
        return Err(ExcelError::InvalidArgument(format!(
            "Invalid cell reference '{}': row number must be >= 1 (Excel rows are 1-based)",
            cell_ref
        )));
    }

    Ok((row_1based - 1, col))
}

/// Parse a cell range like "A1:D1" into a merge range
pub(crate) fn parse_cell_range(range_str: &str) -> Result<MergeRange, ExcelError> {
    let parts: Vec<&str> = range_str.split(':').collect();
    if parts.len() != 2 {
        return Err(ExcelError::InvalidArgument(format!(
            "Invalid cell range '{}': expected format 'A1:B2'",
            range_str
        )));
    }

    let (first_row, first_col) = parse_cell_ref(parts[0])?;
    let (last_row, last_col) = parse_cell_ref(parts[1])?;

    Ok(MergeRange::new(first_row, first_col, last_row, last_col))
}

/// Parse a column spec of the form `WIDTH:TYPE:FORMAT`.
/// Every part may be blank; the format keeps any further colons ("hh:mm").
pub(crate) fn parse_column_spec(spec: &str) -> Result<ColumnConfig, ExcelError> {
    let mut parts = spec.splitn(3, ':');
    let mut column = ColumnConfig::new();

    if let Some(width) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        let px = width.parse::<u16>().map_err(|_| {
            ExcelError::InvalidArgument(format!(
                "Invalid column width '{}' in '{}'",
                width, spec
            ))
        })?;
        column = column.width(px);
    }

    if let Some(kind) = parts.next().map(str::trim).filter(|s| !s.is_empty()) {
        let kind = ColumnType::parse(kind).ok_or_else(|| {
            ExcelError::InvalidArgument(format!(
                "Unknown column type '{}'. Valid types: string, number, date",
                kind
            ))
        })?;
        column = column.kind(kind);
    }

    if let Some(format) = parts.next().filter(|s| !s.is_empty()) {
        column = column.format(format);
    }

    Ok(column)
}

/// Infer a cell value from a raw text field.
/// Dates are left as text; a `date` column decides whether to convert them.
pub(crate) fn parse_field(value: &str) -> CellValue {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return CellValue::Empty;
    }

    if let Ok(int_val) = trimmed.parse::<i64>() {
        if int_val.abs() > MAX_SAFE_INT {
            return CellValue::String(trimmed.to_string());
        }
        return CellValue::Number(int_val as f64);
    }

    if let Ok(float_val) = trimmed.parse::<f64>() {
        if float_val.is_nan() || float_val.is_infinite() {
            return CellValue::Empty;
        }
        return CellValue::Number(float_val);
    }

    if trimmed.eq_ignore_ascii_case("true") {
        return CellValue::Boolean(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return CellValue::Boolean(false);
    }

    CellValue::String(trimmed.to_string())
}
