//! Serialization of a single worksheet into an XLSX blob

use crate::error::ExcelError;
use crate::parse::naive_datetime_to_excel;
use crate::sheet::{Cell, Worksheet};
use crate::types::{Blob, CellKind, CellValue};
use chrono::Timelike;
use rust_xlsxwriter::{Format, FormatAlign, Workbook};
use std::collections::HashMap;

/// Display format for date cells that carry no format of their own
const DEFAULT_DATE_FORMAT: &str = "yyyy-mm-dd";
const DEFAULT_DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

/// Wrap `worksheet` into a one-sheet workbook named `sheet_name` and serialize it
pub fn write_to_blob(worksheet: Worksheet, sheet_name: &str) -> Result<Blob, ExcelError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name)?;

    apply_column_widths(sheet, worksheet.column_widths())?;
    apply_merged_ranges(sheet, &worksheet);

    let mut formats: HashMap<String, Format> = HashMap::new();
    for (row, col, cell) in worksheet.cells() {
        let row = u32::try_from(row).map_err(|_| {
            ExcelError::LimitExceeded(format!("Row index {} exceeds u32 limit", row))
        })?;
        let col = u16::try_from(col).map_err(|_| {
            ExcelError::LimitExceeded(format!("Column index {} exceeds u16 limit", col))
        })?;
        write_cell(sheet, row, col, cell, &mut formats)?;
    }

    let bytes = workbook.save_to_buffer()?;
    log::debug!(
        "Serialized sheet '{}' ({} cells) into {} bytes",
        sheet_name,
        worksheet.cells().count(),
        bytes.len()
    );

    Ok(Blob::xlsx(bytes))
}

/// Apply pixel column widths, one per column config
fn apply_column_widths(
    sheet: &mut rust_xlsxwriter::Worksheet,
    widths: &[u16],
) -> Result<(), ExcelError> {
    for (col_idx, width) in widths.iter().enumerate() {
        let col = u16::try_from(col_idx).map_err(|_| {
            ExcelError::LimitExceeded(format!("Column index {} exceeds u16 limit", col_idx))
        })?;
        sheet.set_column_width_pixels(col, u32::from(*width))?;
    }
    Ok(())
}

/// Apply merged ranges before any value is written, so the real top-left
/// value replaces the merge placeholder. Ranges the writer rejects are skipped.
fn apply_merged_ranges(sheet: &mut rust_xlsxwriter::Worksheet, worksheet: &Worksheet) {
    let merge_format = Format::new().set_align(FormatAlign::Center);

    for range in worksheet.merges() {
        if let Err(e) = sheet.merge_range(
            range.start.row,
            range.start.col,
            range.end.row,
            range.end.col,
            "",
            &merge_format,
        ) {
            log::warn!("Skipping merge {:?}: {}", range, e);
        }
    }
}

/// Write one cell according to its type tag and display format
fn write_cell(
    sheet: &mut rust_xlsxwriter::Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    formats: &mut HashMap<String, Format>,
) -> Result<(), ExcelError> {
    let format_key = match (&cell.format, &cell.value) {
        (Some(fmt), _) => Some(fmt.as_str()),
        (None, CellValue::Date(dt)) if cell.kind != CellKind::String => {
            if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                Some(DEFAULT_DATE_FORMAT)
            } else {
                Some(DEFAULT_DATETIME_FORMAT)
            }
        }
        _ => None,
    };
    let format: Option<&Format> = match format_key {
        Some(key) => Some(
            formats
                .entry(key.to_string())
                .or_insert_with(|| Format::new().set_num_format(key)),
        ),
        None => None,
    };

    match (cell.kind, &cell.value) {
        (_, CellValue::Empty) => {
            if let Some(fmt) = format {
                sheet.write_blank(row, col, fmt)?;
            }
        }
        (CellKind::String, value) => {
            let text = value.to_string();
            match format {
                Some(fmt) => sheet.write_string_with_format(row, col, text, fmt)?,
                None => sheet.write_string(row, col, text)?,
            };
        }
        (_, CellValue::Number(n)) => {
            match format {
                Some(fmt) => sheet.write_number_with_format(row, col, *n, fmt)?,
                None => sheet.write_number(row, col, *n)?,
            };
        }
        (_, CellValue::Date(dt)) => {
            let serial = naive_datetime_to_excel(*dt);
            match format {
                Some(fmt) => sheet.write_number_with_format(row, col, serial, fmt)?,
                None => sheet.write_number(row, col, serial)?,
            };
        }
        (_, CellValue::Boolean(b)) => {
            match format {
                Some(fmt) => sheet.write_boolean_with_format(row, col, *b, fmt)?,
                None => sheet.write_boolean(row, col, *b)?,
            };
        }
        (_, CellValue::String(s)) => {
            match format {
                Some(fmt) => sheet.write_string_with_format(row, col, s, fmt)?,
                None => sheet.write_string(row, col, s)?,
            };
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_excel_to_records;
    use crate::types::{MergeRange, XLSX_MIME_TYPE};
    use calamine::{Data, Reader, Xlsx};
    use std::io::Cursor;

    fn open(blob: &Blob) -> Xlsx<Cursor<Vec<u8>>> {
        Xlsx::new(Cursor::new(blob.bytes().to_vec())).unwrap()
    }

    #[test]
    fn test_blob_is_readable_workbook() {
        let ws = Worksheet::from_rows(vec![vec!["hello".into(), 42.into()]]);
        let blob = write_to_blob(ws, "SheetOne").unwrap();

        assert_eq!(blob.mime_type(), XLSX_MIME_TYPE);
        assert!(!blob.is_empty());

        let mut wb = open(&blob);
        assert_eq!(wb.sheet_names(), vec!["SheetOne".to_string()]);
        let range = wb.worksheet_range("SheetOne").unwrap();
        assert_eq!(range.get((0, 0)), Some(&Data::String("hello".to_string())));
        assert_eq!(range.get((0, 1)), Some(&Data::Float(42.0)));
    }

    #[test]
    fn test_empty_sheet_still_serializes() {
        let blob = write_to_blob(Worksheet::new(), "Empty").unwrap();

        let mut wb = open(&blob);
        assert_eq!(wb.sheet_names(), vec!["Empty".to_string()]);
        assert!(wb.worksheet_range("Empty").unwrap().is_empty());
        assert!(read_excel_to_records(blob.bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_merges_keep_top_left_value() {
        let mut ws = Worksheet::from_rows(vec![
            vec!["Title".into()],
            vec!["a".into(), "b".into()],
        ]);
        ws.set_merges(vec![MergeRange::new(0, 0, 0, 1)]);
        let blob = write_to_blob(ws, "Merged").unwrap();

        let mut wb = open(&blob);
        let range = wb.worksheet_range("Merged").unwrap();
        assert_eq!(range.get((0, 0)), Some(&Data::String("Title".to_string())));
        assert_eq!(range.get((1, 1)), Some(&Data::String("b".to_string())));
    }

    #[test]
    fn test_rejected_merges_are_skipped() {
        let mut ws = Worksheet::from_rows(vec![vec!["x".into()]]);
        ws.set_merges(vec![MergeRange::new(0, 0, 0, 0)]);
        assert!(write_to_blob(ws, "Single").is_ok());
    }

    #[test]
    fn test_string_tag_writes_numbers_as_text() {
        let mut ws = Worksheet::from_rows(vec![vec![42.into()]]);
        ws.cell_mut(0, 0).unwrap().kind = CellKind::String;
        let blob = write_to_blob(ws, "Text").unwrap();

        let mut wb = open(&blob);
        let range = wb.worksheet_range("Text").unwrap();
        assert_eq!(range.get((0, 0)), Some(&Data::String("42".to_string())));
    }

    #[test]
    fn test_invalid_sheet_name_is_an_error() {
        let err = write_to_blob(Worksheet::new(), "bad/name").unwrap_err();
        assert!(matches!(err, ExcelError::Write(_)));
    }
}
