//! Column typing: widths, per-cell type tags and display formats

use crate::parse::{excel_to_naive_datetime, parse_date};
use crate::sheet::Worksheet;
use crate::types::{
    CellKind, CellValue, ColumnConfig, ColumnType, DateOrder, DEFAULT_NUMBER_FORMAT,
};
use chrono::NaiveDateTime;

/// Apply column widths, type tags and formats to the rows after the header.
///
/// Coercion is best-effort per cell: a value that doesn't fit its column's
/// type keeps its raw value and tag, but still gets the column's format.
/// Footer rows are typed like data rows.
pub fn apply_column_config(
    worksheet: &mut Worksheet,
    columns: &[ColumnConfig],
    total_rows: usize,
    header_row_count: usize,
    date_order: DateOrder,
) {
    worksheet.set_column_widths(columns.iter().map(ColumnConfig::effective_width).collect());

    for (col_idx, column) in columns.iter().enumerate() {
        if column.kind.is_none() && column.format.is_none() {
            continue;
        }

        log::debug!(
            "Typing column {} as {:?} (format {:?}) over rows {}..{}",
            col_idx,
            column.kind,
            column.format,
            header_row_count,
            total_rows
        );

        for row in header_row_count..total_rows {
            let Some(cell) = worksheet.cell_mut(row, col_idx) else {
                continue;
            };

            match column.kind {
                Some(ColumnType::Number) => {
                    if matches!(cell.value, CellValue::Number(_)) {
                        cell.kind = CellKind::Number;
                        cell.format = Some(
                            column
                                .format
                                .clone()
                                .unwrap_or_else(|| DEFAULT_NUMBER_FORMAT.to_string()),
                        );
                    }
                }
                Some(ColumnType::Date) => match coerce_date(&cell.value, date_order) {
                    Some(dt) => {
                        cell.kind = CellKind::Date;
                        cell.value = CellValue::Date(dt);
                    }
                    None => {
                        log::trace!("Cell ({}, {}) is not a date: {:?}", row, col_idx, cell.value);
                    }
                },
                Some(ColumnType::String) | None => {
                    cell.kind = CellKind::String;
                }
            }

            if let Some(format) = &column.format {
                cell.format = Some(format.clone());
            }
        }
    }
}

/// Interpret a raw value as a date: text is parsed, numbers are Excel serials
fn coerce_date(value: &CellValue, date_order: DateOrder) -> Option<NaiveDateTime> {
    match value {
        CellValue::Date(dt) => Some(*dt),
        CellValue::String(s) => parse_date(s, date_order),
        CellValue::Number(n) => excel_to_naive_datetime(*n),
        CellValue::Boolean(_) | CellValue::Empty => None,
    }
}
