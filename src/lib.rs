//! xlsxport - Declarative Excel export and import
//!
//! Describe a sheet and get an XLSX workbook back:
//! - Header rows (or a flat header), mapped data rows and footer rows
//! - Per-column width, type (string/number/date) and display format
//! - Merged cell ranges
//!
//! Or parse an uploaded workbook into header-keyed records.
//!
//! ```no_run
//! use xlsxport::{export_to_excel, CellValue, ColumnConfig, ColumnType, ExportConfig};
//!
//! struct Banner { title: String, active: bool }
//! let banners = vec![Banner { title: "Spring sale".into(), active: true }];
//!
//! let config = ExportConfig::new("Master Banner", &banners, |b: &&Banner, idx| {
//!     vec![
//!         CellValue::from(idx + 1),
//!         CellValue::from(b.title.as_str()),
//!         CellValue::from(if b.active { "Active" } else { "Inactive" }),
//!     ]
//! })
//! .with_header(["No", "Title", "Status"])
//! .with_columns(vec![
//!     ColumnConfig::new().width(35).kind(ColumnType::Number),
//!     ColumnConfig::new().width(300).kind(ColumnType::String),
//!     ColumnConfig::new().kind(ColumnType::String),
//! ]);
//!
//! let blob = export_to_excel(&config)?;
//! std::fs::write("master-banner.xlsx", blob.bytes())?;
//! # Ok::<(), xlsxport::ExcelError>(())
//! ```

mod builder;
mod convert;
mod error;
mod formatter;
mod parse;
#[cfg(feature = "python")]
mod python;
mod reader;
mod sheet;
mod types;
mod writer;

pub use builder::{build_sheet, BuiltSheet};
pub use convert::{convert_csv_to_xlsx, convert_xlsx_to_csv, CsvExportOptions};
pub use error::ExcelError;
pub use formatter::apply_column_config;
pub use reader::{read_excel_file, read_excel_to_records};
pub use sheet::{Cell, Worksheet};
pub use types::{
    Blob, CellAddress, CellKind, CellValue, ColumnConfig, ColumnType, DateOrder, ExportConfig,
    MergeRange, Record, DEFAULT_COLUMN_WIDTH, DEFAULT_NUMBER_FORMAT, XLSX_MIME_TYPE,
};
pub use writer::write_to_blob;

/// Parse a `WIDTH:TYPE:FORMAT` column spec, as accepted by the CLI
pub fn parse_column_spec(spec: &str) -> Result<ColumnConfig, ExcelError> {
    parse::parse_column_spec(spec)
}

/// Parse an A1-style range like "A1:C1" into a merge range
pub fn parse_merge_range(range: &str) -> Result<MergeRange, ExcelError> {
    parse::parse_cell_range(range)
}

/// Generate an XLSX workbook from a declarative configuration.
///
/// Assembles the rows, applies column widths/types/formats to everything
/// after the header, and serializes the single sheet. No I/O is performed
/// and nothing outside the call's own worksheet is touched.
pub fn export_to_excel<T, F>(config: &ExportConfig<T, F>) -> Result<Blob, ExcelError>
where
    F: Fn(&T, usize) -> Vec<CellValue>,
{
    let BuiltSheet {
        mut worksheet,
        total_rows,
        header_row_count,
    } = build_sheet(config);

    apply_column_config(
        &mut worksheet,
        &config.columns,
        total_rows,
        header_row_count,
        config.date_order,
    );

    write_to_blob(worksheet, &config.sheet_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{Reader, Xlsx};
    use chrono::NaiveDate;
    use std::io::Cursor;

    struct Entry {
        n: i32,
        name: &'static str,
    }

    fn entries() -> Vec<Entry> {
        vec![
            Entry { n: 1, name: "Alpha" },
            Entry { n: 2, name: "Beta" },
        ]
    }

    fn map_entry(item: &Entry, idx: usize) -> Vec<CellValue> {
        vec![CellValue::from(item.n + idx as i32), CellValue::from(item.name)]
    }

    #[test]
    fn test_export_round_trip() {
        let config = ExportConfig::new("Report", entries(), map_entry)
            .with_header(["No", "Name"])
            .with_columns(vec![
                ColumnConfig::new().width(50).kind(ColumnType::Number),
                ColumnConfig::new().width(120).kind(ColumnType::String),
            ])
            .with_merges(vec![MergeRange::new(0, 0, 0, 1)]);

        let blob = export_to_excel(&config).unwrap();
        assert_eq!(blob.mime_type(), XLSX_MIME_TYPE);

        let records = read_excel_to_records(blob.bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["No"], CellValue::Number(1.0));
        assert_eq!(records[0]["Name"], CellValue::from("Alpha"));
        assert_eq!(records[1]["No"], CellValue::Number(3.0));
        assert_eq!(records[1]["Name"], CellValue::from("Beta"));

        let mut wb = Xlsx::new(Cursor::new(blob.into_bytes())).unwrap();
        assert_eq!(wb.sheet_names(), vec!["Report".to_string()]);
        let range = wb.worksheet_range("Report").unwrap();
        assert_eq!(range.get_size(), (3, 2));
    }

    #[test]
    fn test_export_empty_sheet() {
        let config = ExportConfig::new("Nothing", Vec::<Entry>::new(), map_entry);
        let built = build_sheet(&config);
        assert_eq!(built.total_rows, 0);

        let blob = export_to_excel(&config).unwrap();
        assert!(read_excel_to_records(blob.bytes()).unwrap().is_empty());
    }

    #[test]
    fn test_number_format_overrides_default() {
        let config = ExportConfig::new("S", vec![1234.5_f64], |v: &f64, _| {
            vec![CellValue::from(*v)]
        })
        .with_header(["Amount"])
        .with_columns(vec![ColumnConfig::new().kind(ColumnType::Number).format("0.00")]);

        let mut built = build_sheet(&config);
        apply_column_config(
            &mut built.worksheet,
            &config.columns,
            built.total_rows,
            built.header_row_count,
            config.date_order,
        );

        let cell = built.worksheet.cell(1, 0).unwrap();
        assert_eq!(cell.kind, CellKind::Number);
        assert_eq!(cell.format.as_deref(), Some("0.00"));
    }

    #[test]
    fn test_mixed_dates_survive_export() {
        let config = ExportConfig::new(
            "Dates",
            vec!["2020-01-02", "invalid-date"],
            |v: &&str, _| vec![CellValue::from(*v)],
        )
        .with_header(["When"])
        .with_columns(vec![ColumnConfig::new().kind(ColumnType::Date).format("dd/mm/yyyy")]);

        let blob = export_to_excel(&config).unwrap();
        let records = read_excel_to_records(blob.bytes()).unwrap();

        assert_eq!(
            records[0]["When"],
            CellValue::from(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap())
        );
        assert_eq!(records[1]["When"], CellValue::from("invalid-date"));
    }

    #[test]
    fn test_ambiguous_dates_read_month_first_by_default() {
        let config = ExportConfig::new("Dates", vec!["01/02/2024", "01-02-2024"], |v: &&str, _| {
            vec![CellValue::from(*v)]
        })
        .with_header(["When"])
        .with_columns(vec![ColumnConfig::new().kind(ColumnType::Date)]);
        assert_eq!(config.date_order, DateOrder::Auto);

        let blob = export_to_excel(&config).unwrap();
        let records = read_excel_to_records(blob.bytes()).unwrap();

        let jan_second = CellValue::from(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(records[0]["When"], jan_second);
        assert_eq!(records[1]["When"], jan_second);
    }

    #[test]
    fn test_day_first_is_opt_in() {
        let config = ExportConfig::new("Dates", vec!["01/02/2024"], |v: &&str, _| {
            vec![CellValue::from(*v)]
        })
        .with_header(["When"])
        .with_columns(vec![ColumnConfig::new().kind(ColumnType::Date)])
        .with_date_order(DateOrder::DMY);

        let blob = export_to_excel(&config).unwrap();
        let records = read_excel_to_records(blob.bytes()).unwrap();
        assert_eq!(
            records[0]["When"],
            CellValue::from(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap())
        );
    }

    #[test]
    fn test_footer_rows_follow_data() {
        let config = ExportConfig::new("S", entries(), map_entry)
            .with_header_rows(vec![
                Some(vec!["Report".into()]),
                Some(vec!["No".into(), "Name".into()]),
            ])
            .with_footer_rows(vec![Some(vec!["Total".into(), 2.into()])])
            .with_merges(vec![MergeRange::new(0, 0, 0, 1)]);

        let built = build_sheet(&config);
        assert_eq!(built.header_row_count, 2);
        assert_eq!(
            built.worksheet.to_rows().last().cloned(),
            Some(vec!["Total".into(), 2.into()])
        );

        let blob = export_to_excel(&config).unwrap();
        let records = read_excel_to_records(blob.bytes()).unwrap();
        // First row is the title, so keys come from it
        assert_eq!(records.len(), 4);
        assert_eq!(records[3]["Report"], CellValue::from("Total"));
    }

    #[test]
    fn test_parse_helpers_are_exposed() {
        assert_eq!(parse_merge_range("A1:C1").unwrap(), MergeRange::new(0, 0, 0, 2));
        assert_eq!(
            parse_column_spec("50:number").unwrap(),
            ColumnConfig::new().width(50).kind(ColumnType::Number)
        );
    }
}
