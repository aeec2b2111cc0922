//! File conversions built on the declarative export and the record reader

use crate::error::ExcelError;
use crate::export_to_excel;
use crate::parse::parse_field;
use crate::reader::read_excel_file;
use crate::types::{CellValue, ColumnConfig, DateOrder, ExportConfig, MergeRange};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use std::fs::File;
use std::io::{BufReader, Write};

/// Options for turning a CSV file into a declaratively configured sheet
#[derive(Debug, Clone)]
pub struct CsvExportOptions {
    pub sheet_name: String,
    /// Number of leading CSV records treated as header rows
    pub header_rows: usize,
    pub columns: Vec<ColumnConfig>,
    pub merges: Vec<MergeRange>,
    pub date_order: DateOrder,
}

impl Default for CsvExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
            header_rows: 1,
            columns: Vec::new(),
            merges: Vec::new(),
            date_order: DateOrder::Auto,
        }
    }
}

/// Convert a CSV file to XLSX through the header/data/column pipeline.
///
/// Header records are kept as text; data fields are inferred as numbers,
/// booleans or text, and `date` columns convert date-like text.
///
/// # Returns
/// * `Ok((rows, cols))` - Number of rows and columns written
pub fn convert_csv_to_xlsx(
    input_path: &str,
    output_path: &str,
    options: &CsvExportOptions,
) -> Result<(u32, u16), ExcelError> {
    let file = File::open(input_path)?;
    let reader = BufReader::with_capacity(1024 * 1024, file);
    let mut csv_reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let records: Vec<StringRecord> = csv_reader.records().collect::<Result<_, _>>()?;

    let row_count = u32::try_from(records.len()).map_err(|_| {
        ExcelError::LimitExceeded(format!("Row count {} exceeds u32 limit", records.len()))
    })?;
    let max_cols = records.iter().map(StringRecord::len).max().unwrap_or(0);
    let col_count = u16::try_from(max_cols).map_err(|_| {
        ExcelError::LimitExceeded(format!("Column count {} exceeds u16 limit", max_cols))
    })?;

    let split = options.header_rows.min(records.len());
    let (header, data) = records.split_at(split);

    let header_rows: Vec<Option<Vec<CellValue>>> = header
        .iter()
        .map(|record| {
            Some(
                record
                    .iter()
                    .map(|field| {
                        if field.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::from(field)
                        }
                    })
                    .collect(),
            )
        })
        .collect();

    let config = ExportConfig::new(&options.sheet_name, data, |record: &&StringRecord, _| {
        record.iter().map(parse_field).collect()
    })
    .with_header_rows(header_rows)
    .with_header_row_count(options.header_rows)
    .with_columns(options.columns.clone())
    .with_merges(options.merges.clone())
    .with_date_order(options.date_order);

    let blob = export_to_excel(&config)?;
    std::fs::write(output_path, blob.bytes())?;

    Ok((row_count, col_count))
}

/// Convert the first sheet of an XLSX file to CSV, header row first.
/// Returns the number of data records written.
pub fn convert_xlsx_to_csv<W: Write>(input_path: &str, output: W) -> Result<usize, ExcelError> {
    let records = read_excel_file(input_path)?;
    let mut writer = WriterBuilder::new().from_writer(output);

    if let Some(first) = records.first() {
        writer.write_record(first.keys())?;
    }
    for record in &records {
        writer.write_record(record.values().map(ToString::to_string))?;
    }
    writer.flush()?;

    Ok(records.len())
}
