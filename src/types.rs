//! Type definitions for xlsxport

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use indexmap::IndexMap;
use std::fmt;

/// MIME type attached to every exported workbook
pub const XLSX_MIME_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Column width in pixels when a column config leaves it unset
pub const DEFAULT_COLUMN_WIDTH: u16 = 100;

/// Number format applied to numeric cells in a `number` column without its own format
pub const DEFAULT_NUMBER_FORMAT: &str = "#,##0";

/// Date formats by locale/order preference
/// ISO formats (YYYY-MM-DD) are always tried first as they're unambiguous
pub(crate) const DATE_PATTERNS_ISO: &[&str] = &[
    "%Y-%m-%d", // 2024-01-15
    "%Y/%m/%d", // 2024/01/15
];

/// European date formats (day first): DD-MM-YYYY
pub(crate) const DATE_PATTERNS_DMY: &[&str] = &[
    "%d-%m-%Y", // 15-01-2024
    "%d/%m/%Y", // 15/01/2024
];

/// US date formats (month first): MM-DD-YYYY
pub(crate) const DATE_PATTERNS_MDY: &[&str] = &[
    "%m-%d-%Y", // 01-15-2024
    "%m/%d/%Y", // 01/15/2024
];

/// Spelled-out month names, unambiguous regardless of order preference
pub(crate) const DATE_PATTERNS_LONG: &[&str] = &[
    "%B %d, %Y", // January 15, 2024
    "%b %d, %Y", // Jan 15, 2024
    "%d %B %Y",  // 15 January 2024
    "%d %b %Y",  // 15 Jan 2024
];

/// Datetime formats we recognize
pub(crate) const DATETIME_PATTERNS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",    // ISO 8601
    "%Y-%m-%d %H:%M:%S",    // Common format
    "%Y-%m-%dT%H:%M:%S%.f", // ISO 8601 with fractional seconds
    "%Y-%m-%d %H:%M:%S%.f", // With fractional seconds
    "%Y-%m-%dT%H:%M",       // ISO 8601 without seconds
    "%Y-%m-%d %H:%M",
];

/// Date order preference for ambiguous dates like 01-02-2024
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateOrder {
    /// Year-Month-Day first, then Month-Day-Year, then Day-Month-Year (default)
    #[default]
    Auto,
    /// US format: Month-Day-Year (01-02-2024 = January 2)
    MDY,
    /// European format: Day-Month-Year (01-02-2024 = February 1)
    DMY,
}

impl DateOrder {
    /// Parse from string, returns None for invalid input
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "auto" => Some(DateOrder::Auto),
            "mdy" | "us" => Some(DateOrder::MDY),
            "dmy" | "eu" | "european" => Some(DateOrder::DMY),
            _ => None,
        }
    }

    /// Get date patterns in order of preference
    pub(crate) fn patterns(&self) -> Vec<&'static str> {
        let mut patterns = Vec::with_capacity(10);
        // ISO formats are always first (unambiguous)
        patterns.extend_from_slice(DATE_PATTERNS_ISO);
        match self {
            DateOrder::Auto | DateOrder::MDY => {
                patterns.extend_from_slice(DATE_PATTERNS_MDY);
                patterns.extend_from_slice(DATE_PATTERNS_DMY);
            }
            DateOrder::DMY => {
                patterns.extend_from_slice(DATE_PATTERNS_DMY);
                patterns.extend_from_slice(DATE_PATTERNS_MDY);
            }
        }
        patterns.extend_from_slice(DATE_PATTERNS_LONG);
        patterns
    }
}

/// A raw cell value as produced by a row mapper or read back from a file
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    String(String),
    Number(f64),
    Boolean(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(dt) => Some(*dt),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::String(s) => f.write_str(s),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            CellValue::Boolean(true) => f.write_str("TRUE"),
            CellValue::Boolean(false) => f.write_str("FALSE"),
            CellValue::Date(dt) => {
                if dt.num_seconds_from_midnight() == 0 && dt.nanosecond() == 0 {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                } else {
                    write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S"))
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&String> for CellValue {
    fn from(s: &String) -> Self {
        CellValue::String(s.clone())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<f32> for CellValue {
    fn from(n: f32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<u32> for CellValue {
    fn from(n: u32) -> Self {
        CellValue::Number(f64::from(n))
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<usize> for CellValue {
    fn from(n: usize) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Boolean(b)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(dt: NaiveDateTime) -> Self {
        CellValue::Date(dt)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(d: NaiveDate) -> Self {
        CellValue::Date(d.and_time(chrono::NaiveTime::MIN))
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(v: Option<V>) -> Self {
        v.map_or(CellValue::Empty, Into::into)
    }
}

/// Explicit per-cell type tag, controlling how the stored value is written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellKind {
    String,
    Number,
    Boolean,
    Date,
}

impl CellKind {
    /// Infer the initial tag of a freshly built cell
    pub(crate) fn infer(value: &CellValue) -> Self {
        match value {
            CellValue::Number(_) => CellKind::Number,
            CellValue::Boolean(_) => CellKind::Boolean,
            CellValue::Date(_) => CellKind::Date,
            CellValue::String(_) | CellValue::Empty => CellKind::String,
        }
    }
}

/// Semantic type requested for a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Number,
    Date,
}

impl ColumnType {
    /// Parse from string, returns None for invalid input
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "string" | "text" => Some(ColumnType::String),
            "number" | "numeric" => Some(ColumnType::Number),
            "date" => Some(ColumnType::Date),
            _ => None,
        }
    }
}

/// Width, type and display format of one column, matched to the grid by position
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnConfig {
    /// Width in pixels, `DEFAULT_COLUMN_WIDTH` when unset
    pub width: Option<u16>,
    pub kind: Option<ColumnType>,
    pub format: Option<String>,
}

impl ColumnConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    pub fn kind(mut self, kind: ColumnType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub(crate) fn effective_width(&self) -> u16 {
        self.width.unwrap_or(DEFAULT_COLUMN_WIDTH)
    }
}

/// Zero-based (row, col) cell address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAddress {
    pub row: u32,
    pub col: u16,
}

/// Rectangular merged region, both corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRange {
    pub start: CellAddress,
    pub end: CellAddress,
}

impl MergeRange {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            start: CellAddress {
                row: first_row,
                col: first_col,
            },
            end: CellAddress {
                row: last_row,
                col: last_col,
            },
        }
    }
}

/// One row read back from a spreadsheet, keyed by the header row
pub type Record = IndexMap<String, CellValue>;

/// Serialized workbook bytes tagged with their MIME type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl Blob {
    pub(crate) fn xlsx(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime_type: XLSX_MIME_TYPE,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Declarative description of one exported sheet.
///
/// `map_row` turns each data item and its index into a row of cells. Entries
/// of `data`, `header_rows` and `footer_rows` that are `None` are skipped;
/// the index passed to `map_row` still counts them.
pub struct ExportConfig<T, F>
where
    F: Fn(&T, usize) -> Vec<CellValue>,
{
    pub sheet_name: String,
    /// Flat single header row, used only when `header_rows` is empty
    pub header: Vec<String>,
    pub header_rows: Vec<Option<Vec<CellValue>>>,
    pub footer_rows: Vec<Option<Vec<CellValue>>>,
    /// Overrides the header row count inferred from `header_rows`
    pub header_row_count: Option<usize>,
    pub columns: Vec<ColumnConfig>,
    pub data: Vec<Option<T>>,
    pub map_row: F,
    pub merges: Vec<MergeRange>,
    pub date_order: DateOrder,
}

impl<T, F> ExportConfig<T, F>
where
    F: Fn(&T, usize) -> Vec<CellValue>,
{
    pub fn new(
        sheet_name: impl Into<String>,
        data: impl IntoIterator<Item = T>,
        map_row: F,
    ) -> Self {
        Self::from_sparse(sheet_name, data.into_iter().map(Some).collect(), map_row)
    }

    /// Like `new`, but `None` items are skipped without shifting the indices of the rest
    pub fn from_sparse(sheet_name: impl Into<String>, data: Vec<Option<T>>, map_row: F) -> Self {
        Self {
            sheet_name: sheet_name.into(),
            header: Vec::new(),
            header_rows: Vec::new(),
            footer_rows: Vec::new(),
            header_row_count: None,
            columns: Vec::new(),
            data,
            map_row,
            merges: Vec::new(),
            date_order: DateOrder::Auto,
        }
    }

    pub fn with_header<S: Into<String>>(mut self, header: impl IntoIterator<Item = S>) -> Self {
        self.header = header.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_header_rows(mut self, rows: Vec<Option<Vec<CellValue>>>) -> Self {
        self.header_rows = rows;
        self
    }

    pub fn with_footer_rows(mut self, rows: Vec<Option<Vec<CellValue>>>) -> Self {
        self.footer_rows = rows;
        self
    }

    pub fn with_header_row_count(mut self, count: usize) -> Self {
        self.header_row_count = Some(count);
        self
    }

    pub fn with_columns(mut self, columns: Vec<ColumnConfig>) -> Self {
        self.columns = columns;
        self
    }

    pub fn with_merges(mut self, merges: Vec<MergeRange>) -> Self {
        self.merges = merges;
        self
    }

    pub fn with_date_order(mut self, date_order: DateOrder) -> Self {
        self.date_order = date_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_accessors() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        assert_eq!(CellValue::from(2.5_f64).as_number(), Some(2.5));
        assert_eq!(CellValue::from("2.5").as_number(), None);
        assert_eq!(CellValue::from("Alpha").as_str(), Some("Alpha"));
        assert_eq!(CellValue::from(true).as_str(), None);
        assert_eq!(CellValue::from(date).as_date(), Some(date));
        assert_eq!(CellValue::Empty.as_date(), None);
        assert!(CellValue::from(None::<f64>).is_empty());
    }

    #[test]
    fn test_cell_value_display() {
        assert_eq!(CellValue::from(42_i32).to_string(), "42");
        assert_eq!(CellValue::from(1.5_f64).to_string(), "1.5");
        assert_eq!(CellValue::from(false).to_string(), "FALSE");
        assert_eq!(CellValue::Empty.to_string(), "");
        let dt = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(CellValue::from(dt).to_string(), "2024-01-02 09:30:00");
    }

    #[test]
    fn test_date_order_patterns() {
        assert_eq!(DateOrder::default(), DateOrder::Auto);
        assert_eq!(DateOrder::parse("EU"), Some(DateOrder::DMY));
        assert_eq!(DateOrder::parse("sideways"), None);

        let month_first = DateOrder::Auto.patterns();
        assert_eq!(&month_first[..2], DATE_PATTERNS_ISO);
        assert_eq!(month_first[2], "%m-%d-%Y");
        assert_eq!(DateOrder::DMY.patterns()[2], "%d-%m-%Y");
    }
}
