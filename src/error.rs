//! Error type shared by the export and read paths

use thiserror::Error;

/// Errors surfaced by xlsxport.
///
/// Column typing never produces one of these: malformed cell content only
/// degrades formatting, it never aborts an export.
#[derive(Debug, Error)]
pub enum ExcelError {
    /// The parsed workbook declares zero sheets.
    #[error("The Excel file does not contain any worksheets.")]
    NoWorksheets,

    /// The first declared sheet is missing from the parsed workbook.
    #[error("Worksheet \"{0}\" could not be found.")]
    WorksheetNotFound(String),

    #[error("Failed to read workbook: {0}")]
    Read(calamine::XlsxError),

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    LimitExceeded(String),
}

impl From<calamine::XlsxError> for ExcelError {
    fn from(e: calamine::XlsxError) -> Self {
        match e {
            calamine::XlsxError::WorksheetNotFound(name) => ExcelError::WorksheetNotFound(name),
            other => ExcelError::Read(other),
        }
    }
}
