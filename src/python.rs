//! Python bindings, enabled with the `python` feature

use crate::error::ExcelError;
use crate::parse::parse_cell_range;
use crate::types::{CellValue, ColumnConfig, ColumnType, DateOrder, ExportConfig};
use chrono::{NaiveDate, NaiveDateTime};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyBool, PyBytes, PyDict, PyFloat, PyInt, PyString};
use std::collections::HashMap;

impl From<ExcelError> for PyErr {
    fn from(e: ExcelError) -> PyErr {
        PyValueError::new_err(e.to_string())
    }
}

/// Convert a Python scalar into a cell value
fn extract_cell(value: &Bound<'_, PyAny>) -> PyResult<CellValue> {
    if value.is_none() {
        return Ok(CellValue::Empty);
    }
    // bool before int: Python bools are ints
    if value.is_instance_of::<PyBool>() {
        return Ok(CellValue::Boolean(value.extract()?));
    }
    if value.is_instance_of::<PyInt>() || value.is_instance_of::<PyFloat>() {
        return Ok(CellValue::Number(value.extract()?));
    }
    if value.is_instance_of::<PyString>() {
        return Ok(CellValue::String(value.extract()?));
    }
    // datetime before date: datetime is a date subclass
    if let Ok(dt) = value.extract::<NaiveDateTime>() {
        return Ok(CellValue::Date(dt));
    }
    if let Ok(d) = value.extract::<NaiveDate>() {
        return Ok(CellValue::from(d));
    }
    Ok(CellValue::String(value.str()?.to_string()))
}

fn extract_row(row: &Bound<'_, PyAny>) -> PyResult<Vec<CellValue>> {
    row.try_iter()?
        .map(|item| extract_cell(&item?))
        .collect()
}

fn extract_optional_rows(
    rows: Option<Vec<Bound<'_, PyAny>>>,
) -> PyResult<Vec<Option<Vec<CellValue>>>> {
    rows.unwrap_or_default()
        .iter()
        .map(|row| {
            if row.is_none() {
                Ok(None)
            } else {
                extract_row(row).map(Some)
            }
        })
        .collect()
}

/// Extract column configs from dicts with optional "width", "type" and "format" keys
fn extract_columns(columns: Vec<HashMap<String, Bound<'_, PyAny>>>) -> PyResult<Vec<ColumnConfig>> {
    columns
        .into_iter()
        .map(|col| {
            let width = col.get("width").map(|v| v.extract::<u16>()).transpose()?;
            let kind = match col.get("type") {
                Some(v) if !v.is_none() => {
                    let name: String = v.extract()?;
                    Some(ColumnType::parse(&name).ok_or_else(|| {
                        PyValueError::new_err(format!(
                            "Invalid column type '{}'. Valid values: string, number, date",
                            name
                        ))
                    })?)
                }
                _ => None,
            };
            let format = match col.get("format") {
                Some(v) if !v.is_none() => Some(v.extract::<String>()?),
                _ => None,
            };
            Ok(ColumnConfig {
                width,
                kind,
                format,
            })
        })
        .collect()
}

/// Build an XLSX workbook from a declarative sheet description.
///
/// Args:
///     sheet_name: Name of the single worksheet
///     data: Items to export; None items are skipped
///     map_row: Callable (item, index) -> list of cell values. When omitted,
///              each item must already be a list of cell values.
///     header: Flat header row, used when header_rows is not given
///     header_rows: List of header rows; None entries are skipped
///     footer_rows: List of footer rows; None entries are skipped
///     header_row_count: Override for the number of rows excluded from typing
///     columns: List of dicts with optional "width" (pixels), "type"
///              ("string", "number", "date") and "format" keys
///     merges: List of ranges like "A1:B1"
///     date_order: Order for ambiguous dates: "auto", "mdy"/"us", "dmy"/"eu"
///
/// Returns:
///     The workbook as bytes
///
/// Example:
///     >>> import xlsxport
///     >>> data = xlsxport.export_to_excel(
///     ...     "Report", [{"n": 1, "name": "Alpha"}],
///     ...     map_row=lambda item, idx: [item["n"] + idx, item["name"]],
///     ...     header=["No", "Name"],
///     ...     columns=[{"width": 50, "type": "number"}, {"width": 120}],
///     ... )
#[pyfunction]
#[pyo3(name = "export_to_excel", signature = (sheet_name, data, map_row = None, header = None, header_rows = None, footer_rows = None, header_row_count = None, columns = None, merges = None, date_order = "auto"))]
#[allow(clippy::too_many_arguments)]
fn py_export_to_excel<'py>(
    py: Python<'py>,
    sheet_name: &str,
    data: Vec<Bound<'py, PyAny>>,
    map_row: Option<Bound<'py, PyAny>>,
    header: Option<Vec<String>>,
    header_rows: Option<Vec<Bound<'py, PyAny>>>,
    footer_rows: Option<Vec<Bound<'py, PyAny>>>,
    header_row_count: Option<usize>,
    columns: Option<Vec<HashMap<String, Bound<'py, PyAny>>>>,
    merges: Option<Vec<String>>,
    date_order: &str,
) -> PyResult<Bound<'py, PyBytes>> {
    let order = DateOrder::parse(date_order).ok_or_else(|| {
        PyValueError::new_err(format!(
            "Invalid date_order '{}'. Valid values: auto, mdy, us, dmy, eu",
            date_order
        ))
    })?;

    // Python callables can raise, so rows are mapped up front
    let mut rows: Vec<Option<Vec<CellValue>>> = Vec::with_capacity(data.len());
    for (idx, item) in data.iter().enumerate() {
        if item.is_none() {
            rows.push(None);
            continue;
        }
        let row = match &map_row {
            Some(func) => extract_row(&func.call1((item.clone(), idx))?)?,
            None => extract_row(item)?,
        };
        rows.push(Some(row));
    }

    let merges = merges
        .unwrap_or_default()
        .iter()
        .map(|range| parse_cell_range(range))
        .collect::<Result<Vec<_>, _>>()?;

    let mut config = ExportConfig::from_sparse(sheet_name, rows, |row: &Vec<CellValue>, _| {
        row.clone()
    })
    .with_header(header.unwrap_or_default())
    .with_header_rows(extract_optional_rows(header_rows)?)
    .with_footer_rows(extract_optional_rows(footer_rows)?)
    .with_columns(extract_columns(columns.unwrap_or_default())?)
    .with_merges(merges)
    .with_date_order(order);
    config.header_row_count = header_row_count;

    let blob = crate::export_to_excel(&config)?;
    Ok(PyBytes::new(py, blob.bytes()))
}

/// Read the first sheet of an XLSX file into a list of dicts keyed by the header row.
///
/// Raises:
///     ValueError: If the workbook has no worksheets or cannot be parsed
#[pyfunction]
#[pyo3(name = "read_excel_to_records")]
fn py_read_excel_to_records<'py>(
    py: Python<'py>,
    data: &[u8],
) -> PyResult<Vec<Bound<'py, PyDict>>> {
    let records = crate::read_excel_to_records(data)?;

    records
        .iter()
        .map(|record| {
            let dict = PyDict::new(py);
            for (key, value) in record {
                match value {
                    CellValue::Empty => dict.set_item(key, "")?,
                    CellValue::String(s) => dict.set_item(key, s)?,
                    CellValue::Number(n) => dict.set_item(key, *n)?,
                    CellValue::Boolean(b) => dict.set_item(key, *b)?,
                    CellValue::Date(dt) => dict.set_item(key, *dt)?,
                }
            }
            Ok(dict)
        })
        .collect()
}

/// Get the version of the xlsxport library
#[pyfunction]
fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[pymodule]
fn xlsxport(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(py_export_to_excel, m)?)?;
    m.add_function(wrap_pyfunction!(py_read_excel_to_records, m)?)?;
    m.add_function(wrap_pyfunction!(version, m)?)?;
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    Ok(())
}
