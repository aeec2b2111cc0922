//! In-memory worksheet: an addressable grid of tagged cells plus sheet metadata

use crate::types::{CellKind, CellValue, MergeRange};

/// A single stored cell: raw value, explicit type tag and optional display format
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub kind: CellKind,
    pub format: Option<String>,
}

impl Cell {
    pub(crate) fn new(value: CellValue) -> Self {
        let kind = CellKind::infer(&value);
        Self {
            value,
            kind,
            format: None,
        }
    }
}

/// Worksheet under construction.
///
/// Created by the row assembler, mutated in place by the column typer and
/// consumed by the serializer. Empty values never produce a cell, so
/// addressing one yields `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Worksheet {
    rows: Vec<Vec<Option<Cell>>>,
    column_widths: Vec<u16>,
    merges: Vec<MergeRange>,
}

impl Worksheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a worksheet from a 2D array of values
    pub fn from_rows(rows: Vec<Vec<CellValue>>) -> Self {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|value| (!value.is_empty()).then(|| Cell::new(value)))
                    .collect()
            })
            .collect();
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row)?.get(col)?.as_ref()
    }

    pub fn cell_mut(&mut self, row: usize, col: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row)?.get_mut(col)?.as_mut()
    }

    /// Iterate over every stored cell with its (row, col) address
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize, &Cell)> {
        self.rows.iter().enumerate().flat_map(|(r, row)| {
            row.iter()
                .enumerate()
                .filter_map(move |(c, cell)| cell.as_ref().map(|cell| (r, c, cell)))
        })
    }

    /// Read the grid back as raw values; missing cells become `Empty`
    pub fn to_rows(&self) -> Vec<Vec<CellValue>> {
        self.rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map_or(CellValue::Empty, |c| c.value.clone()))
                    .collect()
            })
            .collect()
    }

    pub fn column_widths(&self) -> &[u16] {
        &self.column_widths
    }

    pub fn set_column_widths(&mut self, widths: Vec<u16>) {
        self.column_widths = widths;
    }

    pub fn merges(&self) -> &[MergeRange] {
        &self.merges
    }

    pub fn set_merges(&mut self, merges: Vec<MergeRange>) {
        self.merges = merges;
    }
}
