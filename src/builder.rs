//! Row assembly: header rows, mapped data rows and footer rows into one worksheet

use crate::sheet::Worksheet;
use crate::types::{CellValue, ExportConfig};
use std::ops::Range;

/// Output of the row assembler
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltSheet {
    pub worksheet: Worksheet,
    pub total_rows: usize,
    pub header_row_count: usize,
}

impl BuiltSheet {
    /// Row indices subject to column typing: everything after the header,
    /// footers included
    pub fn data_rows(&self) -> Range<usize> {
        self.header_row_count.min(self.total_rows)..self.total_rows
    }
}

/// Assemble the worksheet described by `config`.
///
/// Blocks are always laid out header, data, footer. `None` entries are
/// dropped without leaving a blank row; the flat `header` is used only when
/// `header_rows` is empty.
pub fn build_sheet<T, F>(config: &ExportConfig<T, F>) -> BuiltSheet
where
    F: Fn(&T, usize) -> Vec<CellValue>,
{
    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(
        config.header_rows.len().max(1) + config.data.len() + config.footer_rows.len(),
    );

    if !config.header_rows.is_empty() {
        rows.extend(config.header_rows.iter().flatten().cloned());
    } else if !config.header.is_empty() {
        rows.push(config.header.iter().map(CellValue::from).collect());
    }

    for (idx, item) in config.data.iter().enumerate() {
        if let Some(item) = item {
            rows.push((config.map_row)(item, idx));
        }
    }

    rows.extend(config.footer_rows.iter().flatten().cloned());

    let total_rows = rows.len();
    let mut worksheet = Worksheet::from_rows(rows);

    if !config.merges.is_empty() {
        worksheet.set_merges(config.merges.clone());
    }

    let header_row_count = config.header_row_count.unwrap_or(if config.header_rows.is_empty() {
        1
    } else {
        config.header_rows.len()
    });

    log::debug!(
        "Built sheet '{}': {} rows, {} header rows, {} merges",
        config.sheet_name,
        total_rows,
        header_row_count,
        worksheet.merges().len()
    );

    BuiltSheet {
        worksheet,
        total_rows,
        header_row_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MergeRange;

    struct Item {
        value: &'static str,
    }

    fn row(values: &[&str]) -> Vec<CellValue> {
        values.iter().map(|v| CellValue::from(*v)).collect()
    }

    #[test]
    fn test_header_rows_footer_and_merges() {
        let config = ExportConfig::new(
            "Any",
            vec![Item { value: "x" }, Item { value: "y" }],
            |item: &Item, _| row(&[item.value, item.value.to_uppercase().as_str()]),
        )
        .with_header_rows(vec![
            Some(row(&["Title", "Subtitle"])),
            Some(row(&["Header A", "Header B"])),
        ])
        .with_footer_rows(vec![Some(vec!["Total".into(), 2.into()])])
        .with_merges(vec![MergeRange::new(0, 0, 0, 1)]);

        let built = build_sheet(&config);

        assert_eq!(
            built.worksheet.to_rows(),
            vec![
                row(&["Title", "Subtitle"]),
                row(&["Header A", "Header B"]),
                row(&["x", "X"]),
                row(&["y", "Y"]),
                vec!["Total".into(), 2.into()],
            ]
        );
        assert_eq!(built.total_rows, 5);
        assert_eq!(built.header_row_count, 2);
        assert_eq!(built.worksheet.merges(), &[MergeRange::new(0, 0, 0, 1)]);
        assert_eq!(built.data_rows(), 2..5);
    }

    #[test]
    fn test_flat_header_with_count_override() {
        let config = ExportConfig::new("Any", Vec::<Item>::new(), |_: &Item, _| Vec::new())
            .with_header(["Col1", "Col2"])
            .with_header_row_count(3);

        let built = build_sheet(&config);

        assert_eq!(built.worksheet.to_rows(), vec![row(&["Col1", "Col2"])]);
        assert_eq!(built.total_rows, 1);
        assert_eq!(built.header_row_count, 3);
        assert!(built.data_rows().is_empty());
    }

    #[test]
    fn test_header_row_count_inference() {
        let map = |item: &i32, _: usize| vec![CellValue::from(*item)];

        let flat = ExportConfig::new("S", vec![1], map).with_header(["A"]);
        assert_eq!(build_sheet(&flat).header_row_count, 1);

        let none = ExportConfig::new("S", vec![1], map);
        assert_eq!(build_sheet(&none).header_row_count, 1);

        // Null entries still count towards the inferred header size
        let multi = ExportConfig::new("S", vec![1], map).with_header_rows(vec![
            Some(row(&["A"])),
            None,
            Some(row(&["B"])),
        ]);
        let built = build_sheet(&multi);
        assert_eq!(built.header_row_count, 3);
        assert_eq!(built.total_rows, 3);
    }

    #[test]
    fn test_header_rows_take_precedence_over_flat_header() {
        let config = ExportConfig::new("S", Vec::<i32>::new(), |_: &i32, _| Vec::new())
            .with_header(["Flat"])
            .with_header_rows(vec![Some(row(&["Rows"]))]);

        assert_eq!(build_sheet(&config).worksheet.to_rows(), vec![row(&["Rows"])]);
    }

    #[test]
    fn test_null_rows_and_items_are_dropped() {
        let config = ExportConfig::from_sparse(
            "S",
            vec![Some("a"), None, Some("c")],
            |item: &&str, idx| vec![CellValue::from(*item), CellValue::from(idx)],
        )
        .with_header_rows(vec![None, Some(row(&["H"]))])
        .with_footer_rows(vec![None, Some(row(&["F"])), None]);

        let built = build_sheet(&config);

        assert_eq!(
            built.worksheet.to_rows(),
            vec![
                row(&["H"]),
                vec!["a".into(), 0.into()],
                vec!["c".into(), 2.into()],
                row(&["F"]),
            ]
        );
        assert_eq!(built.total_rows, 4);
    }

    #[test]
    fn test_empty_mapped_row_is_kept() {
        let config = ExportConfig::new("S", vec![1, 2], |_: &i32, _| Vec::new());
        let built = build_sheet(&config);
        assert_eq!(built.total_rows, 2);
        assert_eq!(built.worksheet.cells().count(), 0);
    }

    #[test]
    fn test_empty_config_yields_empty_grid() {
        let config = ExportConfig::new("S", Vec::<i32>::new(), |_: &i32, _| Vec::new());
        let built = build_sheet(&config);
        assert_eq!(built.total_rows, 0);
        assert_eq!(built.worksheet.row_count(), 0);
        assert_eq!(built.header_row_count, 1);
        assert!(built.worksheet.merges().is_empty());
    }
}
