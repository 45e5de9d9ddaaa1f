//! Workbook reading: thin wrapper over `calamine` that materializes a
//! sheet as rows of untyped [`Cell`]s. No header detection happens here —
//! see [`crate::locator`].

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::error::SheetError;

/// One spreadsheet cell, reduced to the three shapes the pipeline cares
/// about. Dates, booleans and error cells are folded into text/empty —
/// the export uses none of them in the columns we read.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Renders the cell the way the ordering format's tooling always has:
    /// numbers print without a trailing `.0`, empty cells print as `""`.
    #[must_use]
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(v) => v.to_string(),
            Cell::Empty => String::new(),
        }
    }

    /// `true` when the cell is absent, empty, or whitespace-only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
            Cell::Empty => true,
        }
    }
}

fn from_data(cell: &Data) -> Cell {
    match cell {
        Data::String(v) => Cell::Text(v.to_string()),
        Data::Float(v) => Cell::Number(*v),
        #[allow(clippy::cast_precision_loss)]
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Bool(v) => Cell::Text(v.to_string()),
        Data::DateTime(v) => Cell::Text(v.to_string()),
        Data::DateTimeIso(v) | Data::DurationIso(v) => Cell::Text(v.to_string()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

/// List the sheet names of a workbook, in workbook order.
///
/// # Errors
///
/// Returns [`SheetError::Workbook`] if the file cannot be opened.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, SheetError> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names().to_vec())
}

/// Read one sheet (by name, or the first sheet when `sheet` is `None`)
/// into rows of [`Cell`]s. The whole sheet is materialized — exports are
/// bounded to a few thousand rows.
///
/// # Errors
///
/// Returns [`SheetError::Workbook`] if the file or sheet cannot be read,
/// or [`SheetError::EmptyWorkbook`] if the workbook has no sheets.
pub fn read_sheet(path: &Path, sheet: Option<&str>) -> Result<Vec<Vec<Cell>>, SheetError> {
    let mut workbook = open_workbook_auto(path)?;

    let name = match sheet {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| SheetError::EmptyWorkbook {
                path: path.display().to_string(),
            })?,
    };

    let range = workbook.worksheet_range(&name)?;
    let rows = range
        .rows()
        .map(|row| row.iter().map(from_data).collect())
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_renders_numbers_without_trailing_zero() {
        assert_eq!(Cell::Number(30_000_441.0).text(), "30000441");
        assert_eq!(Cell::Number(0.5).text(), "0.5");
    }

    #[test]
    fn text_of_empty_is_empty_string() {
        assert_eq!(Cell::Empty.text(), "");
    }

    #[test]
    fn blank_detection() {
        assert!(Cell::Empty.is_blank());
        assert!(Cell::Text(String::new()).is_blank());
        assert!(Cell::Text("   ".to_string()).is_blank());
        assert!(!Cell::Text("RAVA".to_string()).is_blank());
        assert!(!Cell::Number(0.0).is_blank());
    }

    #[test]
    fn from_data_maps_shapes() {
        assert_eq!(
            from_data(&Data::String("MAIDA".to_string())),
            Cell::Text("MAIDA".to_string())
        );
        assert_eq!(from_data(&Data::Float(12.5)), Cell::Number(12.5));
        assert_eq!(from_data(&Data::Int(7)), Cell::Number(7.0));
        assert_eq!(from_data(&Data::Empty), Cell::Empty);
    }
}
