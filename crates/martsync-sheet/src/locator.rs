//! Header locating and logical-column resolution.
//!
//! The order-format export buries its header row somewhere below a title
//! block of variable height, so the header is found by content (the
//! marker token), never by a fixed offset.

use martsync_core::ColumnKeywords;

use crate::error::SheetError;
use crate::reader::Cell;

/// Resolved positions of the logical columns within the header row.
///
/// Only the product name is mandatory; every other column degrades to a
/// per-field default when its header cell is missing from the export.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    pub item_code: Option<usize>,
    pub product_name: usize,
    pub gst_rate: Option<usize>,
    pub hsn_code: Option<usize>,
    pub order_qty: Option<usize>,
    pub selling_price: Option<usize>,
    pub buying_price: Option<usize>,
}

/// Find the header row: the first row containing a cell whose text equals
/// the marker token exactly.
///
/// # Errors
///
/// Returns [`SheetError::HeaderNotFound`] when no row carries the marker;
/// the caller must abort the run before any writes.
pub fn locate_header(rows: &[Vec<Cell>], marker: &str) -> Result<usize, SheetError> {
    rows.iter()
        .position(|row| row.iter().any(|cell| cell.text() == marker))
        .ok_or_else(|| SheetError::HeaderNotFound {
            reason: format!("no row contains the marker cell '{marker}'"),
        })
}

/// Resolve logical columns against the header row.
///
/// A header cell matches a column when it contains, case-insensitively,
/// every keyword configured for that column; the leftmost matching cell
/// wins.
///
/// # Errors
///
/// Returns [`SheetError::HeaderNotFound`] when the product-name column
/// cannot be resolved.
pub fn resolve_columns(
    header: &[Cell],
    keywords: &ColumnKeywords,
) -> Result<ColumnMap, SheetError> {
    let product_name =
        find_column(header, &keywords.product_name).ok_or_else(|| SheetError::HeaderNotFound {
            reason: "no header cell matches the product-name keywords".to_string(),
        })?;

    Ok(ColumnMap {
        item_code: find_column(header, &keywords.item_code),
        product_name,
        gst_rate: find_column(header, &keywords.gst_rate),
        hsn_code: find_column(header, &keywords.hsn_code),
        order_qty: find_column(header, &keywords.order_qty),
        selling_price: find_column(header, &keywords.selling_price),
        buying_price: find_column(header, &keywords.buying_price),
    })
}

fn find_column(header: &[Cell], keywords: &[String]) -> Option<usize> {
    if keywords.is_empty() {
        return None;
    }
    header.iter().position(|cell| {
        let text = cell.text().to_lowercase();
        keywords.iter().all(|k| text.contains(&k.to_lowercase()))
    })
}
