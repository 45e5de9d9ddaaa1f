//! Pipeline orchestration: locate the header, normalize every data row,
//! then synchronize categories and products into the store.
//!
//! One run is one logical thread of control. The only suspension points
//! are the store calls, issued sequentially; there is no mid-run
//! cancellation — a run either completes or aborts fatally on header
//! resolution.

use std::collections::{BTreeSet, HashMap};

use thiserror::Error;

use martsync_core::{CatalogRules, ProductRecord};
use martsync_sheet::{locate_header, resolve_columns, Cell, Normalizer, SheetError};
use martsync_store::{write_categories, write_products, DocumentStore, StoreError, WriteCounts};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    /// Only pre-write store failures (the existing-id scans) surface
    /// here; write failures are captured in the summary counts instead.
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy)]
pub struct ImportOptions {
    pub chunk_size: usize,
    /// Parse and report, write nothing.
    pub dry_run: bool,
}

/// What one import run did. The process exit status must be non-zero
/// when [`RunSummary::has_failures`] is true; partial writes are never
/// rolled back.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSummary {
    pub header_row: usize,
    pub parsed: usize,
    pub skipped: usize,
    pub collisions: usize,
    pub category_count: usize,
    pub categories: WriteCounts,
    pub products: WriteCounts,
}

impl RunSummary {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.categories.has_failures() || self.products.has_failures()
    }
}

/// Outcome of the parse stages alone (no store access).
pub struct ParsedSheet {
    pub header_row: usize,
    pub records: Vec<ProductRecord>,
    pub categories: BTreeSet<String>,
    pub skipped: usize,
    pub collisions: usize,
}

/// Locate the header and normalize every data row below it.
///
/// Rows with a blank product name are skipped silently. Two rows deriving
/// the same canonical identifier collide: the later row replaces the
/// earlier one (last write wins) and a warning is logged — see DESIGN.md.
///
/// # Errors
///
/// Returns [`SheetError::HeaderNotFound`] when the marker row or the
/// product-name column is missing; the caller must abort before writes.
pub fn parse_rows(rows: &[Vec<Cell>], rules: CatalogRules) -> Result<ParsedSheet, SheetError> {
    let header_row = locate_header(rows, &rules.header_marker)?;
    let columns = resolve_columns(&rows[header_row], &rules.columns)?;
    let normalizer = Normalizer::new(rules);

    let mut records: Vec<ProductRecord> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    let mut categories = BTreeSet::new();
    let mut skipped = 0usize;
    let mut collisions = 0usize;

    for row in &rows[header_row + 1..] {
        let Some(record) = normalizer.normalize_row(row, &columns) else {
            skipped += 1;
            continue;
        };

        categories.insert(record.category.clone());

        if let Some(&existing) = index_by_id.get(&record.product_id) {
            collisions += 1;
            tracing::warn!(
                product_id = %record.product_id,
                kept = %record.name,
                replaced = %records[existing].name,
                "identifier collision: last row wins"
            );
            records[existing] = record;
        } else {
            index_by_id.insert(record.product_id.clone(), records.len());
            records.push(record);
        }
    }

    Ok(ParsedSheet {
        header_row,
        records,
        categories,
        skipped,
        collisions,
    })
}

/// Run the full pipeline against a materialized sheet.
///
/// Categories are written before products so product documents never
/// reference a missing category. With `dry_run` the store is never
/// touched and the write counts stay zero.
///
/// # Errors
///
/// Returns [`ImportError::Sheet`] on header resolution failure (before
/// any write), or [`ImportError::Store`] when a pre-write collection
/// scan fails. Individual write failures are counted in the summary,
/// not returned.
pub async fn run_import(
    rows: &[Vec<Cell>],
    rules: CatalogRules,
    store: &dyn DocumentStore,
    options: ImportOptions,
) -> Result<RunSummary, ImportError> {
    let parsed = parse_rows(rows, rules)?;

    let mut summary = RunSummary {
        header_row: parsed.header_row,
        parsed: parsed.records.len(),
        skipped: parsed.skipped,
        collisions: parsed.collisions,
        category_count: parsed.categories.len(),
        ..RunSummary::default()
    };

    tracing::info!(
        header_row = parsed.header_row,
        records = parsed.records.len(),
        categories = parsed.categories.len(),
        skipped = parsed.skipped,
        "sheet parsed"
    );

    if options.dry_run {
        tracing::info!("dry run: skipping store writes");
        return Ok(summary);
    }

    summary.categories = write_categories(store, &parsed.categories).await?;
    summary.products = write_products(store, &parsed.records, options.chunk_size).await?;

    tracing::info!(
        categories_ok = summary.categories.succeeded,
        categories_failed = summary.categories.failed,
        products_ok = summary.products.succeeded,
        products_failed = summary.products.failed,
        "import finished"
    );

    Ok(summary)
}
