//! The synchronizer: merge-upserts normalized records and their category
//! set into the store, in fixed-size atomic chunks.
//!
//! Partial success is the normal outcome, not an anomaly: a failed
//! category or chunk is logged and counted, and the rest of the run
//! proceeds. Nothing is retried and nothing is rolled back; the caller
//! reflects failures in its exit status.

use std::collections::{BTreeSet, HashSet};

use martsync_core::ProductRecord;

use crate::client::{DocumentStore, WriteOp};
use crate::error::StoreError;
use crate::value::{record_to_fields, DocFields, DocValue};

pub const PRODUCTS_COLLECTION: &str = "products";
pub const CATEGORIES_COLLECTION: &str = "categories";
const CREATED_AT_FIELD: &str = "createdAt";

/// Outcome counters at one granularity (records or categories).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteCounts {
    pub attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
}

impl WriteCounts {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Merge-upsert every distinct category, one document per category keyed
/// by the category name. Runs before product writes so product documents
/// never reference a missing category.
///
/// Individual failures are logged and counted; remaining categories are
/// still written (best-effort, not atomic).
///
/// # Errors
///
/// Returns [`StoreError`] only when the existing-id scan fails — at that
/// point nothing has been written and the caller should abort.
pub async fn write_categories(
    store: &dyn DocumentStore,
    categories: &BTreeSet<String>,
) -> Result<WriteCounts, StoreError> {
    let existing: HashSet<String> = store
        .list_doc_ids(CATEGORIES_COLLECTION)
        .await?
        .into_iter()
        .collect();

    let mut counts = WriteCounts {
        attempted: categories.len(),
        ..WriteCounts::default()
    };

    for category in categories {
        let mut fields = DocFields::new();
        fields.insert("name".to_string(), DocValue::Text(category.clone()));
        if !existing.contains(category) {
            fields.insert(CREATED_AT_FIELD.to_string(), DocValue::ServerTimestamp);
        }

        match store
            .set_merge(CATEGORIES_COLLECTION, category, fields)
            .await
        {
            Ok(()) => counts.succeeded += 1,
            Err(e) => {
                counts.failed += 1;
                tracing::error!(category = %category, error = %e, "category write failed");
            }
        }
    }

    Ok(counts)
}

/// Merge-upsert records into the products collection, keyed by canonical
/// identifier, in chunks of `chunk_size`. Each chunk is one atomic
/// commit; chunk N+1 is not issued until chunk N completes, bounding
/// in-flight writes to one.
///
/// A failed chunk counts all of its records as failed and later chunks
/// still execute. The creation timestamp is attached only to documents
/// that do not exist yet, so re-imports leave it untouched.
///
/// # Errors
///
/// Returns [`StoreError`] only when the existing-id scan fails — at that
/// point nothing has been written and the caller should abort.
pub async fn write_products(
    store: &dyn DocumentStore,
    records: &[ProductRecord],
    chunk_size: usize,
) -> Result<WriteCounts, StoreError> {
    let existing: HashSet<String> = store
        .list_doc_ids(PRODUCTS_COLLECTION)
        .await?
        .into_iter()
        .collect();

    let mut counts = WriteCounts {
        attempted: records.len(),
        ..WriteCounts::default()
    };

    let chunk_size = chunk_size.max(1);
    for (chunk_index, chunk) in records.chunks(chunk_size).enumerate() {
        let writes: Vec<WriteOp> = chunk
            .iter()
            .map(|record| {
                let mut fields = record_to_fields(record);
                if !existing.contains(&record.product_id) {
                    fields.insert(CREATED_AT_FIELD.to_string(), DocValue::ServerTimestamp);
                }
                WriteOp::MergeSet {
                    collection: PRODUCTS_COLLECTION.to_string(),
                    doc_id: record.product_id.clone(),
                    fields,
                }
            })
            .collect();

        match store.commit(writes).await {
            Ok(()) => {
                counts.succeeded += chunk.len();
                tracing::debug!(chunk = chunk_index, records = chunk.len(), "chunk committed");
            }
            Err(e) => {
                counts.failed += chunk.len();
                tracing::error!(
                    chunk = chunk_index,
                    records = chunk.len(),
                    error = %e,
                    "chunk commit failed; continuing with remaining chunks"
                );
            }
        }
    }

    Ok(counts)
}
