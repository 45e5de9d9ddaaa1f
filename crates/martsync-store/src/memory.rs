//! In-memory [`DocumentStore`] used by tests and emulator-less dry runs.
//!
//! Mirrors the store contract the pipeline relies on: merge semantics on
//! `MergeSet`, all-or-nothing commits, and commit-time resolution of the
//! server-timestamp sentinel.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::client::{DocumentStore, StoredDoc, WriteOp};
use crate::error::StoreError;
use crate::value::{DocFields, DocValue};

type Collections = BTreeMap<String, BTreeMap<String, DocFields>>;

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Collections>,
    failing: Mutex<HashSet<String>>,
    commits: Mutex<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook: any commit containing a write to this document fails as
    /// a whole (the batch is atomic, so none of its writes apply).
    pub fn fail_writes_to(&self, collection: &str, doc_id: &str) {
        self.failing
            .lock()
            .expect("memory store lock poisoned")
            .insert(doc_key(collection, doc_id));
    }

    /// Number of commit calls issued so far (including failed ones).
    #[must_use]
    pub fn commit_count(&self) -> usize {
        *self.commits.lock().expect("memory store lock poisoned")
    }

    fn resolve(fields: &DocFields) -> DocFields {
        fields
            .iter()
            .map(|(name, value)| {
                let resolved = if *value == DocValue::ServerTimestamp {
                    DocValue::Timestamp(Utc::now())
                } else {
                    value.clone()
                };
                (name.clone(), resolved)
            })
            .collect()
    }
}

fn doc_key(collection: &str, doc_id: &str) -> String {
    format!("{collection}/{doc_id}")
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_doc(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<DocFields>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock poisoned");
        Ok(inner
            .get(collection)
            .and_then(|docs| docs.get(doc_id))
            .cloned())
    }

    async fn list_docs(&self, collection: &str) -> Result<Vec<StoredDoc>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock poisoned");
        Ok(inner
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDoc {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: DocValue,
    ) -> Result<Vec<StoredDoc>, StoreError> {
        let docs = self.list_docs(collection).await?;
        Ok(docs
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(&value))
            .collect())
    }

    async fn commit(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        *self.commits.lock().expect("memory store lock poisoned") += 1;

        // Atomicity: check every write before applying any of them.
        {
            let failing = self.failing.lock().expect("memory store lock poisoned");
            for write in &writes {
                let (WriteOp::MergeSet {
                    collection, doc_id, ..
                }
                | WriteOp::Delete { collection, doc_id }) = write;
                if failing.contains(&doc_key(collection, doc_id)) {
                    return Err(StoreError::UnexpectedStatus {
                        status: 500,
                        url: format!("memory://{collection}/{doc_id}"),
                    });
                }
            }
        }

        let mut inner = self.inner.lock().expect("memory store lock poisoned");
        for write in writes {
            match write {
                WriteOp::MergeSet {
                    collection,
                    doc_id,
                    fields,
                } => {
                    let docs = inner.entry(collection).or_default();
                    let doc = docs.entry(doc_id).or_default();
                    for (name, value) in Self::resolve(&fields) {
                        doc.insert(name, value);
                    }
                }
                WriteOp::Delete { collection, doc_id } => {
                    if let Some(docs) = inner.get_mut(&collection) {
                        docs.remove(&doc_id);
                    }
                }
            }
        }
        Ok(())
    }

    async fn list_collection_ids(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.lock().expect("memory store lock poisoned");
        Ok(inner.keys().cloned().collect())
    }
}
