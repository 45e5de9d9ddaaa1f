//! Document-store access: the [`DocumentStore`] trait the pipeline is
//! written against, and [`FirestoreClient`], its Firestore REST v1
//! implementation.
//!
//! The trait exists so the synchronizer and the CLI receive a store
//! handle at construction (no process-wide singleton) and so tests can
//! substitute [`crate::MemoryStore`]. The client wraps `reqwest` with
//! store-specific error handling and typed value decoding; use
//! [`FirestoreClient::new`] for production or
//! [`FirestoreClient::with_base_url`] to point at an emulator or a mock
//! server in tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::StoreError;
use crate::value::{split_transforms, DocFields, DocValue};

const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const LIST_PAGE_SIZE: usize = 300;

/// One document read back from a collection.
#[derive(Debug, Clone)]
pub struct StoredDoc {
    pub id: String,
    pub fields: DocFields,
}

/// One queued operation of an atomic batch commit.
///
/// `MergeSet` creates the document if absent or shallow-merges the
/// supplied fields into it if present; fields holding
/// [`DocValue::ServerTimestamp`] become store-side timestamp transforms.
#[derive(Debug, Clone)]
pub enum WriteOp {
    MergeSet {
        collection: String,
        doc_id: String,
        fields: DocFields,
    },
    Delete {
        collection: String,
        doc_id: String,
    },
}

/// The store interface the pipeline consumes. A batch passed to
/// [`DocumentStore::commit`] applies atomically or not at all.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document's fields, or `None` if it does not exist.
    async fn get_doc(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<DocFields>, StoreError>;

    /// Full scan of a collection. Collections here are bounded to a few
    /// thousand documents, so a whole-collection read is acceptable.
    async fn list_docs(&self, collection: &str) -> Result<Vec<StoredDoc>, StoreError>;

    /// Documents whose `field` equals `value`.
    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: DocValue,
    ) -> Result<Vec<StoredDoc>, StoreError>;

    /// Apply all writes atomically, or none of them.
    async fn commit(&self, writes: Vec<WriteOp>) -> Result<(), StoreError>;

    /// Ids of the root collections.
    async fn list_collection_ids(&self) -> Result<Vec<String>, StoreError>;

    /// Ids of the documents in a collection.
    async fn list_doc_ids(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .list_docs(collection)
            .await?
            .into_iter()
            .map(|d| d.id)
            .collect())
    }

    /// Single-document merge-upsert (a one-op commit).
    async fn set_merge(
        &self,
        collection: &str,
        doc_id: &str,
        fields: DocFields,
    ) -> Result<(), StoreError> {
        self.commit(vec![WriteOp::MergeSet {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
            fields,
        }])
        .await
    }

    /// Single-document delete (a one-op commit).
    async fn delete_doc(&self, collection: &str, doc_id: &str) -> Result<(), StoreError> {
        self.commit(vec![WriteOp::Delete {
            collection: collection.to_string(),
            doc_id: doc_id.to_string(),
        }])
        .await
    }
}

/// Firestore REST v1 client.
pub struct FirestoreClient {
    client: reqwest::Client,
    base_url: String,
    project_id: String,
    token: Option<String>,
}

impl FirestoreClient {
    /// Creates a client pointed at the production Firestore endpoint.
    ///
    /// `token` is a pre-issued OAuth bearer token; pass `None` only when
    /// talking to the emulator.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        project_id: &str,
        token: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, StoreError> {
        Self::with_base_url(project_id, token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (emulator, or wiremock in
    /// tests).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`StoreError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn with_base_url(
        project_id: &str,
        token: Option<String>,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("martsync/0.1 (catalog-sync)")
            .build()?;

        let trimmed = base_url.trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| StoreError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            base_url: trimmed.to_string(),
            project_id: project_id.to_string(),
            token,
        })
    }

    /// The database resource prefix all document names share.
    fn database_path(&self) -> String {
        format!("projects/{}/databases/(default)/documents", self.project_id)
    }

    fn documents_root(&self) -> String {
        format!("{}/v1/{}", self.base_url, self.database_path())
    }

    fn doc_name(&self, collection: &str, doc_id: &str) -> String {
        format!("{}/{collection}/{doc_id}", self.database_path())
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn read_json(response: reqwest::Response, context: &str) -> Result<Value, StoreError> {
        let status = response.status();
        let url = response.url().to_string();
        if !status.is_success() {
            return Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| StoreError::Deserialize {
            context: context.to_string(),
            source: e,
        })
    }

    fn wire_to_fields(value: &Value) -> DocFields {
        let mut fields = DocFields::new();
        if let Some(map) = value.get("fields").and_then(Value::as_object) {
            for (name, wire) in map {
                fields.insert(name.clone(), DocValue::from_wire(wire));
            }
        }
        fields
    }

    fn wire_to_doc(document: &Value) -> Option<StoredDoc> {
        let name = document.get("name")?.as_str()?;
        let id = name.rsplit('/').next()?.to_string();
        Some(StoredDoc {
            id,
            fields: Self::wire_to_fields(document),
        })
    }

    fn write_to_wire(&self, write: &WriteOp) -> Value {
        match write {
            WriteOp::MergeSet {
                collection,
                doc_id,
                fields,
            } => {
                let (plain, transforms) = split_transforms(fields);
                let wire_fields: serde_json::Map<String, Value> = plain
                    .iter()
                    .map(|(name, value)| (name.clone(), value.to_wire()))
                    .collect();
                let field_paths: Vec<String> = plain.keys().cloned().collect();
                let mut write = json!({
                    "update": {
                        "name": self.doc_name(collection, doc_id),
                        "fields": wire_fields,
                    },
                    "updateMask": { "fieldPaths": field_paths },
                });
                if !transforms.is_empty() {
                    let entries: Vec<Value> = transforms
                        .iter()
                        .map(|path| json!({ "fieldPath": path, "setToServerValue": "REQUEST_TIME" }))
                        .collect();
                    write["updateTransforms"] = Value::Array(entries);
                }
                write
            }
            WriteOp::Delete { collection, doc_id } => {
                json!({ "delete": self.doc_name(collection, doc_id) })
            }
        }
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn get_doc(
        &self,
        collection: &str,
        doc_id: &str,
    ) -> Result<Option<DocFields>, StoreError> {
        let url = format!("{}/{collection}/{doc_id}", self.documents_root());
        let response = self.authorize(self.client.get(&url)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let body = Self::read_json(response, &format!("get {collection}/{doc_id}")).await?;
        Ok(Some(Self::wire_to_fields(&body)))
    }

    async fn list_docs(&self, collection: &str) -> Result<Vec<StoredDoc>, StoreError> {
        let url = format!("{}/{collection}", self.documents_root());
        let mut docs = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = self.authorize(request).send().await?;
            let body = Self::read_json(response, &format!("list {collection}")).await?;

            if let Some(documents) = body.get("documents").and_then(Value::as_array) {
                docs.extend(documents.iter().filter_map(Self::wire_to_doc));
            }

            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(docs)
    }

    async fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: DocValue,
    ) -> Result<Vec<StoredDoc>, StoreError> {
        let url = format!("{}:runQuery", self.documents_root());
        let body = json!({
            "structuredQuery": {
                "from": [{ "collectionId": collection }],
                "where": {
                    "fieldFilter": {
                        "field": { "fieldPath": field },
                        "op": "EQUAL",
                        "value": value.to_wire(),
                    }
                }
            }
        });

        let response = self.authorize(self.client.post(&url).json(&body)).send().await?;
        let body =
            Self::read_json(response, &format!("runQuery {collection}.{field}")).await?;

        // The response is a JSON array; rows without a `document` key are
        // bookkeeping entries (read time, partial progress).
        let docs = body
            .as_array()
            .map(|rows| {
                rows.iter()
                    .filter_map(|row| row.get("document"))
                    .filter_map(Self::wire_to_doc)
                    .collect()
            })
            .unwrap_or_default();

        Ok(docs)
    }

    async fn commit(&self, writes: Vec<WriteOp>) -> Result<(), StoreError> {
        if writes.is_empty() {
            return Ok(());
        }
        let url = format!("{}:commit", self.documents_root());
        let wire_writes: Vec<Value> = writes.iter().map(|w| self.write_to_wire(w)).collect();
        let body = json!({ "writes": wire_writes });

        let response = self.authorize(self.client.post(&url).json(&body)).send().await?;
        Self::read_json(response, "commit").await?;
        Ok(())
    }

    async fn list_collection_ids(&self) -> Result<Vec<String>, StoreError> {
        let url = format!("{}:listCollectionIds", self.documents_root());
        let mut ids = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut body = json!({ "pageSize": LIST_PAGE_SIZE });
            if let Some(token) = &page_token {
                body["pageToken"] = json!(token);
            }
            let response = self.authorize(self.client.post(&url).json(&body)).send().await?;
            let body = Self::read_json(response, "listCollectionIds").await?;

            if let Some(found) = body.get("collectionIds").and_then(Value::as_array) {
                ids.extend(
                    found
                        .iter()
                        .filter_map(Value::as_str)
                        .map(ToString::to_string),
                );
            }

            match body.get("nextPageToken").and_then(Value::as_str) {
                Some(token) if !token.is_empty() => page_token = Some(token.to_string()),
                _ => break,
            }
        }

        Ok(ids)
    }
}
