//! Typed document values and their Firestore REST wire encoding.
//!
//! Firestore's REST API wraps every field in a typed envelope
//! (`{"stringValue": ...}`, `{"doubleValue": ...}`, ...); integers travel
//! as strings. The server-timestamp sentinel has no field encoding — it
//! is expressed as an `updateTransforms` entry at commit time, so
//! [`split_transforms`] separates it from the plain fields.

use std::collections::BTreeMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Value};

use martsync_core::ProductRecord;

/// One typed field value as the pipeline sees it.
#[derive(Debug, Clone, PartialEq)]
pub enum DocValue {
    Null,
    Bool(bool),
    Integer(i64),
    Double(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    /// Resolved by the store at commit time ("first write" semantics are
    /// the synchronizer's responsibility — see `sync`).
    ServerTimestamp,
}

impl DocValue {
    /// Numeric view: doubles pass through, integers widen.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            DocValue::Double(v) => Some(*v),
            #[allow(clippy::cast_precision_loss)]
            DocValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DocValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Encode as a Firestore typed value.
    ///
    /// `ServerTimestamp` has no field encoding and must be split out via
    /// [`split_transforms`] first; if it reaches this function it encodes
    /// as a null value.
    #[must_use]
    pub fn to_wire(&self) -> Value {
        match self {
            DocValue::Null | DocValue::ServerTimestamp => json!({ "nullValue": null }),
            DocValue::Bool(b) => json!({ "booleanValue": b }),
            DocValue::Integer(v) => json!({ "integerValue": v.to_string() }),
            DocValue::Double(v) => json!({ "doubleValue": v }),
            DocValue::Text(s) => json!({ "stringValue": s }),
            DocValue::Timestamp(t) => {
                json!({ "timestampValue": t.to_rfc3339_opts(SecondsFormat::Micros, true) })
            }
        }
    }

    /// Decode a Firestore typed value. Unknown envelopes decode as `Null`
    /// (the pipeline only reads the types it writes).
    #[must_use]
    pub fn from_wire(value: &Value) -> Self {
        if let Some(s) = value.get("stringValue").and_then(Value::as_str) {
            return DocValue::Text(s.to_string());
        }
        if let Some(v) = value.get("doubleValue").and_then(Value::as_f64) {
            return DocValue::Double(v);
        }
        if let Some(raw) = value.get("integerValue") {
            // Sent as a JSON string; tolerate a bare number too.
            let parsed = raw
                .as_str()
                .and_then(|s| s.parse::<i64>().ok())
                .or_else(|| raw.as_i64());
            if let Some(v) = parsed {
                return DocValue::Integer(v);
            }
        }
        if let Some(b) = value.get("booleanValue").and_then(Value::as_bool) {
            return DocValue::Bool(b);
        }
        if let Some(t) = value
            .get("timestampValue")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        {
            return DocValue::Timestamp(t.with_timezone(&Utc));
        }
        DocValue::Null
    }
}

/// Field map of one document, ordered for stable wire payloads.
pub type DocFields = BTreeMap<String, DocValue>;

/// Split a field map into plain fields and the field paths that carry the
/// server-timestamp sentinel.
#[must_use]
pub fn split_transforms(fields: &DocFields) -> (DocFields, Vec<String>) {
    let mut plain = DocFields::new();
    let mut transforms = Vec::new();
    for (name, value) in fields {
        if *value == DocValue::ServerTimestamp {
            transforms.push(name.clone());
        } else {
            plain.insert(name.clone(), value.clone());
        }
    }
    (plain, transforms)
}

/// Convert a normalized record into its document field map (camelCase
/// field names, the shape the mobile app reads).
#[must_use]
pub fn record_to_fields(record: &ProductRecord) -> DocFields {
    let json = serde_json::to_value(record).unwrap_or(Value::Null);
    let mut fields = DocFields::new();
    if let Value::Object(map) = json {
        for (name, value) in map {
            fields.insert(name, json_to_doc_value(&value));
        }
    }
    fields
}

fn json_to_doc_value(value: &Value) -> DocValue {
    match value {
        Value::String(s) => DocValue::Text(s.clone()),
        Value::Number(n) => n.as_f64().map_or(DocValue::Null, DocValue::Double),
        Value::Bool(b) => DocValue::Bool(*b),
        _ => DocValue::Null,
    }
}
