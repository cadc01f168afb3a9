//! Backend Data Types
//!
//! Field schemas sent to the backend on collection creation, plus the
//! summaries and search results handed back to the handler layer.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Field type declarations understood by the backend mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Free text, analyzed with the collection's tokenizer.
    Text,
    /// Free text plus an exact-match `keyword` sub-field, capped at
    /// `ignore_above` characters for the exact-match form.
    TextWithKeyword { ignore_above: u32 },
    /// Exact-match only.
    Keyword,
    /// ISO-8601 timestamp.
    Date,
    /// 64-bit integer.
    Long,
}

impl FieldType {
    /// Renders the mapping fragment for this field.
    pub fn to_mapping(&self) -> Value {
        match self {
            FieldType::Text => json!({ "type": "text" }),
            FieldType::TextWithKeyword { ignore_above } => json!({
                "type": "text",
                "fields": {
                    "keyword": {
                        "type": "keyword",
                        "ignore_above": ignore_above,
                    }
                }
            }),
            FieldType::Keyword => json!({ "type": "keyword" }),
            FieldType::Date => json!({ "type": "date" }),
            FieldType::Long => json!({ "type": "long" }),
        }
    }
}

/// An ordered field-name to field-type mapping for a new collection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionSchema {
    pub fields: BTreeMap<String, FieldType>,
}

impl CollectionSchema {
    /// Renders the full `mappings` body for collection creation.
    pub fn to_mappings(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.to_mapping()))
            .collect();
        json!({ "properties": properties })
    }
}

/// Per-document rejection detail from a bulk write.
#[derive(Debug, Clone, Serialize)]
pub struct BulkItemError {
    pub id: String,
    pub status: u16,
    pub reason: String,
}

/// Outcome of one bulk write: how many documents the backend accepted,
/// how many it rejected, and why.
#[derive(Debug, Clone, Default)]
pub struct BulkSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub item_errors: Vec<BulkItemError>,
}

/// One row of the collection listing, as reported by the backend's
/// `_cat/indices` endpoint. Counts and sizes arrive as strings and may be
/// absent for an unhealthy index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionInfo {
    #[serde(rename = "index")]
    pub name: String,
    #[serde(rename = "docs.count")]
    pub doc_count: Option<String>,
    #[serde(rename = "store.size")]
    pub storage_size: Option<String>,
    #[serde(rename = "creation.date.string")]
    pub created_at: Option<String>,
}

/// A full-text query against one collection or all of them.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    /// `None` searches across every collection.
    pub collection: Option<String>,
    pub from: usize,
    pub size: usize,
}

/// One matching document.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub id: String,
    pub index: String,
    pub score: Option<f64>,
    pub source: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub highlight: Option<Value>,
}

/// A page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub hits: Vec<SearchHit>,
    pub total: u64,
    pub took_ms: u64,
}
