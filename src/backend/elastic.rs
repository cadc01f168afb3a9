//! Elasticsearch Backend
//!
//! Implements [`SearchBackend`] over the Elasticsearch REST API using a
//! plain `reqwest` client. Every call carries the configured timeout;
//! expiry surfaces as a transport-level failure rather than a hung request.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::types::{
    BulkItemError, BulkSummary, CollectionInfo, CollectionSchema, SearchHit, SearchRequest,
    SearchResults,
};
use super::{BackendError, SearchBackend};
use crate::config::Config;
use crate::ingestion::types::IngestDocument;

/// HTTP client for one Elasticsearch cluster.
pub struct ElasticBackend {
    base_url: String,
    client: reqwest::Client,
    reserved_prefix: String,
    highlight_pre: String,
    highlight_post: String,
}

impl ElasticBackend {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(config.backend_timeout)
            .build()?;

        Ok(Self {
            base_url: config.backend_url.clone(),
            client,
            reserved_prefix: config.reserved_index_prefix.clone(),
            highlight_pre: config.highlight_pre_tag.clone(),
            highlight_post: config.highlight_post_tag.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl SearchBackend for ElasticBackend {
    async fn ping(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(self.url("/"))
            .send()
            .await
            .map_err(|e| BackendError::Unreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BackendError::Unreachable(format!(
                "ping returned status {}",
                response.status()
            )))
        }
    }

    async fn collection_exists(&self, name: &str) -> Result<bool, BackendError> {
        let response = self
            .client
            .head(self.url(&format!("/{}", name)))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(true),
            reqwest::StatusCode::NOT_FOUND => Ok(false),
            status => Err(BackendError::Api {
                status: status.as_u16(),
                reason: "unexpected status on existence check".to_string(),
            }),
        }
    }

    async fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), BackendError> {
        let body = json!({
            "settings": {
                "number_of_shards": 1,
                "number_of_replicas": 0,
                "analysis": {
                    "analyzer": {
                        "default": { "type": "standard" }
                    }
                }
            },
            "mappings": schema.to_mappings(),
        });

        let response = self
            .client
            .put(self.url(&format!("/{}", name)))
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            return Ok(());
        }

        let status = response.status().as_u16();
        let detail: Value = response.json().await.unwrap_or(Value::Null);

        // Two concurrent uploads can both decide to create the index;
        // the loser of that race must still report success.
        let kind = detail
            .pointer("/error/type")
            .and_then(Value::as_str)
            .unwrap_or("");
        if kind == "resource_already_exists_exception" {
            tracing::debug!("index {} created concurrently, treating as success", name);
            return Ok(());
        }

        Err(BackendError::Api {
            status,
            reason: detail
                .pointer("/error/reason")
                .and_then(Value::as_str)
                .unwrap_or("index creation failed")
                .to_string(),
        })
    }

    async fn bulk_write(
        &self,
        name: &str,
        documents: &[IngestDocument],
    ) -> Result<BulkSummary, BackendError> {
        let body = bulk_body(name, documents)?;

        let response = self
            .client
            .post(self.url("/_bulk"))
            .query(&[("refresh", "true")])
            .header("content-type", "application/x-ndjson")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let reason = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, reason });
        }

        let raw: RawBulkResponse = response.json().await?;
        Ok(summarize_bulk(documents.len(), raw))
    }

    async fn delete_collection(&self, name: &str) -> Result<(), BackendError> {
        let response = self
            .client
            .delete(self.url(&format!("/{}", name)))
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            reqwest::StatusCode::NOT_FOUND => Err(BackendError::NotFound(name.to_string())),
            status => Err(BackendError::Api {
                status: status.as_u16(),
                reason: response.text().await.unwrap_or_default(),
            }),
        }
    }

    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, BackendError> {
        let response = self
            .client
            .get(self.url("/_cat/indices"))
            .query(&[
                ("format", "json"),
                ("h", "index,docs.count,store.size,creation.date.string"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let reason = response.text().await.unwrap_or_default();
            return Err(BackendError::Api { status, reason });
        }

        let rows: Vec<CollectionInfo> = response.json().await?;
        Ok(rows
            .into_iter()
            .filter(|row| !row.name.starts_with(&self.reserved_prefix))
            .collect())
    }

    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, BackendError> {
        let path = match &request.collection {
            Some(name) => format!("/{}/_search", name),
            None => "/_search".to_string(),
        };
        let body = search_body(request, &self.highlight_pre, &self.highlight_post);

        let response = self
            .client
            .post(self.url(&path))
            .json(&body)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            reqwest::StatusCode::NOT_FOUND => {
                let name = request.collection.clone().unwrap_or_default();
                return Err(BackendError::NotFound(name));
            }
            status => {
                return Err(BackendError::Api {
                    status: status.as_u16(),
                    reason: response.text().await.unwrap_or_default(),
                });
            }
        }

        let raw: RawSearchResponse = response.json().await?;
        Ok(SearchResults {
            total: raw.hits.total.value,
            took_ms: raw.took,
            hits: raw
                .hits
                .hits
                .into_iter()
                .map(|hit| SearchHit {
                    id: hit.id,
                    index: hit.index,
                    score: hit.score,
                    source: hit.source,
                    highlight: hit.highlight,
                })
                .collect(),
        })
    }
}

/// Builds the NDJSON body for a bulk write: one action line and one source
/// line per document, each newline-terminated.
pub(crate) fn bulk_body(
    name: &str,
    documents: &[IngestDocument],
) -> Result<String, serde_json::Error> {
    let mut body = String::new();
    for document in documents {
        let action = json!({ "index": { "_index": name, "_id": document.id } });
        body.push_str(&serde_json::to_string(&action)?);
        body.push('\n');
        body.push_str(&serde_json::to_string(document)?);
        body.push('\n');
    }
    Ok(body)
}

/// Builds the query body: fuzzy best-fields match across all fields, with
/// highlighting on every field.
pub(crate) fn search_body(request: &SearchRequest, pre_tag: &str, post_tag: &str) -> Value {
    json!({
        "query": {
            "multi_match": {
                "query": request.query,
                "type": "best_fields",
                "fields": ["*"],
                "fuzziness": "AUTO",
            }
        },
        "highlight": {
            "fields": { "*": {} },
            "pre_tags": [pre_tag],
            "post_tags": [post_tag],
        },
        "from": request.from,
        "size": request.size,
    })
}

/// Tallies a bulk response into accepted/rejected counts. The accepted
/// count is derived from the submitted total so the two always sum to it.
pub(crate) fn summarize_bulk(total: usize, raw: RawBulkResponse) -> BulkSummary {
    let item_errors: Vec<BulkItemError> = raw
        .items
        .into_iter()
        .filter_map(|item| item.index)
        .filter_map(|result| {
            result.error.map(|error| BulkItemError {
                id: result.id,
                status: result.status,
                reason: error.reason.unwrap_or_else(|| "unknown".to_string()),
            })
        })
        .collect();

    let rejected = item_errors.len().min(total);
    BulkSummary {
        accepted: total - rejected,
        rejected,
        item_errors,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBulkResponse {
    #[serde(default)]
    pub items: Vec<RawBulkItem>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBulkItem {
    pub index: Option<RawBulkItemResult>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBulkItemResult {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub status: u16,
    pub error: Option<RawBulkError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawBulkError {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSearchResponse {
    took: u64,
    hits: RawHits,
}

#[derive(Debug, Deserialize)]
struct RawHits {
    total: RawTotal,
    hits: Vec<RawHit>,
}

#[derive(Debug, Deserialize)]
struct RawTotal {
    value: u64,
}

#[derive(Debug, Deserialize)]
struct RawHit {
    #[serde(rename = "_id")]
    id: String,
    #[serde(rename = "_index")]
    index: String,
    #[serde(rename = "_score")]
    score: Option<f64>,
    #[serde(rename = "_source")]
    source: Value,
    highlight: Option<Value>,
}
