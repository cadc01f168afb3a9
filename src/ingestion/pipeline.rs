//! Ingestion Pipeline
//!
//! Turns one tabular upload into documents durably stored in the search
//! backend, tolerating partial failure at the row level.
//!
//! ## Stages
//! 1. **Validation**: format, size, line count, header, index name. Each
//!    check fails fast with its own error.
//! 2. **Row parsing**: arity-mismatched rows are dropped, not errors.
//! 3. **Liveness probe**: a dead backend short-circuits before any write.
//! 4. **Provisioning**: the index is created with an inferred schema only
//!    if it does not already exist. Existing mappings are never altered.
//! 5. **Bulk write**: one request with synchronous refresh; per-document
//!    rejections are tallied into the outcome, never retried.
//!
//! Each invocation is independent; the pipeline holds no state beyond its
//! handle to the backend.

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::csv;
use super::types::{IngestDocument, IngestError, IngestOutcome, ParsedTable, TabularInput};
use crate::backend::types::{CollectionSchema, FieldType};
use crate::backend::SearchBackend;
use crate::config::Config;

/// Exact-match sub-field cap for inferred text columns.
const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// Metadata fields synthesized onto every document. A CSV column with one
/// of these names is shadowed by the metadata rather than colliding with it.
const RESERVED_FIELDS: [&str; 5] = ["id", "indexed_at", "file_name", "file_size", "description"];

pub struct IngestionPipeline {
    backend: Arc<dyn SearchBackend>,
    config: Arc<Config>,
}

impl IngestionPipeline {
    pub fn new(backend: Arc<dyn SearchBackend>, config: Arc<Config>) -> Self {
        Self { backend, config }
    }

    /// Ingests one uploaded file into the named index.
    pub async fn ingest(
        &self,
        input: TabularInput,
        collection: &str,
        description: Option<&str>,
    ) -> Result<IngestOutcome, IngestError> {
        let table = self.validate_and_parse(&input, collection)?;

        self.backend
            .ping()
            .await
            .map_err(|err| IngestError::BackendUnavailable(err.to_string()))?;

        self.provision(collection, &table.headers).await?;

        let documents = build_documents(&table, collection, &input, description);

        let summary = self
            .backend
            .bulk_write(collection, &documents)
            .await
            .map_err(|err| IngestError::BulkSubmissionFailed(err.to_string()))?;

        if summary.rejected > 0 {
            tracing::warn!(
                "bulk write to {}: {} of {} documents rejected",
                collection,
                summary.rejected,
                documents.len()
            );
        }

        // Accepted is derived from the submitted total, so the tally always
        // sums to it even if the backend reports items oddly.
        Ok(IngestOutcome {
            total_rows: documents.len(),
            accepted_rows: documents.len() - summary.rejected,
            rejected_rows: summary.rejected,
            headers: table.headers,
            item_errors: summary.item_errors,
        })
    }

    /// Runs the fail-fast validation sequence and parses the table.
    fn validate_and_parse(
        &self,
        input: &TabularInput,
        collection: &str,
    ) -> Result<ParsedTable, IngestError> {
        let declares_csv = input
            .media_type
            .as_deref()
            .map(|media| media.contains("csv"))
            .unwrap_or(false);
        if !declares_csv && !input.file_name.ends_with(".csv") {
            return Err(IngestError::UnsupportedFormat);
        }

        if input.content.len() > self.config.max_upload_bytes {
            return Err(IngestError::PayloadTooLarge {
                limit_bytes: self.config.max_upload_bytes,
            });
        }

        let text = String::from_utf8_lossy(&input.content);
        let lines = csv::non_blank_lines(&text);
        if lines.len() < 2 {
            return Err(IngestError::EmptyOrHeaderOnly);
        }

        let headers = csv::parse_header(lines[0])?;

        validate_collection_name(collection)?;

        let rows = csv::parse_rows(&lines, headers.len());
        if rows.is_empty() {
            return Err(IngestError::NoValidRows);
        }

        Ok(ParsedTable { headers, rows })
    }

    /// Ensures the destination index exists. The schema is inferred from
    /// the headers and applied only on creation; a pre-existing index is
    /// left untouched, and columns it has never seen fall back to the
    /// backend's dynamic-field behavior.
    async fn provision(&self, collection: &str, headers: &[String]) -> Result<(), IngestError> {
        let exists = self
            .backend
            .collection_exists(collection)
            .await
            .map_err(|err| IngestError::ProvisioningFailed(err.to_string()))?;

        if exists {
            if !self.config.allow_existing_collection {
                return Err(IngestError::ProvisioningFailed(format!(
                    "index \"{}\" already exists and uploads into existing indices are disabled",
                    collection
                )));
            }
            tracing::debug!("index {} already exists, keeping its mapping", collection);
            return Ok(());
        }

        let schema = infer_schema(headers);
        self.backend
            .create_collection(collection, &schema)
            .await
            .map_err(|err| IngestError::ProvisioningFailed(err.to_string()))
    }
}

/// Validates the destination index name: a lowercase letter or digit,
/// followed by lowercase letters, digits, hyphens, or underscores.
pub fn validate_collection_name(name: &str) -> Result<(), IngestError> {
    let pattern = Regex::new(r"^[a-z0-9][a-z0-9_-]*$").unwrap();
    if pattern.is_match(name) {
        Ok(())
    } else {
        Err(IngestError::InvalidCollectionName)
    }
}

/// Builds the schema for a new index: every CSV column becomes free text
/// with an exact-match sub-field, merged with the fixed metadata fields.
pub fn infer_schema(headers: &[String]) -> CollectionSchema {
    let mut fields: BTreeMap<String, FieldType> = headers
        .iter()
        .map(|header| {
            (
                header.clone(),
                FieldType::TextWithKeyword {
                    ignore_above: KEYWORD_IGNORE_ABOVE,
                },
            )
        })
        .collect();

    fields.insert("id".to_string(), FieldType::Keyword);
    fields.insert("indexed_at".to_string(), FieldType::Date);
    fields.insert("file_name".to_string(), FieldType::Keyword);
    fields.insert("file_size".to_string(), FieldType::Long);
    fields.insert("description".to_string(), FieldType::Text);

    CollectionSchema { fields }
}

/// Constructs one document per surviving row. The identifier is derived
/// from the index name and the row's original line number, so re-uploading
/// the same file overwrites documents instead of duplicating them.
fn build_documents(
    table: &ParsedTable,
    collection: &str,
    input: &TabularInput,
    description: Option<&str>,
) -> Vec<IngestDocument> {
    let indexed_at = chrono::Utc::now();

    table
        .rows
        .iter()
        .map(|row| IngestDocument {
            id: format!("{}_{}", collection, row.line_no),
            indexed_at,
            file_name: input.file_name.clone(),
            file_size: input.content.len() as u64,
            description: description.unwrap_or("").to_string(),
            fields: table
                .headers
                .iter()
                .zip(row.values.iter())
                .filter(|(header, _)| !RESERVED_FIELDS.contains(&header.as_str()))
                .map(|(header, value)| (header.clone(), value.clone()))
                .collect(),
        })
        .collect()
}
