//! Ingestion Data Types
//!
//! Defines the input, intermediate, and outcome structures of the upload
//! pipeline, plus its error taxonomy. Document metadata lives in named
//! struct fields rather than a dynamic map so there is never ambiguity
//! about which fields are synthesized and which came from the file.

use axum::body::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::backend::types::BulkItemError;

/// One uploaded tabular file, exactly as received.
#[derive(Debug, Clone)]
pub struct TabularInput {
    pub content: Bytes,
    /// Declared media type of the upload part, if any.
    pub media_type: Option<String>,
    pub file_name: String,
}

/// One data row that survived parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRow {
    /// 1-based position in the blank-line-filtered file (the header is
    /// line 0). Gaps from dropped rows are preserved, which keeps document
    /// identifiers stable across re-uploads of edited files.
    pub line_no: usize,
    pub values: Vec<String>,
}

/// The parsed header and all rows whose arity matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

/// One document submitted to the backend: the row's columns plus
/// synthesized metadata.
#[derive(Debug, Clone, Serialize)]
pub struct IngestDocument {
    pub id: String,
    pub indexed_at: DateTime<Utc>,
    pub file_name: String,
    pub file_size: u64,
    pub description: String,
    /// User columns from the CSV row, flattened alongside the metadata.
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

/// Per-row accounting for one completed ingestion.
///
/// `accepted_rows + rejected_rows == total_rows` always; rows dropped
/// during parsing never reach the backend and are not counted at all.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub total_rows: usize,
    pub accepted_rows: usize,
    pub rejected_rows: usize,
    pub headers: Vec<String>,
    /// Backend rejection detail, kept for diagnostics.
    pub item_errors: Vec<BulkItemError>,
}

/// Terminal failures of the ingestion pipeline. None are retried; row-level
/// backend rejections are data in [`IngestOutcome`], not errors here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("only CSV uploads are supported")]
    UnsupportedFormat,

    #[error("file exceeds the upload limit of {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("CSV file must contain at least a header row and one data row")]
    EmptyOrHeaderOnly,

    #[error("CSV file must have valid column headers")]
    InvalidHeader,

    #[error(
        "index name must start with a lowercase letter or digit and contain \
         only lowercase letters, digits, hyphens, and underscores"
    )]
    InvalidCollectionName,

    #[error("no valid records found in CSV file")]
    NoValidRows,

    #[error("unable to connect to the search backend: {0}")]
    BackendUnavailable(String),

    #[error("failed to provision index: {0}")]
    ProvisioningFailed(String),

    #[error("bulk indexing request failed: {0}")]
    BulkSubmissionFailed(String),
}
