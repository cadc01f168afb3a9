//! Search Backend Module
//!
//! Boundary toward the external search engine. The service implements no
//! indexing, ranking, or storage of its own; everything durable happens on
//! the other side of the [`SearchBackend`] trait.
//!
//! ## Submodules
//! - **`elastic`**: The Elasticsearch HTTP implementation over `reqwest`.
//! - **`types`**: Schemas, bulk summaries, and search result shapes shared
//!   with the handler layer.

pub mod elastic;
pub mod types;


use async_trait::async_trait;
use thiserror::Error;

use self::types::{BulkSummary, CollectionInfo, CollectionSchema, SearchRequest, SearchResults};
use crate::ingestion::types::IngestDocument;

/// Errors surfaced by a search backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend could not be reached at all (connect failure, timeout).
    #[error("search backend unreachable: {0}")]
    Unreachable(String),

    /// The named collection does not exist.
    #[error("collection not found: {0}")]
    NotFound(String),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {reason}")]
    Api { status: u16, reason: String },

    /// Request could not be sent or the response body could not be read.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A request or response body failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Abstracts the search engine behind the service.
///
/// The ingestion pipeline and the HTTP handlers only ever talk to this
/// trait, which keeps them testable against an in-memory mock and leaves
/// the wire protocol contained in one implementation.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Liveness probe. Called before any write so a dead backend is
    /// reported without side effects.
    async fn ping(&self) -> Result<(), BackendError>;

    /// Whether a collection with this name already exists.
    async fn collection_exists(&self, name: &str) -> Result<bool, BackendError>;

    /// Creates a collection with the given field schema.
    ///
    /// Two concurrent uploads may race on the existence check, so an
    /// "already exists" answer from the backend counts as success.
    async fn create_collection(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<(), BackendError>;

    /// Writes all documents in one bulk request with synchronous refresh.
    ///
    /// Individual documents may be rejected without failing the call; the
    /// summary tallies them. An `Err` means the bulk request itself could
    /// not be made.
    async fn bulk_write(
        &self,
        name: &str,
        documents: &[IngestDocument],
    ) -> Result<BulkSummary, BackendError>;

    /// Deletes a collection. `NotFound` if it does not exist.
    async fn delete_collection(&self, name: &str) -> Result<(), BackendError>;

    /// Lists user collections, excluding reserved (system) names.
    async fn list_collections(&self) -> Result<Vec<CollectionInfo>, BackendError>;

    /// Runs a fuzzy multi-field query with highlighting and pagination.
    async fn search(&self, request: &SearchRequest) -> Result<SearchResults, BackendError>;
}
