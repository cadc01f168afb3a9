use serde::{Deserialize, Serialize};

use crate::backend::types::SearchHit;

/// Default page size when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Pseudo index name meaning "search every collection".
pub const ALL_COLLECTIONS: &str = "_all";

/// Query parameters for the search endpoint.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub index: Option<String>,
    pub from: Option<usize>,
    pub size: Option<usize>,
}

/// Response envelope for the search endpoint.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<SearchHit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub took: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SearchResponse {
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            results: None,
            total: None,
            took: None,
            query: None,
            from: None,
            size: None,
            error: Some(error.into()),
        }
    }
}
