use serde::{Deserialize, Serialize};

use crate::backend::types::CollectionInfo;

/// Response for the index listing endpoint.
#[derive(Debug, Serialize)]
pub struct ListIndicesResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub indices: Option<Vec<CollectionInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Query parameters for index deletion.
#[derive(Debug, Deserialize)]
pub struct DeleteIndexParams {
    pub index: Option<String>,
}

/// Response for the index deletion endpoint.
#[derive(Debug, Serialize)]
pub struct DeleteIndexResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
