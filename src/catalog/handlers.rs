use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

use super::types::{DeleteIndexParams, DeleteIndexResponse, ListIndicesResponse};
use crate::backend::{BackendError, SearchBackend};

/// `GET /api/indices` — lists user indices. System indices (reserved
/// prefix) are filtered out by the backend client.
pub async fn handle_list_indices(
    Extension(backend): Extension<Arc<dyn SearchBackend>>,
) -> (StatusCode, Json<ListIndicesResponse>) {
    if let Err(err) = backend.ping().await {
        tracing::error!("backend unreachable while listing indices: {}", err);
        return (
            StatusCode::BAD_GATEWAY,
            Json(ListIndicesResponse {
                success: false,
                indices: None,
                error: Some("Unable to connect to the search backend".to_string()),
            }),
        );
    }

    match backend.list_collections().await {
        Ok(indices) => (
            StatusCode::OK,
            Json(ListIndicesResponse {
                success: true,
                indices: Some(indices),
                error: None,
            }),
        ),
        Err(err) => {
            tracing::error!("failed to list indices: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ListIndicesResponse {
                    success: false,
                    indices: None,
                    error: Some("Failed to fetch indices".to_string()),
                }),
            )
        }
    }
}

/// `DELETE /api/indices?index=name` — deletes one index.
pub async fn handle_delete_index(
    Query(params): Query<DeleteIndexParams>,
    Extension(backend): Extension<Arc<dyn SearchBackend>>,
) -> (StatusCode, Json<DeleteIndexResponse>) {
    let index_name = match params.index {
        Some(name) if !name.trim().is_empty() => name,
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(DeleteIndexResponse {
                    success: false,
                    message: None,
                    error: Some("Index name is required".to_string()),
                }),
            );
        }
    };

    match backend.delete_collection(&index_name).await {
        Ok(()) => {
            tracing::info!("deleted index {}", index_name);
            (
                StatusCode::OK,
                Json(DeleteIndexResponse {
                    success: true,
                    message: Some(format!("Index \"{}\" deleted successfully", index_name)),
                    error: None,
                }),
            )
        }
        Err(BackendError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(DeleteIndexResponse {
                success: false,
                message: None,
                error: Some("Index does not exist".to_string()),
            }),
        ),
        Err(err) => {
            tracing::error!("failed to delete index {}: {}", index_name, err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DeleteIndexResponse {
                    success: false,
                    message: None,
                    error: Some("Failed to delete index".to_string()),
                }),
            )
        }
    }
}
