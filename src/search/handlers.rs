use axum::extract::Query;
use axum::http::StatusCode;
use axum::{Extension, Json};
use std::sync::Arc;

use super::types::{SearchParams, SearchResponse, ALL_COLLECTIONS, DEFAULT_PAGE_SIZE};
use crate::backend::types::SearchRequest;
use crate::backend::{BackendError, SearchBackend};

/// `GET /api/search?q=&index=&from=&size=` — fuzzy full-text query with
/// highlighting, across one index or all of them.
pub async fn handle_search(
    Query(params): Query<SearchParams>,
    Extension(backend): Extension<Arc<dyn SearchBackend>>,
) -> (StatusCode, Json<SearchResponse>) {
    if params.q.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(SearchResponse::failure("Search query is required")),
        );
    }

    if let Err(err) = backend.ping().await {
        tracing::error!("backend unreachable while searching: {}", err);
        return (
            StatusCode::BAD_GATEWAY,
            Json(SearchResponse::failure(
                "Unable to connect to the search backend",
            )),
        );
    }

    let collection = params
        .index
        .as_deref()
        .filter(|index| *index != ALL_COLLECTIONS && !index.trim().is_empty())
        .map(str::to_string);
    let request = SearchRequest {
        query: params.q.clone(),
        collection,
        from: params.from.unwrap_or(0),
        size: params.size.unwrap_or(DEFAULT_PAGE_SIZE),
    };

    match backend.search(&request).await {
        Ok(results) => (
            StatusCode::OK,
            Json(SearchResponse {
                success: true,
                results: Some(results.hits),
                total: Some(results.total),
                took: Some(results.took_ms),
                query: Some(params.q),
                from: Some(request.from),
                size: Some(request.size),
                error: None,
            }),
        ),
        Err(BackendError::NotFound(name)) => (
            StatusCode::NOT_FOUND,
            Json(SearchResponse::failure(format!(
                "Index \"{}\" does not exist",
                name
            ))),
        ),
        Err(err) => {
            tracing::error!("search failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(SearchResponse::failure("Search failed")),
            )
        }
    }
}
