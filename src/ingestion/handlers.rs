use axum::body::Bytes;
use axum::extract::Multipart;
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Serialize;
use std::sync::Arc;

use super::pipeline::IngestionPipeline;
use super::types::{IngestError, IngestOutcome, TabularInput};

/// JSON envelope returned by the upload endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processed_records: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Vec<String>>,
}

impl UploadResponse {
    fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
            index_name: None,
            total_records: None,
            processed_records: None,
            error_count: None,
            headers: None,
        }
    }

    fn indexed(index_name: &str, outcome: IngestOutcome) -> Self {
        let mut message = format!(
            "Successfully indexed {} records to index \"{}\"",
            outcome.accepted_rows, index_name
        );
        if outcome.rejected_rows > 0 {
            message.push_str(&format!(
                ". {} records failed to index.",
                outcome.rejected_rows
            ));
        }

        Self {
            success: true,
            message: Some(message),
            error: None,
            index_name: Some(index_name.to_string()),
            total_records: Some(outcome.total_rows),
            processed_records: Some(outcome.accepted_rows),
            error_count: Some(outcome.rejected_rows),
            headers: Some(outcome.headers),
        }
    }
}

/// `POST /api/upload` — multipart form with `file`, `indexName`, and an
/// optional `indexDescription`.
pub async fn handle_upload(
    Extension(pipeline): Extension<Arc<IngestionPipeline>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<UploadResponse>) {
    let mut file: Option<(Bytes, Option<String>, String)> = None;
    let mut index_name: Option<String> = None;
    let mut description: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                tracing::warn!("failed to read multipart field: {}", err);
                return (
                    StatusCode::BAD_REQUEST,
                    Json(UploadResponse::failure(format!(
                        "Invalid multipart request: {}",
                        err
                    ))),
                );
            }
        };

        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let media_type = field.content_type().map(str::to_string);
                match field.bytes().await {
                    Ok(bytes) => file = Some((bytes, media_type, file_name)),
                    Err(err) => {
                        tracing::warn!("failed to read upload body: {}", err);
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(UploadResponse::failure(format!(
                                "Failed to read uploaded file: {}",
                                err
                            ))),
                        );
                    }
                }
            }
            Some("indexName") => {
                index_name = field.text().await.ok();
            }
            Some("indexDescription") => {
                description = field.text().await.ok();
            }
            _ => {}
        }
    }

    let ((content, media_type, file_name), index_name) = match (file, index_name) {
        (Some(file), Some(name)) if !name.trim().is_empty() => (file, name),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                Json(UploadResponse::failure("File and index name are required")),
            );
        }
    };

    let input = TabularInput {
        content,
        media_type,
        file_name,
    };

    match pipeline
        .ingest(input, &index_name, description.as_deref())
        .await
    {
        Ok(outcome) => {
            tracing::info!(
                "indexed {}/{} records into {}",
                outcome.accepted_rows,
                outcome.total_rows,
                index_name
            );
            (
                StatusCode::OK,
                Json(UploadResponse::indexed(&index_name, outcome)),
            )
        }
        Err(err) => {
            tracing::error!("ingestion into {} failed: {}", index_name, err);
            (status_for(&err), Json(UploadResponse::failure(err.to_string())))
        }
    }
}

/// Maps each pipeline error to a transport status code.
fn status_for(err: &IngestError) -> StatusCode {
    match err {
        IngestError::UnsupportedFormat
        | IngestError::EmptyOrHeaderOnly
        | IngestError::InvalidHeader
        | IngestError::InvalidCollectionName
        | IngestError::NoValidRows => StatusCode::BAD_REQUEST,
        IngestError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        IngestError::BackendUnavailable(_) => StatusCode::BAD_GATEWAY,
        IngestError::ProvisioningFailed(_) | IngestError::BulkSubmissionFailed(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
