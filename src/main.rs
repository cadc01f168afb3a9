use axum::extract::DefaultBodyLimit;
use axum::http::StatusCode;
use axum::{
    Extension, Json, Router,
    routing::get,
    routing::post,
};
use csv_search::backend::elastic::ElasticBackend;
use csv_search::backend::SearchBackend;
use csv_search::catalog::handlers::{handle_delete_index, handle_list_indices};
use csv_search::config::Config;
use csv_search::ingestion::handlers::handle_upload;
use csv_search::ingestion::pipeline::IngestionPipeline;
use csv_search::search::handlers::handle_search;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Slack on top of the configured upload limit for multipart framing, so
/// the size check in the pipeline is the one that fires.
const BODY_LIMIT_SLACK: usize = 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut bind_addr: SocketAddr = "127.0.0.1:3000".parse()?;
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bind" => {
                bind_addr = args[i + 1].parse()?;
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    let config = Arc::new(Config::from_env());
    tracing::info!("Search backend: {}", config.backend_url);

    let backend: Arc<dyn SearchBackend> = Arc::new(ElasticBackend::new(&config)?);
    let pipeline = Arc::new(IngestionPipeline::new(backend.clone(), config.clone()));

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/api/upload", post(handle_upload))
        .route(
            "/api/indices",
            get(handle_list_indices).delete(handle_delete_index),
        )
        .route("/api/search", get(handle_search))
        .layer(Extension(backend))
        .layer(Extension(pipeline))
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes + BODY_LIMIT_SLACK,
        ));

    tracing::info!("HTTP server listening on {}", bind_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

async fn handle_health(
    Extension(backend): Extension<Arc<dyn SearchBackend>>,
) -> (StatusCode, Json<HealthResponse>) {
    let backend_status = match backend.ping().await {
        Ok(()) => "up",
        Err(err) => {
            tracing::warn!("health check: backend unreachable: {}", err);
            "down"
        }
    };

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            backend: backend_status,
        }),
    )
}
