//! HTTP request handlers for the upload benchmark
//!
//! The five upload handlers differ only in how they
//! consume the body. Each one times only its own body and leaves the
//! framework's extraction work to the middleware's total.

use axum::{
    body::Body,
    extract::{Extension, State},
    response::Json,
};
use futures::StreamExt;
use serde::Serialize;
use std::{io::Read, sync::Arc, time::Instant};
use tracing::debug;

use super::extractors::{ApiError, BufferedFile, SpooledUpload};
use super::timing::RequestStart;
use crate::app_state::AppState;
use upload_bench_core::{Endpoint, ServerResponse};

/// Handler result type
pub type UploadResult = Result<Json<ServerResponse>, ApiError>;

/// System health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Current system status
    pub status: String,
    /// Server uptime
    pub uptime: String,
    /// Server version
    pub version: String,
}

/// Service description returned from `/`
#[derive(Debug, Serialize)]
pub struct InfoResponse {
    /// Service name
    pub name: String,
    /// Service version
    pub version: String,
    /// Upload routes
    pub endpoints: Vec<String>,
}

fn respond(
    endpoint: Endpoint,
    app_state: &AppState,
    start: RequestStart,
    file_size: u64,
    handler_start: Instant,
) -> Json<ServerResponse> {
    let handler_duration = handler_start.elapsed().as_secs_f64();
    let end_memory = app_state.memory.rss_mb();

    debug!(%endpoint, file_size, handler_duration, "upload consumed");
    Json(ServerResponse::new(endpoint, file_size, handler_duration, start.memory_mb, end_memory))
}

/// Buffered file, handler body on the blocking pool
pub async fn upload_sync_file(
    State(app_state): State<Arc<AppState>>,
    Extension(start): Extension<RequestStart>,
    BufferedFile(file): BufferedFile,
) -> UploadResult {
    let handler_start = Instant::now();

    // Already fully in memory; nothing left to chunk
    let file_size = tokio::task::spawn_blocking(move || file.len() as u64).await?;

    Ok(respond(Endpoint::SyncFile, &app_state, start, file_size, handler_start))
}

/// Buffered file, handler body on the async task
pub async fn upload_async_file(
    State(app_state): State<Arc<AppState>>,
    Extension(start): Extension<RequestStart>,
    BufferedFile(file): BufferedFile,
) -> UploadResult {
    let handler_start = Instant::now();

    let file_size = file.len() as u64;

    Ok(respond(Endpoint::AsyncFile, &app_state, start, file_size, handler_start))
}

/// Spooled upload read synchronously in chunks on the blocking pool
pub async fn upload_sync_uploadfile(
    State(app_state): State<Arc<AppState>>,
    Extension(start): Extension<RequestStart>,
    upload: SpooledUpload,
) -> UploadResult {
    let handler_start = Instant::now();

    let chunk_size = app_state.config.chunk_size;
    let mut file = upload.into_file()?;
    let file_size = tokio::task::spawn_blocking(move || -> std::io::Result<u64> {
        let mut buf = vec![0u8; chunk_size];
        let mut total = 0u64;
        loop {
            let read = file.read(&mut buf)?;
            if read == 0 {
                break;
            }
            total += read as u64;
        }
        Ok(total)
    })
    .await??;

    Ok(respond(Endpoint::SyncUploadfile, &app_state, start, file_size, handler_start))
}

/// Spooled upload read asynchronously in chunks
pub async fn upload_async_uploadfile(
    State(app_state): State<Arc<AppState>>,
    Extension(start): Extension<RequestStart>,
    mut upload: SpooledUpload,
) -> UploadResult {
    let handler_start = Instant::now();

    let chunk_size = app_state.config.chunk_size;
    let mut file_size = 0u64;
    loop {
        let chunk = upload.read(chunk_size).await?;
        if chunk.is_empty() {
            break;
        }
        file_size += chunk.len() as u64;
    }

    Ok(respond(Endpoint::AsyncUploadfile, &app_state, start, file_size, handler_start))
}

/// Raw body consumed as a stream, nothing buffered or written
pub async fn upload_async_stream(
    State(app_state): State<Arc<AppState>>,
    Extension(start): Extension<RequestStart>,
    body: Body,
) -> UploadResult {
    let handler_start = Instant::now();

    let mut stream = body.into_data_stream();
    let mut file_size = 0u64;
    while let Some(chunk) = stream.next().await {
        file_size += chunk?.len() as u64;
    }

    Ok(respond(Endpoint::AsyncStream, &app_state, start, file_size, handler_start))
}

/// Root endpoint describing the service
pub async fn root_handler() -> Json<InfoResponse> {
    Json(InfoResponse {
        name: "upload-bench-server".to_string(),
        version: upload_bench_core::VERSION.to_string(),
        endpoints: Endpoint::all().iter().map(Endpoint::path).collect(),
    })
}

/// Health check
pub async fn health_check(State(app_state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        uptime: format!("{}s", app_state.started_at.elapsed().as_secs()),
        version: upload_bench_core::VERSION.to_string(),
    })
}
