//! Upload extractors and their rejections
//!
//! Both extractors do the framework-side work before a handler runs:
//! [`BufferedFile`] reads the whole `file` field into memory, while
//! [`SpooledUpload`] copies it into a spooled temporary file that stays in
//! memory up to a threshold and rolls over to disk beyond it.

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        FromRequest, Multipart, Request,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::Value;
use std::{
    io::{self, Read, Seek, SeekFrom, Write},
    sync::Arc,
};
use tempfile::SpooledTempFile;
use tracing::{debug, warn};

use crate::app_state::AppState;
use upload_bench_core::constants::FILE_FIELD;

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Whether the operation was successful (always false)
    pub success: bool,
    /// Error message
    pub error: String,
    /// Optional details about what was invalid
    pub details: Option<Value>,
}

impl ErrorResponse {
    /// Create an error response
    pub fn new(error: String) -> Self {
        Self {
            success: false,
            error,
            details: None,
        }
    }

    /// Create an error response with details
    pub fn with_details(error: String, details: Value) -> Self {
        Self {
            success: false,
            error,
            details: Some(details),
        }
    }
}

/// Handler and extractor failure, rendered as JSON
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorResponse,
}

impl ApiError {
    /// Build an error with an explicit status
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse::new(error.into()),
        }
    }

    /// The multipart form carried no field with the expected name
    pub fn missing_field(name: &str) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            body: ErrorResponse::with_details(
                format!("Missing multipart field '{}'", name),
                serde_json::json!({ "field": name }),
            ),
        }
    }

    /// Server-side failure
    pub fn internal(error: impl std::fmt::Display) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }

    /// HTTP status of this error
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!("Request failed with {}: {}", self.status, self.body.error);
        } else {
            debug!("Request rejected with {}: {}", self.status, self.body.error);
        }
        (self.status, Json(self.body)).into_response()
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::new(rejection.status(), rejection.body_text())
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        Self::new(error.status(), error.body_text())
    }
}

impl From<axum::Error> for ApiError {
    fn from(error: axum::Error) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("Failed to read request body: {}", error))
    }
}

impl From<io::Error> for ApiError {
    fn from(error: io::Error) -> Self {
        Self::internal(format!("Spooled file I/O failed: {}", error))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(error: tokio::task::JoinError) -> Self {
        Self::internal(format!("Blocking task failed: {}", error))
    }
}

/// The whole `file` field, buffered in memory before the handler runs
#[derive(Debug)]
pub struct BufferedFile(pub Bytes);

impl<S> FromRequest<S> for BufferedFile
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;

        while let Some(field) = multipart.next_field().await? {
            if field.name() == Some(FILE_FIELD) {
                let bytes = field.bytes().await?;
                return Ok(BufferedFile(bytes));
            }
        }

        Err(ApiError::missing_field(FILE_FIELD))
    }
}

/// The `file` field copied into a spooled temporary file.
///
/// Reads and writes touch memory directly while the spool is small; once it
/// has rolled over to disk they run on the blocking pool.
pub struct SpooledUpload {
    file: Option<SpooledTempFile>,
    max_size: usize,
    filename: Option<String>,
    size: u64,
}

impl SpooledUpload {
    /// Empty spool that rolls over to disk after `max_size` bytes
    pub fn new(max_size: usize, filename: Option<String>) -> Self {
        Self {
            file: Some(tempfile::spooled_tempfile(max_size)),
            max_size,
            filename,
            size: 0,
        }
    }

    /// Client supplied file name, if any
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Bytes written so far
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Whether the spool has moved from memory to disk
    pub fn is_rolled(&self) -> bool {
        self.file.as_ref().is_some_and(SpooledTempFile::is_rolled)
    }

    /// Whether writing `len` more bytes touches disk, either because the
    /// spool has rolled over or because this write rolls it over
    pub fn write_hits_disk(&self, len: usize) -> bool {
        self.is_rolled() || self.size + len as u64 > self.max_size as u64
    }

    /// Append data to the spool; writes that touch disk run on the blocking pool
    pub async fn write(&mut self, data: Bytes) -> io::Result<()> {
        let len = data.len() as u64;
        if self.write_hits_disk(data.len()) {
            self.run_blocking(move |file| file.write_all(&data)).await?;
        } else {
            self.file_mut()?.write_all(&data)?;
        }
        self.size += len;
        Ok(())
    }

    /// Move the cursor back to the start
    pub async fn rewind(&mut self) -> io::Result<()> {
        if self.is_rolled() {
            self.run_blocking(|file| file.seek(SeekFrom::Start(0)).map(|_| ())).await
        } else {
            self.file_mut()?.seek(SeekFrom::Start(0)).map(|_| ())
        }
    }

    /// Read up to `size` bytes; an empty result means end of file
    pub async fn read(&mut self, size: usize) -> io::Result<Bytes> {
        if self.is_rolled() {
            self.run_blocking(move |file| read_up_to(file, size)).await
        } else {
            read_up_to(self.file_mut()?, size)
        }
    }

    /// Hand the underlying file to synchronous code
    pub fn into_file(mut self) -> io::Result<SpooledTempFile> {
        self.file.take().ok_or_else(spool_unavailable)
    }

    fn file_mut(&mut self) -> io::Result<&mut SpooledTempFile> {
        self.file.as_mut().ok_or_else(spool_unavailable)
    }

    async fn run_blocking<T, F>(&mut self, op: F) -> io::Result<T>
    where
        F: FnOnce(&mut SpooledTempFile) -> io::Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let mut file = self.file.take().ok_or_else(spool_unavailable)?;
        let (file, result) = tokio::task::spawn_blocking(move || {
            let result = op(&mut file);
            (file, result)
        })
        .await
        .map_err(io::Error::other)?;
        self.file = Some(file);
        result
    }
}

impl std::fmt::Debug for SpooledUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpooledUpload")
            .field("filename", &self.filename)
            .field("size", &self.size)
            .field("rolled", &self.is_rolled())
            .finish()
    }
}

fn spool_unavailable() -> io::Error {
    io::Error::other("spooled file is no longer available")
}

fn read_up_to<R: Read>(reader: &mut R, size: usize) -> io::Result<Bytes> {
    let mut buf = Vec::with_capacity(size);
    reader.by_ref().take(size as u64).read_to_end(&mut buf)?;
    Ok(Bytes::from(buf))
}

impl FromRequest<Arc<AppState>> for SpooledUpload {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let mut multipart = Multipart::from_request(req, state).await?;

        while let Some(mut field) = multipart.next_field().await? {
            if field.name() != Some(FILE_FIELD) {
                continue;
            }

            let filename = field.file_name().map(str::to_string);
            let mut upload = SpooledUpload::new(state.config.spool_max_bytes, filename);
            while let Some(chunk) = field.chunk().await? {
                upload.write(chunk).await?;
            }
            upload.rewind().await?;

            debug!(
                "Spooled upload {:?}: {} bytes (on disk: {})",
                upload.filename(),
                upload.size(),
                upload.is_rolled()
            );
            return Ok(upload);
        }

        Err(ApiError::missing_field(FILE_FIELD))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn fill(upload: &mut SpooledUpload, chunks: usize, chunk_len: usize) {
        for i in 0..chunks {
            upload.write(Bytes::from(vec![i as u8; chunk_len])).await.unwrap();
        }
        upload.rewind().await.unwrap();
    }

    async fn drain(upload: &mut SpooledUpload, chunk_size: usize) -> (u64, usize) {
        let mut total = 0u64;
        let mut reads = 0usize;
        loop {
            let chunk = upload.read(chunk_size).await.unwrap();
            if chunk.is_empty() {
                break;
            }
            assert!(chunk.len() <= chunk_size);
            total += chunk.len() as u64;
            reads += 1;
        }
        (total, reads)
    }

    #[tokio::test]
    async fn test_small_spool_stays_in_memory() {
        let mut upload = SpooledUpload::new(1024, Some("small.bin".to_string()));
        fill(&mut upload, 4, 100).await;

        assert!(!upload.is_rolled());
        assert_eq!(upload.size(), 400);
        assert_eq!(upload.filename(), Some("small.bin"));
        assert_eq!(drain(&mut upload, 128).await, (400, 4));
    }

    #[tokio::test]
    async fn test_large_spool_rolls_to_disk() {
        let mut upload = SpooledUpload::new(1024, None);
        fill(&mut upload, 10, 1000).await;

        assert!(upload.is_rolled());
        assert_eq!(drain(&mut upload, 4096).await, (10_000, 3));
    }

    #[tokio::test]
    async fn test_into_file_reads_synchronously() {
        let mut upload = SpooledUpload::new(16, None);
        fill(&mut upload, 2, 64).await;

        let mut file = upload.into_file().unwrap();
        let mut contents = Vec::new();
        file.read_to_end(&mut contents).unwrap();
        assert_eq!(contents.len(), 128);
        assert_eq!(contents[64], 1);
    }

    #[tokio::test]
    async fn test_rollover_write_is_offloaded() {
        let mut upload = SpooledUpload::new(1024, None);
        upload.write(Bytes::from(vec![1u8; 1000])).await.unwrap();

        assert!(!upload.is_rolled());
        assert!(!upload.write_hits_disk(24));
        assert!(upload.write_hits_disk(25));

        upload.write(Bytes::from(vec![2u8; 100])).await.unwrap();
        assert!(upload.is_rolled());
        assert!(upload.write_hits_disk(1));

        upload.rewind().await.unwrap();
        assert_eq!(drain(&mut upload, 4096).await, (1100, 1));
    }

    #[test]
    fn test_missing_field_is_unprocessable() {
        let error = ApiError::missing_field("file");
        assert_eq!(error.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.into_response().status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
