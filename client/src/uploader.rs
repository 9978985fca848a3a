//! Single timed upload against one endpoint

use reqwest::{
    header::{HeaderMap, CONTENT_LENGTH, CONTENT_TYPE},
    multipart::{Form, Part},
    Body, Client, StatusCode,
};
use std::{path::Path, time::{Duration, Instant}};
use tracing::debug;

use upload_bench_core::constants::{FILE_FIELD, TOTAL_DURATION_HEADER, TOTAL_MEMORY_DELTA_HEADER};
use upload_bench_core::types::UploadEncoding;
use upload_bench_core::{Endpoint, EndpointMetrics, Error, Result, ServerResponse};

const OCTET_STREAM: &str = "application/octet-stream";

/// Measurements of a successful upload
#[derive(Debug, Clone)]
pub struct TrialResult {
    /// Parsed response body
    pub server_response: ServerResponse,
    /// Wall clock around the whole exchange, seconds
    pub client_duration: f64,
    /// `X-Total-Duration` header, seconds
    pub total_duration: f64,
    /// `X-Total-Memory-Delta` header, MiB
    pub total_memory_delta: f64,
}

impl TrialResult {
    /// Flatten into the persisted trial record
    pub fn metrics(&self) -> EndpointMetrics {
        EndpointMetrics::from_response(
            &self.server_response,
            self.total_duration,
            self.total_memory_delta,
            self.client_duration,
        )
    }
}

/// Result of one upload attempt that reached the server
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    /// Server answered 200 with a valid body
    Success(TrialResult),
    /// Server answered with another status
    HttpError {
        /// Response status
        status: StatusCode,
        /// Wall clock around the exchange, seconds
        client_duration: f64,
    },
}

/// Uploads files to the benchmark server
#[derive(Debug, Clone)]
pub struct Uploader {
    client: Client,
    base_url: String,
}

impl Uploader {
    /// Create an uploader for `base_url`.
    ///
    /// Idle connections are not kept, so every trial pays for its own
    /// connection setup the same way.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Full URL of an endpoint
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}{}", self.base_url, endpoint.path())
    }

    /// Upload `path` to `endpoint` using the encoding the endpoint expects
    pub async fn upload(&self, endpoint: Endpoint, path: &Path) -> Result<UploadOutcome> {
        let url = self.url(endpoint);
        let start = Instant::now();

        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();

        let request = match endpoint.encoding() {
            UploadEncoding::Raw => self
                .client
                .post(&url)
                .header(CONTENT_TYPE, OCTET_STREAM)
                .header(CONTENT_LENGTH, len)
                .body(Body::from(file)),
            UploadEncoding::Multipart => {
                let file_name = path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "upload.bin".to_string());
                let part = Part::stream_with_length(Body::from(file), len)
                    .file_name(file_name)
                    .mime_str(OCTET_STREAM)
                    .map_err(|e| Error::http(e.to_string()))?;
                self.client.post(&url).multipart(Form::new().part(FILE_FIELD, part))
            }
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("POST {} failed: {}", url, e)))?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Reading response from {} failed: {}", url, e)))?;
        let client_duration = start.elapsed().as_secs_f64();

        debug!(%endpoint, %status, client_duration, "upload finished");
        if status != StatusCode::OK {
            return Ok(UploadOutcome::HttpError { status, client_duration });
        }

        let server_response: ServerResponse = serde_json::from_str(&body)?;
        Ok(UploadOutcome::Success(TrialResult {
            server_response,
            client_duration,
            total_duration: header_f64(&headers, TOTAL_DURATION_HEADER),
            total_memory_delta: header_f64(&headers, TOTAL_MEMORY_DELTA_HEADER),
        }))
    }
}

/// Parse a float header, 0.0 when absent or malformed
fn header_f64(headers: &HeaderMap, name: &str) -> f64 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0.0)
}
