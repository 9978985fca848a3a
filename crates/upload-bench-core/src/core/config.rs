//! Configuration for the upload benchmark
//!
//! Every key is optional: missing keys fall back to the defaults below, so an
//! empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::{
    CHUNK_SIZE, DEFAULT_MAX_SIZE_BYTES, DEFAULT_MIN_SIZE_BYTES, LARGE_FILE_THRESHOLD_BYTES, MAX_BODY_BYTES,
    SPOOL_MAX_BYTES,
};
use crate::types::{Endpoint, Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Client driver configuration
    #[serde(default)]
    pub client: ClientConfig,

    /// Reporting configuration
    #[serde(default)]
    pub report: ReportConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Read size of the chunked handlers
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// In-memory threshold of spooled uploads
    #[serde(default = "default_spool_max_bytes")]
    pub spool_max_bytes: usize,

    /// Request body limit for upload routes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

/// Client driver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Server base URL, without a trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Directory holding generated test files
    #[serde(default = "default_test_files_dir")]
    pub test_files_dir: PathBuf,

    /// JSON file runs are appended to
    #[serde(default = "default_results_file")]
    pub results_file: PathBuf,

    /// First size of the doubling ladder
    #[serde(default = "default_min_size_bytes")]
    pub min_size_bytes: u64,

    /// Upper bound of the doubling ladder (inclusive)
    #[serde(default = "default_max_size_bytes")]
    pub max_size_bytes: u64,

    /// Per-request timeout
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Endpoints to exercise, in order
    #[serde(default = "Endpoint::all")]
    pub endpoints: Vec<Endpoint>,
}

/// Reporting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Output directory for plots
    #[serde(default = "default_plot_dir")]
    pub plot_dir: PathBuf,

    /// Smallest file size included in the large file plot
    #[serde(default = "default_large_file_threshold_bytes")]
    pub large_file_threshold_bytes: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            chunk_size: default_chunk_size(),
            spool_max_bytes: default_spool_max_bytes(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            test_files_dir: default_test_files_dir(),
            results_file: default_results_file(),
            min_size_bytes: default_min_size_bytes(),
            max_size_bytes: default_max_size_bytes(),
            request_timeout_secs: default_request_timeout_secs(),
            endpoints: Endpoint::all(),
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            plot_dir: default_plot_dir(),
            large_file_threshold_bytes: default_large_file_threshold_bytes(),
        }
    }
}

impl Config {
    /// Reject settings that would make a run meaningless
    pub fn validate(&self) -> Result<()> {
        if self.server.chunk_size == 0 {
            return Err(Error::config("server.chunk_size must be greater than zero"));
        }
        if self.client.min_size_bytes == 0 {
            return Err(Error::config("client.min_size_bytes must be greater than zero"));
        }
        if self.client.min_size_bytes > self.client.max_size_bytes {
            return Err(Error::config(format!(
                "client.min_size_bytes ({}) exceeds client.max_size_bytes ({})",
                self.client.min_size_bytes, self.client.max_size_bytes
            )));
        }
        if self.client.endpoints.is_empty() {
            return Err(Error::config("client.endpoints must name at least one endpoint"));
        }
        Ok(())
    }
}

// Default value functions for serde
fn default_http_addr() -> SocketAddr { SocketAddr::from(([0, 0, 0, 0], 8000)) }
fn default_chunk_size() -> usize { CHUNK_SIZE }
fn default_spool_max_bytes() -> usize { SPOOL_MAX_BYTES }
fn default_max_body_bytes() -> usize { MAX_BODY_BYTES }
fn default_base_url() -> String { "http://localhost:8000".to_string() }
fn default_test_files_dir() -> PathBuf { PathBuf::from("test_files") }
fn default_results_file() -> PathBuf { PathBuf::from("benchmark_results.json") }
fn default_min_size_bytes() -> u64 { DEFAULT_MIN_SIZE_BYTES }
fn default_max_size_bytes() -> u64 { DEFAULT_MAX_SIZE_BYTES }
fn default_request_timeout_secs() -> u64 { 300 }
fn default_plot_dir() -> PathBuf { PathBuf::from("plots") }
fn default_large_file_threshold_bytes() -> u64 { LARGE_FILE_THRESHOLD_BYTES }

/// Load configuration from file
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let config_str = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&config_str)?;
    Ok(config)
}

/// Load configuration from file or use defaults
pub fn load_config_or_default(path: Option<&str>) -> Config {
    match path {
        Some(path) => match load_config(path) {
            Ok(config) => {
                info!("Loaded configuration from: {}", path);
                config
            }
            Err(e) => {
                warn!("Failed to load config from {}: {}. Using defaults.", path, e);
                Config::default()
            }
        },
        None => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.http_addr.port(), 8000);
        assert_eq!(config.server.chunk_size, 256 * 1024);
        assert_eq!(config.client.endpoints.len(), 5);
        assert_eq!(config.report.large_file_threshold_bytes, 128 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            [server]
            http_addr = "127.0.0.1:9000"

            [client]
            max_size_bytes = 4096
            endpoints = ["async-stream", "sync-file"]
            "#,
        )
        .unwrap();

        assert_eq!(config.server.http_addr.port(), 9000);
        assert_eq!(config.server.spool_max_bytes, SPOOL_MAX_BYTES);
        assert_eq!(config.client.max_size_bytes, 4096);
        assert_eq!(config.client.min_size_bytes, 1024);
        assert_eq!(config.client.endpoints, vec![Endpoint::AsyncStream, Endpoint::SyncFile]);
    }

    #[test]
    fn test_validate_rejects_inverted_ladder() {
        let mut config = Config::default();
        config.client.min_size_bytes = 8192;
        config.client.max_size_bytes = 1024;
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_unreadable_file_falls_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server\nbroken").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        assert!(load_config(&path).is_err());
        let config = load_config_or_default(Some(&path));
        assert_eq!(config.client.base_url, "http://localhost:8000");
    }
}
