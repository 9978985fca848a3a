//! Sequential benchmark loop
//!
//! One trial at a time: every file size, ascending, against every configured
//! endpoint. Failed trials are reported and left out of the run.

use colored::Colorize;
use std::collections::BTreeMap;
use std::io::Write;
use std::time::Duration;
use tracing::{info, warn};

use crate::files::{self, FileProgress, PreparedFile};
use crate::uploader::{UploadOutcome, Uploader};
use upload_bench_core::core::ClientConfig;
use upload_bench_core::{BenchmarkRun, Error, FileSize, FileSizeTest, Result};

const RULE_WIDTH: usize = 100;

/// Drives a full benchmark run from a client configuration
#[derive(Debug)]
pub struct BenchmarkRunner {
    config: ClientConfig,
    uploader: Uploader,
}

impl BenchmarkRunner {
    /// Create a runner; fails only if the HTTP client cannot be built
    pub fn new(config: ClientConfig) -> Result<Self> {
        let uploader = Uploader::new(&config.base_url, Duration::from_secs(config.request_timeout_secs))?;
        Ok(Self { config, uploader })
    }

    /// Configured size ladder
    pub fn file_sizes(&self) -> Vec<FileSize> {
        FileSize::ladder(self.config.min_size_bytes, self.config.max_size_bytes)
    }

    /// Generate test files and run every trial, returning the finished run
    pub async fn run(&self) -> Result<BenchmarkRun> {
        let sizes = self.file_sizes();
        let endpoints = &self.config.endpoints;

        println!("{}", "=".repeat(RULE_WIDTH));
        println!("{}", "Axum File Upload Benchmark".bold());
        println!("{}", "=".repeat(RULE_WIDTH));
        println!();
        if let (Some(first), Some(last)) = (sizes.first(), sizes.last()) {
            println!("Testing {} file sizes from {} to {}", sizes.len(), first.label, last.label);
        }
        println!("Testing {} endpoints against {}", endpoints.len(), self.config.base_url);
        println!();

        println!("Preparing test files...");
        let prepared = self.prepare_files(sizes).await?;
        println!();

        println!("Running benchmarks...");
        println!();
        let mut test_files = Vec::with_capacity(prepared.len());
        for file in &prepared {
            test_files.push(self.run_size(file).await);
            println!();
        }

        let run = BenchmarkRun::new(test_files, endpoints);
        info!("Run finished with {} file sizes", run.test_files.len());
        Ok(run)
    }

    /// Generate files on the blocking pool, printing each one as it is made
    async fn prepare_files(&self, sizes: Vec<FileSize>) -> Result<Vec<PreparedFile>> {
        let dir = self.config.test_files_dir.clone();
        tokio::task::spawn_blocking(move || {
            files::prepare_test_files(&dir, &sizes, |event| match event {
                FileProgress::Started(size) => {
                    print!("  Generating {} file... ", size.label);
                    let _ = std::io::stdout().flush();
                }
                FileProgress::Finished(file) if file.reused => {
                    println!("{} (reusing existing)", "✓".green());
                }
                FileProgress::Finished(_) => println!("{}", "✓".green()),
            })
        })
        .await
        .map_err(|e| Error::internal(format!("File generation task failed: {}", e)))?
    }

    /// Every endpoint for one file; failures are printed and skipped
    async fn run_size(&self, file: &PreparedFile) -> FileSizeTest {
        println!("Testing {} file:", file.size.label.bold());
        let mut results = BTreeMap::new();

        for endpoint in &self.config.endpoints {
            match self.uploader.upload(*endpoint, &file.path).await {
                Ok(UploadOutcome::Success(trial)) => {
                    let metrics = trial.metrics();
                    println!(
                        "  {}... {} handler: {:.3}s, total: {:.3}s ({:.2} MB/s)",
                        endpoint,
                        "✓".green(),
                        metrics.handler_duration_seconds,
                        metrics.total_duration_seconds,
                        metrics.total_throughput_mbps
                    );
                    results.insert(endpoint.name().to_string(), metrics);
                }
                Ok(UploadOutcome::HttpError { status, .. }) => {
                    println!("  {}... {} HTTP {}", endpoint, "✗".red(), status.as_u16());
                }
                Err(e) => {
                    warn!("Upload of {} to {} failed: {}", file.size.label, endpoint, e);
                    println!("  {}... {} Error: {}", endpoint, "✗".red(), e);
                }
            }
        }

        FileSizeTest {
            file_size_label: file.size.label.clone(),
            file_size_bytes: file.size.bytes,
            results,
        }
    }
}
