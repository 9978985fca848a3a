//! Server responses and persisted benchmark records

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::endpoint::Endpoint;
use crate::constants::BYTES_PER_MB;

/// Aggregated statistics: endpoint name -> statistic name -> value
pub type Summary = BTreeMap<String, BTreeMap<String, f64>>;

/// JSON body returned by every upload endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerResponse {
    /// Endpoint name, e.g. `sync-file`
    pub endpoint: String,
    /// Bytes consumed by the handler
    pub file_size_bytes: u64,
    /// Bytes consumed by the handler, in MiB
    pub file_size_mb: f64,
    /// Time spent in the handler body
    pub handler_duration_seconds: f64,
    /// RSS when the timing middleware saw the request
    pub memory_start_mb: f64,
    /// RSS after the handler consumed the body
    pub memory_end_mb: f64,
    /// `memory_end_mb - memory_start_mb`
    pub memory_delta_mb: f64,
}

impl ServerResponse {
    /// Build a response for `endpoint` from the handler's measurements
    pub fn new(
        endpoint: Endpoint,
        file_size_bytes: u64,
        handler_duration_seconds: f64,
        memory_start_mb: f64,
        memory_end_mb: f64,
    ) -> Self {
        Self {
            endpoint: endpoint.name().to_string(),
            file_size_bytes,
            file_size_mb: file_size_bytes as f64 / BYTES_PER_MB,
            handler_duration_seconds,
            memory_start_mb,
            memory_end_mb,
            memory_delta_mb: memory_end_mb - memory_start_mb,
        }
    }
}

/// Metrics for a single endpoint trial
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointMetrics {
    /// Endpoint name
    pub endpoint: String,
    /// Bytes the server reported consuming
    pub file_size_bytes: u64,
    /// Bytes the server reported consuming, in MiB
    pub file_size_mb: f64,
    /// Time spent in the handler body
    pub handler_duration_seconds: f64,
    /// Total request processing time including framework overhead
    pub total_duration_seconds: f64,
    /// Throughput based on total duration
    pub total_throughput_mbps: f64,
    /// Memory delta measured across the entire request
    pub total_memory_delta_mb: f64,
    /// RSS at request start
    pub memory_start_mb: f64,
    /// RSS at handler end
    pub memory_end_mb: f64,
    /// RSS delta seen by the handler
    pub memory_delta_mb: f64,
    /// Wall clock measured by the client
    pub client_duration: f64,
}

impl EndpointMetrics {
    /// Combine a server response with the timing headers and client clock
    pub fn from_response(
        response: &ServerResponse,
        total_duration_seconds: f64,
        total_memory_delta_mb: f64,
        client_duration: f64,
    ) -> Self {
        Self {
            endpoint: response.endpoint.clone(),
            file_size_bytes: response.file_size_bytes,
            file_size_mb: response.file_size_mb,
            handler_duration_seconds: response.handler_duration_seconds,
            total_duration_seconds,
            total_throughput_mbps: throughput_mbps(response.file_size_mb, total_duration_seconds),
            total_memory_delta_mb,
            memory_start_mb: response.memory_start_mb,
            memory_end_mb: response.memory_end_mb,
            memory_delta_mb: response.memory_delta_mb,
            client_duration,
        }
    }
}

/// MiB per second, zero when no time elapsed
pub fn throughput_mbps(size_mb: f64, duration_seconds: f64) -> f64 {
    if duration_seconds > 0.0 {
        size_mb / duration_seconds
    } else {
        0.0
    }
}

/// All endpoint trials for one file size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileSizeTest {
    /// Label such as `1KB` or `10MB`
    pub file_size_label: String,
    /// File size in bytes
    pub file_size_bytes: u64,
    /// Endpoint name -> metrics; failed trials are absent
    pub results: BTreeMap<String, EndpointMetrics>,
}

/// Complete benchmark run with all file sizes and endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRun {
    /// When the run finished
    pub timestamp: DateTime<Local>,
    /// Per-size results, ascending by size
    pub test_files: Vec<FileSizeTest>,
    /// Endpoint paths exercised by the run
    pub endpoints: Vec<String>,
    /// Aggregated statistics per endpoint
    #[serde(default)]
    pub summary: Summary,
}

impl BenchmarkRun {
    /// Create a run stamped now and fill in its summary
    pub fn new(test_files: Vec<FileSizeTest>, endpoints: &[Endpoint]) -> Self {
        let mut run = Self {
            timestamp: Local::now(),
            test_files,
            endpoints: endpoints.iter().map(Endpoint::path).collect(),
            summary: Summary::new(),
        };
        run.summary = run.compute_summary();
        run
    }

    /// Endpoint names (paths without the upload prefix) in run order
    pub fn endpoint_names(&self) -> Vec<String> {
        self.endpoints
            .iter()
            .map(|path| Endpoint::name_from_path(path).to_string())
            .collect()
    }

    /// Every recorded trial of `endpoint`, ascending by file size
    pub fn trials_for<'a>(&'a self, endpoint: &'a str) -> impl Iterator<Item = &'a EndpointMetrics> + 'a {
        self.test_files.iter().filter_map(move |test| test.results.get(endpoint))
    }

    /// Per-endpoint aggregates over successful trials
    pub fn compute_summary(&self) -> Summary {
        let mut summary = Summary::new();

        for endpoint in self.endpoint_names() {
            let trials: Vec<&EndpointMetrics> = self.trials_for(&endpoint).collect();
            if trials.is_empty() {
                continue;
            }
            let count = trials.len() as f64;
            let mean = |f: fn(&EndpointMetrics) -> f64| trials.iter().map(|m| f(m)).sum::<f64>() / count;
            let max = |f: fn(&EndpointMetrics) -> f64| {
                trials.iter().map(|m| f(m)).fold(f64::NEG_INFINITY, f64::max)
            };

            let mut stats = BTreeMap::new();
            stats.insert("trials".to_string(), count);
            stats.insert("mean_total_duration_seconds".to_string(), mean(|m| m.total_duration_seconds));
            stats.insert("mean_throughput_mbps".to_string(), mean(|m| m.total_throughput_mbps));
            stats.insert("max_throughput_mbps".to_string(), max(|m| m.total_throughput_mbps));
            stats.insert("mean_memory_delta_mb".to_string(), mean(|m| m.memory_delta_mb));
            stats.insert("max_memory_delta_mb".to_string(), max(|m| m.memory_delta_mb));
            summary.insert(endpoint, stats);
        }

        summary
    }
}

/// Collection of benchmark runs over time, stored as a JSON array
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkHistory {
    /// Runs in the order they were recorded
    pub runs: Vec<BenchmarkRun>,
}

impl BenchmarkHistory {
    /// Add a new benchmark run to history
    pub fn add_run(&mut self, run: BenchmarkRun) {
        self.runs.push(run);
    }

    /// The most recent benchmark run
    pub fn latest(&self) -> Option<&BenchmarkRun> {
        self.runs.last()
    }

    /// A specific benchmark run by timestamp
    pub fn run_by_timestamp(&self, timestamp: &DateTime<Local>) -> Option<&BenchmarkRun> {
        self.runs.iter().find(|run| &run.timestamp == timestamp)
    }

    /// Whether no runs have been recorded
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}
