//! # Upload Bench Core
//!
//! Types and utilities shared by the upload benchmark server, client and
//! reporting tools: endpoint catalogue, file size ladder, result records,
//! configuration, logging setup and process memory sampling.

#![warn(missing_docs)]

/// Core configuration and logging
pub mod core;

/// Type definitions for endpoints, sizes and result records
pub mod types;

/// Process-level measurement utilities
pub mod system;

/// Benchmark constants
pub mod constants;

/// Results file persistence
pub mod results;

// Re-export commonly used items
pub use core::{Config, load_config_or_default};
pub use types::{Error, Result};
pub use types::{BenchmarkHistory, BenchmarkRun, Endpoint, EndpointMetrics, FileSize, FileSizeTest, ServerResponse};
pub use system::MemorySampler;

/// Crate version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
