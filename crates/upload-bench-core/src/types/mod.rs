//! Type definitions for the upload benchmark

/// Error types
pub mod error;

/// Upload strategy catalogue
pub mod endpoint;

/// Test file size ladder
pub mod size;

/// Server responses and persisted benchmark records
pub mod models;

pub use error::{Error, Result};
pub use endpoint::{Endpoint, UploadEncoding};
pub use size::FileSize;
pub use models::{BenchmarkHistory, BenchmarkRun, EndpointMetrics, FileSizeTest, ServerResponse, Summary};
