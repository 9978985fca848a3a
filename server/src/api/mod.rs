//! HTTP API module for the upload benchmark server

/// HTTP request handlers
pub mod handlers;

/// Upload extractors and their rejections
pub mod extractors;

/// Request timing middleware
pub mod timing;

/// HTTP server implementation
pub mod api_server;

// Re-export commonly used items
pub use api_server::{create_router, serve, start_api_server};
pub use extractors::{ApiError, BufferedFile, ErrorResponse, SpooledUpload};
pub use timing::RequestStart;
