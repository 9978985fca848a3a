//! # Upload Bench Server
//!
//! Axum server exposing five upload endpoints that differ only in how the
//! request body is consumed, wrapped in a middleware that reports total
//! request time and RSS delta in response headers.

#![warn(missing_docs)]

/// HTTP API handlers and routing
pub mod api;

/// Shared server state
pub mod app_state;

pub use app_state::AppState;
pub use api::{create_router, serve, start_api_server};

// Re-export core functionality
pub use upload_bench_core::*;
