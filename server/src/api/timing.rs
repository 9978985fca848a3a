//! Request timing middleware
//!
//! Runs before any extractor touches the body, so the recorded start covers
//! the framework's own multipart parsing and buffering.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::{sync::Arc, time::Instant};
use tracing::debug;

use crate::app_state::AppState;
use upload_bench_core::constants::{TOTAL_DURATION_HEADER, TOTAL_MEMORY_DELTA_HEADER};

/// Start-of-request measurements, available to handlers as a request extension
#[derive(Debug, Clone, Copy)]
pub struct RequestStart {
    /// Monotonic time the middleware saw the request
    pub instant: Instant,
    /// RSS in MiB at that moment
    pub memory_mb: f64,
}

/// Record start time and RSS, run the request, then attach the totals as headers
pub async fn timing_middleware(
    State(app_state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let start = RequestStart {
        instant: Instant::now(),
        memory_mb: app_state.memory.rss_mb(),
    };
    request.extensions_mut().insert(start);

    let mut response = next.run(request).await;

    let total_duration = start.instant.elapsed().as_secs_f64();
    let memory_delta = app_state.memory.rss_mb() - start.memory_mb;
    debug!(total_duration, memory_delta, status = %response.status(), "request measured");

    let headers = response.headers_mut();
    for (name, value) in [
        (TOTAL_DURATION_HEADER, total_duration),
        (TOTAL_MEMORY_DELTA_HEADER, memory_delta),
    ] {
        if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
            headers.insert(HeaderName::from_static(name), value);
        }
    }

    response
}
