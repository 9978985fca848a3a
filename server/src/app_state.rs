//! Shared server state

use std::sync::Arc;
use std::time::Instant;

use upload_bench_core::core::ServerConfig;
use upload_bench_core::MemorySampler;

/// State shared by the middleware and every handler
#[derive(Debug)]
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,

    /// RSS sampler for the server process
    pub memory: MemorySampler,

    /// When the server state was created
    pub started_at: Instant,
}

impl AppState {
    /// Create shared state from the server configuration
    pub fn new(config: ServerConfig) -> Arc<Self> {
        Arc::new(Self {
            config,
            memory: MemorySampler::new(),
            started_at: Instant::now(),
        })
    }
}
