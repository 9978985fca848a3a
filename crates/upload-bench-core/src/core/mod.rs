//! Core configuration and logging

/// Application configuration
pub mod config;

/// Tracing subscriber setup
pub mod logging;

// Re-export commonly used items
pub use config::{Config, ClientConfig, ReportConfig, ServerConfig, load_config, load_config_or_default};
pub use logging::init_logging;
