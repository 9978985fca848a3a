//! Upload Bench Server
//!
//! Serves the five upload endpoints under benchmark.
use anyhow::Context;
use clap::{Arg, Command};
use tracing::info;

use upload_bench_core::core::{config, init_logging, Config};
use upload_bench_server::{start_api_server, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("upload-bench-server")
        .version(upload_bench_core::VERSION)
        .about("HTTP server exposing five file upload strategies for benchmarking.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("http-addr")
                .long("http-addr")
                .value_name("ADDR")
                .help("HTTP server bind address")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    // Initialize logging
    let log_level = matches.get_one::<String>("log-level").map_or("info", |s| s.as_str());
    init_logging(log_level);

    // Load configuration
    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = config::load_config_or_default(config_path);

    // Apply CLI overrides
    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    info!("Starting upload-bench-server v{}", upload_bench_core::VERSION);
    info!(
        "Chunk size {} bytes, spool threshold {} bytes, body limit {} bytes",
        config.server.chunk_size, config.server.spool_max_bytes, config.server.max_body_bytes
    );

    let app_state = AppState::new(config.server);
    start_api_server(app_state).await.context("HTTP server failed")?;

    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> anyhow::Result<()> {
    if let Some(addr) = matches.get_one::<String>("http-addr") {
        config.server.http_addr = addr
            .parse()
            .with_context(|| format!("Invalid HTTP address: {}", addr))?;
    }

    Ok(())
}
