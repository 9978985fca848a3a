//! Upload Bench Client
//!
//! Uploads every test file to every endpoint and appends the run to the
//! results file.
use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use colored::Colorize;
use tracing::info;

use upload_bench_client::BenchmarkRunner;
use upload_bench_core::core::{config, init_logging, Config};
use upload_bench_core::{results, Endpoint};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let matches = Command::new("upload-bench-client")
        .version(upload_bench_core::VERSION)
        .about("Runs the upload benchmark against a running server.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .value_name("URL")
                .help("Server base URL")
        )
        .arg(
            Arg::new("results")
                .long("results")
                .value_name("FILE")
                .help("Results file the run is appended to")
        )
        .arg(
            Arg::new("test-files-dir")
                .long("test-files-dir")
                .value_name("DIR")
                .help("Directory for generated test files")
        )
        .arg(
            Arg::new("min-size")
                .long("min-size")
                .value_name("BYTES")
                .value_parser(clap::value_parser!(u64))
                .help("Smallest file size")
        )
        .arg(
            Arg::new("max-size")
                .long("max-size")
                .value_name("BYTES")
                .value_parser(clap::value_parser!(u64))
                .help("Largest file size")
        )
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("NAME")
                .action(ArgAction::Append)
                .help("Endpoint to benchmark; repeat for several (default: all)")
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

    apply_cli_overrides(&mut config, &matches)?;
    config.validate()?;

    info!("Starting upload-bench-client v{}", upload_bench_core::VERSION);

    let results_file = config.client.results_file.clone();
    let runner = BenchmarkRunner::new(config.client)?;
    let run = runner.run().await.context("Benchmark run failed")?;

    let history = results::save_run(&results_file, run)
        .with_context(|| format!("Failed to save results to {}", results_file.display()))?;

    println!("{}", "=".repeat(100));
    println!("{} Results saved to {}", "✓".green(), results_file.display());
    println!("  Runs recorded: {}", history.runs.len());
    println!("  View tables with: upload-bench-report --results {}", results_file.display());
    println!("  Plot large files with: upload-bench-plot --results {}", results_file.display());

    Ok(())
}

/// Apply command line argument overrides to configuration
fn apply_cli_overrides(config: &mut Config, matches: &clap::ArgMatches) -> anyhow::Result<()> {
    if let Some(url) = matches.get_one::<String>("base-url") {
        config.client.base_url = url.clone();
    }
    if let Some(path) = matches.get_one::<String>("results") {
        config.client.results_file = path.into();
    }
    if let Some(dir) = matches.get_one::<String>("test-files-dir") {
        config.client.test_files_dir = dir.into();
    }
    if let Some(min) = matches.get_one::<u64>("min-size") {
        config.client.min_size_bytes = *min;
    }
    if let Some(max) = matches.get_one::<u64>("max-size") {
        config.client.max_size_bytes = *max;
    }
    if let Some(names) = matches.get_many::<String>("endpoint") {
        config.client.endpoints = names
            .map(|name| name.parse::<Endpoint>())
            .collect::<Result<_, _>>()?;
    }

    Ok(())
}
