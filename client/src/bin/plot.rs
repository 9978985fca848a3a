//! Renders the large file plot of the latest recorded run
use anyhow::Context;
use clap::{Arg, Command};
use colored::Colorize;

use upload_bench_client::report::plot_large_files;
use upload_bench_core::core::{config, init_logging};
use upload_bench_core::{results, FileSize};

fn main() -> anyhow::Result<()> {
    let matches = Command::new("upload-bench-plot")
        .version(upload_bench_core::VERSION)
        .about("Plots throughput, memory and duration for large files.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file path")
        )
        .arg(
            Arg::new("results")
                .long("results")
                .value_name("FILE")
                .help("Results file to read")
        )
        .arg(
            Arg::new("output-dir")
                .long("output-dir")
                .value_name("DIR")
                .help("Directory the plot is written to")
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_name("BYTES")
                .value_parser(clap::value_parser!(u64))
                .help("Smallest file size to include")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").map_or("info", |s| s.as_str());
    init_logging(log_level);

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = config::load_config_or_default(config_path);
    if let Some(path) = matches.get_one::<String>("results") {
        config.client.results_file = path.into();
    }
    if let Some(dir) = matches.get_one::<String>("output-dir") {
        config.report.plot_dir = dir.into();
    }
    if let Some(threshold) = matches.get_one::<u64>("threshold") {
        config.report.large_file_threshold_bytes = *threshold;
    }

    let results_file = &config.client.results_file;
    let history = results::load_history(results_file)
        .with_context(|| format!("Failed to read {}", results_file.display()))?;

    let Some(run) = history.latest() else {
        println!("No benchmark results found.");
        println!("Run upload-bench-client first to record a run.");
        return Ok(());
    };

    let threshold = config.report.large_file_threshold_bytes;
    match plot_large_files(run, threshold, &config.report.plot_dir)? {
        Some(path) => println!("{} Plot saved to {}", "✓".green(), path.display()),
        None => println!(
            "No file sizes of {} or more in the latest run; nothing to plot.",
            FileSize::label_for(threshold)
        ),
    }

    Ok(())
}
