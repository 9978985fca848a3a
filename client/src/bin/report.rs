//! Prints the recorded benchmark results as tables
use anyhow::Context;
use chrono::{DateTime, Local};
use clap::{Arg, Command};
use colored::Colorize;

use upload_bench_client::report::{check_run, render_run};
use upload_bench_core::core::{config, init_logging};
use upload_bench_core::results;

fn main() -> anyhow::Result<()> {
    let matches = Command::new("upload-bench-report")
        .version(upload_bench_core::VERSION)
        .about("Shows the tables of a recorded benchmark run.")
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
            Arg::new("timestamp")
                .long("timestamp")
                .value_name("RFC3339")
                .help("Show this run instead of the latest")
        )
        .arg(
            Arg::new("tolerance")
                .long("tolerance")
                .value_name("SECONDS")
                .value_parser(clap::value_parser!(f64))
                .default_value("0")
                .help("Slack allowed when a larger file finishes faster")
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)")
        )
        .get_matches();

    let log_level = matches.get_one::<String>("log-level").map_or("warn", |s| s.as_str());
    init_logging(log_level);

    let config_path = matches.get_one::<String>("config").map(|s| s.as_str());
    let mut config = config::load_config_or_default(config_path);
    if let Some(path) = matches.get_one::<String>("results") {
        config.client.results_file = path.into();
    }

    let results_file = &config.client.results_file;
    let history = results::load_history(results_file)
        .with_context(|| format!("Failed to read {}", results_file.display()))?;

    let Some(latest) = history.latest() else {
        println!("No benchmark results found.");
        println!("Run upload-bench-client first to record a run.");
        std::process::exit(1);
    };

    let run = match matches.get_one::<String>("timestamp") {
        Some(raw) => {
            let timestamp: DateTime<Local> = DateTime::parse_from_rfc3339(raw)
                .with_context(|| format!("Invalid timestamp: {}", raw))?
                .with_timezone(&Local);
            history
                .run_by_timestamp(&timestamp)
                .with_context(|| format!("No run recorded at {}", raw))?
        }
        None => latest,
    };

    print!("{}", render_run(run));

    let tolerance = matches.get_one::<f64>("tolerance").copied().unwrap_or(0.0);
    let findings = check_run(run, tolerance);
    if findings.is_empty() {
        println!("{} Sanity checks passed", "✓".green());
    } else {
        println!("{}", format!("{} sanity warnings:", findings.len()).yellow().bold());
        for finding in &findings {
            println!("  {} {}", "!".yellow(), finding);
        }
    }

    if history.runs.len() > 1 {
        println!();
        println!("Total runs available: {}", history.runs.len());
    }

    Ok(())
}
