//! Runs the plot binary against results files on disk

use std::process::Command;

use upload_bench_core::{results, BenchmarkRun, Endpoint};

fn plot_command(results_file: &std::path::Path, output_dir: &std::path::Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_upload-bench-plot"));
    command
        .arg("--results")
        .arg(results_file)
        .arg("--output-dir")
        .arg(output_dir)
        .env_remove("RUST_LOG");
    command
}

#[test]
fn empty_history_prints_hint_and_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let output = plot_command(&dir.path().join("absent.json"), &dir.path().join("plots"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No benchmark results found."));
    assert!(!dir.path().join("plots").exists());
}

#[test]
fn run_without_large_sizes_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let results_file = dir.path().join("results.json");
    results::save_run(&results_file, BenchmarkRun::new(Vec::new(), &Endpoint::all())).unwrap();

    let output = plot_command(&results_file, &dir.path().join("plots")).output().unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("nothing to plot"));
}
