//! Terminal tables for a benchmark run

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use upload_bench_core::{BenchmarkRun, EndpointMetrics};

const MISSING: &str = "N/A";

fn base_table(run: &BenchmarkRun) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![Cell::new("File Size").add_attribute(Attribute::Bold).fg(Color::Cyan)];
    header.extend(
        run.endpoint_names()
            .into_iter()
            .map(|name| Cell::new(name).add_attribute(Attribute::Bold).fg(Color::Cyan)),
    );
    table.set_header(header);
    table
}

fn right_align_metrics(table: &mut Table, columns: usize) {
    for index in 1..=columns {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
}

fn build_table(run: &BenchmarkRun, cell: impl Fn(Option<&EndpointMetrics>) -> Cell) -> Table {
    let mut table = base_table(run);
    let endpoints = run.endpoint_names();

    for test in &run.test_files {
        let mut row = vec![Cell::new(&test.file_size_label).add_attribute(Attribute::Dim)];
        row.extend(endpoints.iter().map(|name| cell(test.results.get(name))));
        table.add_row(row);
    }

    right_align_metrics(&mut table, endpoints.len());
    table
}

/// `0.0123s (81.2MB/s)` or `N/A`
pub fn timing_text(metrics: Option<&EndpointMetrics>) -> String {
    match metrics {
        Some(m) => format!("{:.4}s ({:.1}MB/s)", m.total_duration_seconds, m.total_throughput_mbps),
        None => MISSING.to_string(),
    }
}

/// `+1.50 MB`, `-0.25 MB`, `0.00 MB` or `N/A`
pub fn memory_text(metrics: Option<&EndpointMetrics>) -> String {
    match metrics {
        Some(m) if m.memory_delta_mb > 0.0 => format!("+{:.2} MB", m.memory_delta_mb),
        Some(m) => format!("{:.2} MB", m.memory_delta_mb),
        None => MISSING.to_string(),
    }
}

/// Total request time per size and endpoint
pub fn total_timing_table(run: &BenchmarkRun) -> Table {
    build_table(run, |metrics| {
        let cell = Cell::new(timing_text(metrics));
        if metrics.is_none() {
            cell.add_attribute(Attribute::Dim)
        } else {
            cell
        }
    })
}

/// Handler memory delta per size and endpoint; growth red, shrink green
pub fn memory_table(run: &BenchmarkRun) -> Table {
    build_table(run, |metrics| {
        let cell = Cell::new(memory_text(metrics));
        match metrics {
            Some(m) if m.memory_delta_mb > 0.0 => cell.fg(Color::Red),
            Some(m) if m.memory_delta_mb < 0.0 => cell.fg(Color::Green),
            Some(_) => cell,
            None => cell.add_attribute(Attribute::Dim),
        }
    })
}

/// Header plus both tables, ready to print
pub fn render_run(run: &BenchmarkRun) -> String {
    let mut out = String::new();
    out.push_str("Axum File Upload Benchmark Results\n");
    out.push_str(&format!("Run: {}\n\n", run.timestamp.format("%Y-%m-%d %H:%M:%S")));
    out.push_str("Total Request Time (Handler + Framework Processing)\n");
    out.push_str(&total_timing_table(run).to_string());
    out.push_str("\n\nMemory Usage (Delta)\n");
    out.push_str(&memory_table(run).to_string());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;
    use upload_bench_core::{Endpoint, FileSizeTest, ServerResponse};

    fn run_with_one_trial(delta: f64) -> BenchmarkRun {
        let response = ServerResponse::new(Endpoint::AsyncFile, 1024 * 1024, 0.01, 100.0, 100.0 + delta);
        let metrics = EndpointMetrics::from_response(&response, 0.5, delta, 0.6);
        let mut results = BTreeMap::new();
        results.insert("async-file".to_string(), metrics);

        BenchmarkRun::new(
            vec![FileSizeTest {
                file_size_label: "1MB".to_string(),
                file_size_bytes: 1024 * 1024,
                results,
            }],
            &Endpoint::all(),
        )
    }

    #[test]
    fn test_cell_text() {
        let run = run_with_one_trial(1.5);
        let metrics = run.test_files[0].results.get("async-file");

        assert_eq!(timing_text(metrics), "0.5000s (2.0MB/s)");
        assert_eq!(memory_text(metrics), "+1.50 MB");
        assert_eq!(memory_text(None), "N/A");

        let shrunk = run_with_one_trial(-0.25);
        assert_eq!(memory_text(shrunk.test_files[0].results.get("async-file")), "-0.25 MB");
    }

    #[test]
    fn test_tables_have_a_column_per_endpoint() {
        let run = run_with_one_trial(0.0);
        let rendered = total_timing_table(&run).to_string();

        for endpoint in Endpoint::all() {
            assert!(rendered.contains(endpoint.name()));
        }
        assert!(rendered.contains("1MB"));
        assert_eq!(rendered.matches("N/A").count(), 4);
        assert!(memory_table(&run).to_string().contains("0.00 MB"));
    }

    #[test]
    fn test_render_includes_run_time() {
        let run = run_with_one_trial(0.0);
        let rendered = render_run(&run);
        assert!(rendered.contains(&run.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()));
        assert!(rendered.contains("Memory Usage (Delta)"));
    }
}
