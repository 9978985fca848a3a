//! Grouped bar charts for the large file sizes of a run

use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

use upload_bench_core::{BenchmarkRun, EndpointMetrics, Error, FileSize, Result};

/// Output file name inside the plot directory
pub const PLOT_FILE_NAME: &str = "large_files_performance.svg";

const PLOT_SIZE: (u32, u32) = (1400, 1200);

const COLORS: [RGBColor; 5] = [
    RGBColor(0x1f, 0x77, 0xb4),
    RGBColor(0xff, 0x7f, 0x0e),
    RGBColor(0x2c, 0xa0, 0x2c),
    RGBColor(0xd6, 0x27, 0x28),
    RGBColor(0x94, 0x67, 0xbd),
];

/// One chart of the figure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotMetric {
    /// Total throughput, MB/s
    Throughput,
    /// Handler RSS delta, MB
    MemoryDelta,
    /// Total request duration, seconds
    Duration,
}

impl PlotMetric {
    /// Charts from top to bottom
    pub const ALL: [PlotMetric; 3] = [PlotMetric::Throughput, PlotMetric::MemoryDelta, PlotMetric::Duration];

    fn title(&self) -> &'static str {
        match self {
            PlotMetric::Throughput => "Upload Throughput",
            PlotMetric::MemoryDelta => "Memory Usage (RSS Delta)",
            PlotMetric::Duration => "Total Request Duration",
        }
    }

    fn axis_label(&self) -> &'static str {
        match self {
            PlotMetric::Throughput => "Throughput (MB/s)",
            PlotMetric::MemoryDelta => "Memory Delta (MB)",
            PlotMetric::Duration => "Duration (seconds)",
        }
    }

    fn value(&self, metrics: &EndpointMetrics) -> f64 {
        match self {
            PlotMetric::Throughput => metrics.total_throughput_mbps,
            PlotMetric::MemoryDelta => metrics.memory_delta_mb,
            PlotMetric::Duration => metrics.total_duration_seconds,
        }
    }
}

/// Values to plot, extracted from a run
#[derive(Debug, Clone, PartialEq)]
pub struct PlotData {
    /// File size labels along the x axis
    pub labels: Vec<String>,
    /// Endpoint names, one bar colour each
    pub endpoints: Vec<String>,
    /// `[metric][endpoint][size]`, missing trials as 0
    pub values: Vec<Vec<Vec<f64>>>,
}

impl PlotData {
    /// Series of one metric for one endpoint
    pub fn series(&self, metric: PlotMetric, endpoint: usize) -> &[f64] {
        let metric_index = PlotMetric::ALL.iter().position(|m| *m == metric).unwrap_or(0);
        &self.values[metric_index][endpoint]
    }
}

/// Sizes at or above `threshold_bytes`; `None` when there are none
pub fn large_file_series(run: &BenchmarkRun, threshold_bytes: u64) -> Option<PlotData> {
    let tests: Vec<_> = run
        .test_files
        .iter()
        .filter(|test| test.file_size_bytes >= threshold_bytes)
        .collect();
    if tests.is_empty() {
        return None;
    }

    let endpoints = run.endpoint_names();
    let values = PlotMetric::ALL
        .iter()
        .map(|metric| {
            endpoints
                .iter()
                .map(|endpoint| {
                    tests
                        .iter()
                        .map(|test| test.results.get(endpoint).map_or(0.0, |m| metric.value(m)))
                        .collect()
                })
                .collect()
        })
        .collect();

    Some(PlotData {
        labels: tests.iter().map(|test| test.file_size_label.clone()).collect(),
        endpoints,
        values,
    })
}

/// Label under a group centre, blank elsewhere
fn group_label(labels: &[String], x: f64) -> String {
    let group = x.floor();
    if group < 0.0 || (x - group - 0.5).abs() > 1e-6 {
        return String::new();
    }
    labels.get(group as usize).cloned().unwrap_or_default()
}

fn y_range(data: &PlotData, metric: PlotMetric) -> (f64, f64) {
    let all = (0..data.endpoints.len()).flat_map(|e| data.series(metric, e).iter().copied());
    let (min, max) = all.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let top = if max > 0.0 { max * 1.1 } else { 1.0 };
    let bottom = if min < 0.0 { min * 1.1 } else { 0.0 };
    (bottom, top)
}

fn draw(data: &PlotData, title: &str, output: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(output, PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(title, ("sans-serif", 22))?;
    let panels = root.split_evenly((PlotMetric::ALL.len(), 1));

    let groups = data.labels.len();
    let bar_width = 0.8 / data.endpoints.len().max(1) as f64;

    for (panel, metric) in panels.iter().zip(PlotMetric::ALL) {
        let (bottom, top) = y_range(data, metric);
        let mut chart = ChartBuilder::on(panel)
            .caption(metric.title(), ("sans-serif", 18))
            .margin(10)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0f64..groups as f64, bottom..top)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(groups * 2 + 1)
            .x_label_formatter(&|x| group_label(&data.labels, *x))
            .x_desc("File Size")
            .y_desc(metric.axis_label())
            .draw()?;

        for (index, endpoint) in data.endpoints.iter().enumerate() {
            let color = COLORS[index % COLORS.len()];
            let series = data.series(metric, index);
            chart
                .draw_series(series.iter().enumerate().map(|(group, value)| {
                    let x0 = group as f64 + 0.1 + index as f64 * bar_width;
                    Rectangle::new([(x0, 0.0), (x0 + bar_width, *value)], color.filled())
                }))?
                .label(endpoint.as_str())
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    root.present()?;
    Ok(())
}

/// Render the large file figure into `output_dir`.
///
/// Returns the written path, or `None` when the run has no size at or above
/// `threshold_bytes`.
pub fn plot_large_files(run: &BenchmarkRun, threshold_bytes: u64, output_dir: &Path) -> Result<Option<PathBuf>> {
    let Some(data) = large_file_series(run, threshold_bytes) else {
        return Ok(None);
    };

    std::fs::create_dir_all(output_dir)?;
    let output = output_dir.join(PLOT_FILE_NAME);
    let title = format!(
        "Large File Upload Performance ({}+) - Run: {}",
        FileSize::label_for(threshold_bytes),
        run.timestamp.format("%Y-%m-%d %H:%M:%S")
    );

    draw(&data, &title, &output).map_err(|e| Error::plot(e.to_string()))?;
    info!("Plot saved to {}", output.display());
    Ok(Some(output))
}
