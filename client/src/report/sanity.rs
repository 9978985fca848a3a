//! Plausibility checks over a recorded run
//!
//! Findings are warnings: a run is still reported when some trials look off.

use std::fmt;

use upload_bench_core::{BenchmarkRun, EndpointMetrics};

/// A trial that does not look like a sound measurement
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    /// A non-empty upload reported no throughput
    NonPositiveThroughput {
        /// Endpoint name
        endpoint: String,
        /// File size label
        size: String,
    },
    /// A duration below zero
    NegativeDuration {
        /// Endpoint name
        endpoint: String,
        /// File size label
        size: String,
        /// Which duration
        field: &'static str,
        /// Reported value, seconds
        value: f64,
    },
    /// A larger file finished faster than a smaller one
    FasterThanSmaller {
        /// Endpoint name
        endpoint: String,
        /// Label of the slowest smaller file size
        smaller: String,
        /// Larger file size label
        larger: String,
        /// Total duration of the smaller file, seconds
        smaller_seconds: f64,
        /// Total duration of the larger file, seconds
        larger_seconds: f64,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::NonPositiveThroughput { endpoint, size } => {
                write!(f, "{} @ {}: throughput is not positive", endpoint, size)
            }
            Finding::NegativeDuration { endpoint, size, field, value } => {
                write!(f, "{} @ {}: {} is negative ({:.6}s)", endpoint, size, field, value)
            }
            Finding::FasterThanSmaller {
                endpoint,
                smaller,
                larger,
                smaller_seconds,
                larger_seconds,
            } => write!(
                f,
                "{}: {} took {:.4}s but smaller {} took {:.4}s",
                endpoint, larger, larger_seconds, smaller, smaller_seconds
            ),
        }
    }
}

fn check_trial(endpoint: &str, size: &str, metrics: &EndpointMetrics, findings: &mut Vec<Finding>) {
    if metrics.file_size_bytes > 0 && metrics.total_throughput_mbps <= 0.0 {
        findings.push(Finding::NonPositiveThroughput {
            endpoint: endpoint.to_string(),
            size: size.to_string(),
        });
    }

    let durations = [
        ("handler_duration_seconds", metrics.handler_duration_seconds),
        ("total_duration_seconds", metrics.total_duration_seconds),
        ("client_duration", metrics.client_duration),
    ];
    for (field, value) in durations {
        if value < 0.0 {
            findings.push(Finding::NegativeDuration {
                endpoint: endpoint.to_string(),
                size: size.to_string(),
                field,
                value,
            });
        }
    }
}

/// Check every successful trial of `run`.
///
/// Each trial's total duration is compared with the slowest smaller size of
/// the same endpoint; a larger file may be faster by at most
/// `tolerance_seconds`.
pub fn check_run(run: &BenchmarkRun, tolerance_seconds: f64) -> Vec<Finding> {
    let mut findings = Vec::new();

    for endpoint in run.endpoint_names() {
        let mut slowest: Option<(&str, f64)> = None;

        for test in &run.test_files {
            let Some(metrics) = test.results.get(&endpoint) else {
                continue;
            };
            check_trial(&endpoint, &test.file_size_label, metrics, &mut findings);

            let duration = metrics.total_duration_seconds;
            match slowest {
                Some((smaller, smaller_seconds)) if duration + tolerance_seconds < smaller_seconds => {
                    findings.push(Finding::FasterThanSmaller {
                        endpoint: endpoint.clone(),
                        smaller: smaller.to_string(),
                        larger: test.file_size_label.clone(),
                        smaller_seconds,
                        larger_seconds: duration,
                    });
                }
                Some((_, smaller_seconds)) if smaller_seconds >= duration => {}
                _ => slowest = Some((&test.file_size_label, duration)),
            }
        }
    }

    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use upload_bench_core::{Endpoint, FileSize, FileSizeTest, ServerResponse};

    fn trial(endpoint: Endpoint, bytes: u64, total: f64) -> EndpointMetrics {
        let response = ServerResponse::new(endpoint, bytes, total / 2.0, 10.0, 10.0);
        EndpointMetrics::from_response(&response, total, 0.0, total)
    }

    fn run(durations: &[(u64, Option<f64>)]) -> BenchmarkRun {
        let tests = durations
            .iter()
            .map(|(bytes, total)| FileSizeTest {
                file_size_label: FileSize::label_for(*bytes),
                file_size_bytes: *bytes,
                results: total
                    .map(|t| ("async-stream".to_string(), trial(Endpoint::AsyncStream, *bytes, t)))
                    .into_iter()
                    .collect(),
            })
            .collect();
        BenchmarkRun::new(tests, &[Endpoint::AsyncStream])
    }

    #[test]
    fn test_monotonic_run_is_clean() {
        let run = run(&[(1024, Some(0.01)), (2048, Some(0.02)), (4096, Some(0.02))]);
        assert!(check_run(&run, 0.0).is_empty());
    }

    #[test]
    fn test_faster_larger_file_is_flagged() {
        let run = run(&[(1024, Some(0.05)), (2048, Some(0.01))]);
        let findings = check_run(&run, 0.0);

        assert_eq!(findings.len(), 1);
        assert!(matches!(
            &findings[0],
            Finding::FasterThanSmaller { smaller, larger, .. } if smaller == "1KB" && larger == "2KB"
        ));
        assert!(findings[0].to_string().contains("async-stream"));
    }

    #[test]
    fn test_tolerance_absorbs_jitter() {
        let run = run(&[(1024, Some(0.05)), (2048, Some(0.01))]);
        assert!(check_run(&run, 0.1).is_empty());
    }

    #[test]
    fn test_gaps_compare_with_last_successful_size() {
        let run = run(&[(1024, Some(0.05)), (2048, None), (4096, Some(0.01))]);
        let findings = check_run(&run, 0.0);
        assert!(matches!(
            &findings[0],
            Finding::FasterThanSmaller { smaller, larger, .. } if smaller == "1KB" && larger == "4KB"
        ));
    }

    #[test]
    fn test_regression_against_any_smaller_size() {
        let run = run(&[(1024, Some(0.05)), (2048, Some(0.02)), (4096, Some(0.04))]);
        let findings = check_run(&run, 0.0);

        assert_eq!(findings.len(), 2);
        assert!(matches!(
            &findings[1],
            Finding::FasterThanSmaller { smaller, larger, .. } if smaller == "1KB" && larger == "4KB"
        ));
    }

    #[test]
    fn test_slowest_smaller_size_moves_forward() {
        let run = run(&[(1024, Some(0.01)), (2048, Some(0.05)), (4096, Some(0.03))]);
        let findings = check_run(&run, 0.0);

        assert_eq!(findings.len(), 1);
        assert!(matches!(
            &findings[0],
            Finding::FasterThanSmaller { smaller, larger, .. } if smaller == "2KB" && larger == "4KB"
        ));
    }

    #[test]
    fn test_bad_trial_values() {
        let mut run = run(&[(1024, Some(0.0))]);
        run.test_files[0].results.get_mut("async-stream").unwrap().client_duration = -1.0;
        let findings = check_run(&run, 0.0);

        assert!(findings.contains(&Finding::NonPositiveThroughput {
            endpoint: "async-stream".to_string(),
            size: "1KB".to_string(),
        }));
        assert!(findings
            .iter()
            .any(|f| matches!(f, Finding::NegativeDuration { field: "client_duration", .. })));
    }
}
