//! Reporting over recorded benchmark runs

/// Terminal tables
pub mod tables;

/// Large file plot
pub mod plot;

/// Statistical sanity checks
pub mod sanity;

pub use plot::{large_file_series, plot_large_files, PlotData};
pub use sanity::{check_run, Finding};
pub use tables::{memory_table, render_run, total_timing_table};
