//! # Upload Bench Client
//!
//! Generates test files, uploads each one to every endpoint in turn and
//! records the timings, then renders the recorded runs as tables and plots.

#![warn(missing_docs)]

/// Test file generation
pub mod files;

/// Single timed upload
pub mod uploader;

/// Sequential benchmark loop
pub mod runner;

/// Tables, plots and sanity checks over recorded runs
pub mod report;

pub use runner::BenchmarkRunner;
pub use uploader::{TrialResult, UploadOutcome, Uploader};
