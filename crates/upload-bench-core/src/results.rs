//! Results file persistence
//!
//! The results file holds a JSON array of runs. Each client invocation appends
//! exactly one run; reporting only reads.

use std::path::Path;
use tracing::debug;

use crate::types::{BenchmarkHistory, BenchmarkRun, Result};

/// Load the run history, treating a missing file as empty
pub fn load_history(path: impl AsRef<Path>) -> Result<BenchmarkHistory> {
    let path = path.as_ref();
    if !path.exists() {
        debug!("No results file at {}, starting empty history", path.display());
        return Ok(BenchmarkHistory::default());
    }

    let contents = std::fs::read_to_string(path)?;
    let history: BenchmarkHistory = serde_json::from_str(&contents)?;
    Ok(history)
}

/// Append a run to the history file, creating it if needed
pub fn save_run(path: impl AsRef<Path>, run: BenchmarkRun) -> Result<BenchmarkHistory> {
    let path = path.as_ref();
    let mut history = load_history(path)?;
    history.add_run(run);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&history)?;
    std::fs::write(path, json)?;

    debug!("Saved run to {} ({} runs total)", path.display(), history.runs.len());
    Ok(history)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Endpoint, Error};

    #[test]
    fn test_missing_file_is_empty_history() {
        let dir = tempfile::tempdir().unwrap();
        let history = load_history(dir.path().join("absent.json")).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn test_runs_are_appended() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        save_run(&path, BenchmarkRun::new(Vec::new(), &[Endpoint::SyncFile])).unwrap();
        let history = save_run(&path, BenchmarkRun::new(Vec::new(), &Endpoint::all())).unwrap();
        assert_eq!(history.runs.len(), 2);

        let reloaded = load_history(&path).unwrap();
        assert_eq!(reloaded, history);
        assert_eq!(reloaded.latest().unwrap().endpoints.len(), 5);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with('['));
        assert!(raw.contains("\n  {"));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(load_history(&path), Err(Error::Json(_))));
    }
}
