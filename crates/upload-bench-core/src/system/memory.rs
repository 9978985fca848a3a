//! Resident set size sampling for the current process

use parking_lot::Mutex;
use sysinfo::{Pid, System};
use tracing::warn;

use crate::constants::BYTES_PER_MB;

/// Samples the RSS of the current process.
///
/// Holds one `sysinfo::System` and refreshes only this process on every
/// sample, so a sample costs a single read of the process status.
pub struct MemorySampler {
    system: Mutex<System>,
    pid: Option<Pid>,
}

impl MemorySampler {
    /// Create a sampler for the current process
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(e) => {
                warn!("Cannot determine current pid, memory samples will read 0: {}", e);
                None
            }
        };

        Self {
            system: Mutex::new(System::new()),
            pid,
        }
    }

    /// Current RSS in bytes, 0 when the process cannot be inspected
    pub fn rss_bytes(&self) -> u64 {
        let Some(pid) = self.pid else {
            return 0;
        };

        let mut system = self.system.lock();
        if !system.refresh_process(pid) {
            warn!("Process {} not found while sampling memory", pid);
            return 0;
        }
        system.process(pid).map(|process| process.memory()).unwrap_or(0)
    }

    /// Current RSS in MiB
    pub fn rss_mb(&self) -> f64 {
        self.rss_bytes() as f64 / BYTES_PER_MB
    }
}

impl Default for MemorySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemorySampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemorySampler").field("pid", &self.pid).finish()
    }
}
