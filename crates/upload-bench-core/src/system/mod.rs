//! Process-level measurement utilities

/// Resident set size sampling
pub mod memory;

pub use memory::MemorySampler;
