//! Test file size ladder

use serde::{Deserialize, Serialize};

const KB: u64 = 1024;
const MB: u64 = 1024 * KB;
const GB: u64 = 1024 * MB;

/// A test file size with its display label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSize {
    /// Label such as `1KB`, `256MB` or `1GB`
    pub label: String,
    /// Size in bytes
    pub bytes: u64,
}

impl FileSize {
    /// Create a size, deriving its label
    pub fn new(bytes: u64) -> Self {
        Self {
            label: Self::label_for(bytes),
            bytes,
        }
    }

    /// Human label using binary units and integer division
    pub fn label_for(bytes: u64) -> String {
        if bytes < KB {
            format!("{}B", bytes)
        } else if bytes < MB {
            format!("{}KB", bytes / KB)
        } else if bytes < GB {
            format!("{}MB", bytes / MB)
        } else {
            format!("{}GB", bytes / GB)
        }
    }

    /// Sizes from `min` doubling up to `max` inclusive.
    ///
    /// Returns an empty ladder when `min` is zero or greater than `max`.
    pub fn ladder(min: u64, max: u64) -> Vec<FileSize> {
        let mut sizes = Vec::new();
        if min == 0 {
            return sizes;
        }
        let mut bytes = min;
        while bytes <= max {
            sizes.push(FileSize::new(bytes));
            bytes = match bytes.checked_mul(2) {
                Some(next) => next,
                None => break,
            };
        }
        sizes
    }

    /// Name of the generated file for this size
    pub fn file_name(&self) -> String {
        format!("test_{}.bin", self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{DEFAULT_MAX_SIZE_BYTES, DEFAULT_MIN_SIZE_BYTES};

    #[test]
    fn test_default_ladder() {
        let sizes = FileSize::ladder(DEFAULT_MIN_SIZE_BYTES, DEFAULT_MAX_SIZE_BYTES);
        assert_eq!(sizes.len(), 21);
        assert_eq!(sizes.first().unwrap().label, "1KB");
        assert_eq!(sizes[10].label, "1MB");
        assert_eq!(sizes.last().unwrap().label, "1GB");
        assert!(sizes.windows(2).all(|w| w[1].bytes == w[0].bytes * 2));
    }

    #[test]
    fn test_labels() {
        assert_eq!(FileSize::label_for(512), "512B");
        assert_eq!(FileSize::label_for(1536), "1KB");
        assert_eq!(FileSize::label_for(128 * MB), "128MB");
        assert_eq!(FileSize::label_for(2 * GB), "2GB");
    }

    #[test]
    fn test_degenerate_ladders() {
        assert!(FileSize::ladder(0, 1024).is_empty());
        assert!(FileSize::ladder(4096, 1024).is_empty());
        assert_eq!(FileSize::ladder(1024, 3000).len(), 2);
    }

    #[test]
    fn test_file_name() {
        assert_eq!(FileSize::new(64 * KB).file_name(), "test_64KB.bin");
    }
}
