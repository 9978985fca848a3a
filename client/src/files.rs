//! Test file generation

use rand::RngCore;
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::debug;

use upload_bench_core::{FileSize, Result};

/// Write chunk used while generating random files (1 MiB)
const WRITE_CHUNK: usize = 1024 * 1024;

/// A test file ready for upload
#[derive(Debug, Clone)]
pub struct PreparedFile {
    /// Size and label of the file
    pub size: FileSize,
    /// Location on disk
    pub path: PathBuf,
    /// Whether an existing file of the right size was reused
    pub reused: bool,
}

/// Whether `path` exists with exactly `size_bytes` bytes
pub fn has_exact_size(path: &Path, size_bytes: u64) -> bool {
    fs::metadata(path).is_ok_and(|meta| meta.is_file() && meta.len() == size_bytes)
}

/// Generate a file of random bytes, or reuse one that already has the size
pub fn generate_test_file(dir: &Path, size_bytes: u64, filename: &str) -> Result<PreparedFile> {
    fs::create_dir_all(dir)?;
    let path = dir.join(filename);
    let size = FileSize::new(size_bytes);

    if has_exact_size(&path, size_bytes) {
        debug!("Reusing {}", path.display());
        return Ok(PreparedFile { size, path, reused: true });
    }

    let mut writer = BufWriter::new(File::create(&path)?);
    let mut rng = rand::rng();
    let mut chunk = vec![0u8; WRITE_CHUNK.min(size_bytes as usize)];
    let mut remaining = size_bytes;

    while remaining > 0 {
        let write_size = (remaining as usize).min(chunk.len());
        rng.fill_bytes(&mut chunk[..write_size]);
        writer.write_all(&chunk[..write_size])?;
        remaining -= write_size as u64;
    }
    writer.flush()?;

    debug!("Generated {} ({} bytes)", path.display(), size_bytes);
    Ok(PreparedFile { size, path, reused: false })
}

/// Progress of [`prepare_test_files`]
#[derive(Debug)]
pub enum FileProgress<'a> {
    /// About to generate or reuse this size
    Started(&'a FileSize),
    /// File is ready
    Finished(&'a PreparedFile),
}

/// Generate one file per ladder entry, named `test_<label>.bin`.
///
/// `progress` is called before and after each file.
pub fn prepare_test_files(
    dir: &Path,
    sizes: &[FileSize],
    mut progress: impl FnMut(FileProgress<'_>),
) -> Result<Vec<PreparedFile>> {
    let mut prepared = Vec::with_capacity(sizes.len());
    for size in sizes {
        progress(FileProgress::Started(size));
        let file = generate_test_file(dir, size.bytes, &size.file_name())?;
        progress(FileProgress::Finished(&file));
        prepared.push(file);
    }
    Ok(prepared)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_exact_size_across_chunks() {
        let dir = tempfile::tempdir().unwrap();
        let size = 2 * WRITE_CHUNK as u64 + 17;
        let prepared = generate_test_file(dir.path(), size, "odd.bin").unwrap();

        assert!(!prepared.reused);
        assert_eq!(fs::metadata(&prepared.path).unwrap().len(), size);
    }

    #[test]
    fn test_reuses_file_with_matching_size() {
        let dir = tempfile::tempdir().unwrap();
        let first = generate_test_file(dir.path(), 4096, "test_4KB.bin").unwrap();
        let contents = fs::read(&first.path).unwrap();

        let second = generate_test_file(dir.path(), 4096, "test_4KB.bin").unwrap();
        assert!(second.reused);
        assert_eq!(fs::read(&second.path).unwrap(), contents);
    }

    #[test]
    fn test_regenerates_file_with_wrong_size() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test_1KB.bin"), b"short").unwrap();

        let prepared = generate_test_file(dir.path(), 1024, "test_1KB.bin").unwrap();
        assert!(!prepared.reused);
        assert!(has_exact_size(&prepared.path, 1024));
    }

    #[test]
    fn test_prepare_reports_each_file_as_it_is_made() {
        let dir = tempfile::tempdir().unwrap();
        let sizes = FileSize::ladder(1024, 4096);
        let mut events = Vec::new();

        let prepared = prepare_test_files(&dir.path().join("files"), &sizes, |event| {
            events.push(match event {
                FileProgress::Started(size) => format!("start {}", size.label),
                FileProgress::Finished(file) => format!("done {}", file.path.file_name().unwrap().to_string_lossy()),
            })
        })
        .unwrap();

        assert_eq!(prepared.len(), 3);
        assert_eq!(
            events,
            vec![
                "start 1KB",
                "done test_1KB.bin",
                "start 2KB",
                "done test_2KB.bin",
                "start 4KB",
                "done test_4KB.bin",
            ]
        );
    }

    #[test]
    fn test_zero_byte_file() {
        let dir = tempfile::tempdir().unwrap();
        let prepared = generate_test_file(dir.path(), 0, "empty.bin").unwrap();
        assert!(has_exact_size(&prepared.path, 0));
    }
}
