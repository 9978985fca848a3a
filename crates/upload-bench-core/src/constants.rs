// Constants for the upload benchmark

/// Read size used by the chunked handlers (0.25 MiB).
///
/// Matches the typical chunk size a streamed request body is delivered in, so
/// the chunked strategies and the raw stream strategy do comparable work.
pub const CHUNK_SIZE: usize = 256 * 1024;

/// Bytes a spooled upload keeps in memory before rolling over to disk
pub const SPOOL_MAX_BYTES: usize = 1024 * 1024;

/// Default request body limit for the upload routes (2 GiB)
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024 * 1024;

/// Multipart field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Common prefix of all upload routes
pub const ENDPOINT_PREFIX: &str = "/upload/";

/// Response header with the total in-server request duration (seconds)
pub const TOTAL_DURATION_HEADER: &str = "x-total-duration";

/// Response header with the RSS delta across the whole request (MiB)
pub const TOTAL_MEMORY_DELTA_HEADER: &str = "x-total-memory-delta";

/// Bytes per mebibyte
pub const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Smallest test file generated by default (1 KiB)
pub const DEFAULT_MIN_SIZE_BYTES: u64 = 1024;

/// Largest test file generated by default (1 GiB)
pub const DEFAULT_MAX_SIZE_BYTES: u64 = 1024 * 1024 * 1024;

/// Files at or above this size are included in the large file plot (128 MiB)
pub const LARGE_FILE_THRESHOLD_BYTES: u64 = 128 * 1024 * 1024;
