//! Error types for the page cache.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by [`super::CacheStore`].
///
/// Only storage-level failures surface as errors; a cached page that fails
/// to parse is logged and skipped during scans, so one corrupt file cannot
/// block resume computation from the rest of the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// The per-blog cache directory could not be created.
    #[error("failed to create cache directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A page body could not be written.
    #[error("failed to write cache page {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The cache directory could not be enumerated.
    #[error("failed to read cache directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A page requested by key does not exist (cache-replay mode).
    #[error("cache page {path} not found")]
    PageNotFound { path: PathBuf },

    /// A page requested by key could not be read back.
    #[error("failed to read cache page {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}
