//! Error types for the feed synchronizer.

use thiserror::Error;

use crate::cache::CacheError;

/// Errors raised while driving the remote feed.
///
/// All of these are fatal to the current sync run. Pages already written to
/// the cache stay valid for the next resume attempt: the cache is additive
/// and immutable, so no rollback is needed.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network failure or timeout fetching a feed page.
    #[error("feed request at offset {offset} failed: {source}")]
    Transport {
        offset: u64,
        source: reqwest::Error,
    },

    /// The feed answered with a non-success status.
    #[error("feed returned HTTP {status} at offset {offset}")]
    Status { offset: u64, status: u16 },

    /// A freshly fetched or replayed page does not parse as a feed page.
    #[error("feed page at offset {offset} is malformed: {source}")]
    MalformedPage {
        offset: u64,
        source: serde_json::Error,
    },

    /// The cache could not be written or read.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
