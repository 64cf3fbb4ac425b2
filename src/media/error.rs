//! Error types for the media fetcher.

use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single variant download. Scoped to one work item; it never
/// escapes the post it belongs to.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Network failure or timeout fetching the variant body.
    #[error("request for {url} failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The media host answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// The received body could not be written to its destination.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Aggregated post-level failure: at least one variant download failed, or
/// the post entry itself was malformed. Carries what the failure sink needs;
/// the batch continues past it.
#[derive(Error, Debug, Clone)]
#[error("post {post_id} failed: {cause}")]
pub struct PostFailure {
    pub post_id: u64,
    pub tags: Vec<String>,
    pub cause: String,
}
