//! Durable, append-only page cache.
//!
//! One JSON file per fetched feed page, under a per-blog directory. Files
//! are immutable once written: fresh fetches key pages by acquisition
//! timestamp in milliseconds plus the page offset, cache replay keys them
//! by pagination offset alone, so no file is ever overwritten, within a run
//! or across runs. The resume cursor is never
//! persisted separately; it is recomputed from the cache on demand, which
//! makes resume idempotent and crash-safe.

pub mod error;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

pub use error::CacheError;

use crate::model::CachedPage;

/// Page store bound to one blog's cache directory.
#[derive(Debug, Clone)]
pub struct CacheStore {
    dir: PathBuf,
}

impl CacheStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn page_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    /// Persist a raw page body under `key`. Creates the blog directory on
    /// first write. Storage failures are fatal for the current run.
    pub fn write_page(&self, key: &str, bytes: &[u8]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|source| CacheError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.page_path(key);
        fs::write(&path, bytes).map_err(|source| CacheError::Write { path, source })
    }

    /// Read one page back by key (cache-replay mode).
    pub fn read_page(&self, key: &str) -> Result<Vec<u8>, CacheError> {
        let path = self.page_path(key);
        if !path.exists() {
            return Err(CacheError::PageNotFound { path });
        }
        fs::read(&path).map_err(|source| CacheError::Read { path, source })
    }

    /// Parse every page file in the blog's directory. A page that fails to
    /// read or parse is warned about and skipped; a missing directory yields
    /// an empty scan.
    pub fn scan_pages(&self) -> Result<Vec<CachedPage>, CacheError> {
        Ok(scan_dir(&self.dir)?.into_iter().map(|(_, p)| p).collect())
    }

    /// Highest post id across every parseable post in every cached page.
    /// Returns 0 when the cache is empty or nothing parses.
    pub fn max_post_id(&self) -> Result<u64, CacheError> {
        Ok(self
            .scan_pages()?
            .iter()
            .map(CachedPage::max_post_id)
            .max()
            .unwrap_or(0))
    }
}

/// Enumerate and parse every `*.json` page in `dir`, sorted by file name.
/// Shared between the store and the media orchestrator, which reads page
/// files from an arbitrary `--json-path` directory.
pub fn scan_dir(dir: &Path) -> Result<Vec<(String, CachedPage)>, CacheError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(CacheError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut pages = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CacheError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                warn!("skipping unreadable cache page {}: {}", path.display(), e);
                continue;
            }
        };
        match CachedPage::parse(&bytes) {
            Ok(page) => pages.push((name, page)),
            Err(e) => {
                warn!("skipping corrupt cache page {}: {}", path.display(), e);
            }
        }
    }
    pages.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(pages)
}
