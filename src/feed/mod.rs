//! Remote feed access.
//!
//! [`FeedClient`] wraps the HTTP transport with mandatory connect and read
//! timeouts. [`PageSource`] is the seam between the pagination loop and
//! where pages actually come from: the network (with write-through to the
//! cache) or the cache itself in replay mode.

pub mod error;
pub mod sync;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub use error::SyncError;

use crate::cache::CacheStore;
use crate::model::CachedPage;

/// Connect timeout for feed page requests.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Total per-request timeout; an exceeded timeout surfaces as a normal
/// transport error.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client for the remote feed.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FeedClient {
    pub fn new(base_url: String, api_key: String) -> reqwest::Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            base_url,
            api_key,
        })
    }

    /// Fetch one raw feed page: `GET <base>/<blog>/posts/photo?api_key=..&offset=<n>`.
    pub async fn fetch_raw(&self, blog: &str, offset: u64) -> Result<Vec<u8>, SyncError> {
        let url = format!("{}/{}/posts/photo", self.base_url, blog);
        debug!(%url, offset, "fetching feed page");
        let offset_str = offset.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("offset", offset_str.as_str()),
            ])
            .send()
            .await
            .map_err(|source| SyncError::Transport { offset, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Status {
                offset,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| SyncError::Transport { offset, source })?;
        Ok(body.to_vec())
    }
}

/// Where the synchronizer's pages come from. Implementations must persist a
/// page before returning it when it was obtained from the network, so the
/// cache is always a complete log of everything the loop has seen.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, offset: u64) -> Result<CachedPage, SyncError>;
}

/// Live source: fetches from the feed and writes each page through to the
/// cache under a timestamp-and-offset key before it is used.
pub struct NetworkSource {
    client: FeedClient,
    blog: String,
    store: CacheStore,
}

impl NetworkSource {
    pub fn new(client: FeedClient, blog: String, store: CacheStore) -> Self {
        Self {
            client,
            blog,
            store,
        }
    }
}

#[async_trait]
impl PageSource for NetworkSource {
    async fn fetch_page(&self, offset: u64) -> Result<CachedPage, SyncError> {
        let bytes = self.client.fetch_raw(&self.blog, offset).await?;
        self.store.write_page(&page_key(offset), &bytes)?;
        CachedPage::parse(&bytes).map_err(|source| SyncError::MalformedPage { offset, source })
    }
}

/// Replay source: reads page `offset` back from the cache instead of the
/// network. Pages cached by offset-keyed runs replay exactly.
pub struct CacheReplaySource {
    store: CacheStore,
}

impl CacheReplaySource {
    pub fn new(store: CacheStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PageSource for CacheReplaySource {
    async fn fetch_page(&self, offset: u64) -> Result<CachedPage, SyncError> {
        let bytes = self.store.read_page(&offset.to_string())?;
        CachedPage::parse(&bytes).map_err(|source| SyncError::MalformedPage { offset, source })
    }
}

/// Cache key for a freshly fetched page: acquisition timestamp in
/// milliseconds, suffixed with the page offset. Offsets strictly increase
/// within a run, so two pages landing in the same millisecond still get
/// distinct keys and never overwrite each other.
fn page_key(offset: u64) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    format!("{millis}_{offset}")
}
