//! Incremental feed synchronization.
//!
//! Pages are pulled strictly one at a time: the stop decision depends on
//! processing pages in feed order. The resume cursor is the highest post id
//! already in the cache; the upstream feed returns posts newest-first, so
//! the first page whose maximum id does not exceed the cursor means nothing
//! newer remains and the crawl halts.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::cache::{CacheError, CacheStore};
use crate::feed::{PageSource, SyncError};

/// Outcome of one synchronization run.
#[derive(Debug, PartialEq, Eq)]
pub struct SyncSummary {
    /// Pages fetched (and, in live mode, persisted) during this run.
    pub pages_fetched: u64,
    /// Post entries observed across those pages, duplicates included.
    pub posts_seen: u64,
    /// Resume cursor computed from the cache before the run started.
    pub cursor: u64,
    /// Effective post total: the client-supplied cap, or the feed-reported
    /// blog post count from the first page.
    pub total_posts: u64,
}

pub struct Synchronizer<'a> {
    source: &'a dyn PageSource,
    store: &'a CacheStore,
    max_posts: Option<u64>,
}

impl<'a> Synchronizer<'a> {
    pub fn new(source: &'a dyn PageSource, store: &'a CacheStore, max_posts: Option<u64>) -> Self {
        Self {
            source,
            store,
            max_posts,
        }
    }

    /// Drive pagination until the declared total is reached, the feed is
    /// exhausted, or no post newer than the cursor appears, whichever halts
    /// progress first. Every fetched page is durable before it is inspected.
    pub async fn run(&self) -> Result<SyncSummary, SyncError> {
        let cursor = self.store.max_post_id()?;
        debug!(cursor, "resume cursor computed from cache");

        let mut offset: u64 = 0;
        let mut pages_fetched: u64 = 0;
        let mut posts_seen: u64 = 0;

        let mut page = self.source.fetch_page(offset).await?;
        pages_fetched += 1;
        let total_posts = self.max_posts.unwrap_or(page.response.blog.posts);

        loop {
            info!("{}/{}", offset, total_posts);
            let count = page.post_count() as u64;
            if count == 0 {
                debug!(offset, "feed exhausted");
                break;
            }
            posts_seen += count;

            if cursor > 0 && page.max_post_id() <= cursor {
                debug!(
                    cursor,
                    page_max = page.max_post_id(),
                    "no posts newer than cursor, stopping"
                );
                break;
            }

            offset += count;
            if offset >= total_posts {
                break;
            }
            page = self.source.fetch_page(offset).await?;
            pages_fetched += 1;
        }

        Ok(SyncSummary {
            pages_fetched,
            posts_seen,
            cursor,
            total_posts,
        })
    }
}

/// Write the sorted, deduplicated, lowercased tag vocabulary of every cached
/// post to `tags.txt` in the blog's cache directory.
pub fn write_tag_vocabulary(store: &CacheStore) -> Result<PathBuf, CacheError> {
    let mut tags: BTreeSet<String> = BTreeSet::new();
    for page in store.scan_pages()? {
        for (_, post) in page.posts() {
            if let Ok(post) = post {
                tags.extend(post.tags.iter().map(|t| t.to_lowercase()));
            }
        }
    }

    let mut out = String::new();
    for tag in &tags {
        out.push_str(tag);
        out.push('\n');
    }

    let path = store.dir().join("tags.txt");
    std::fs::write(&path, out).map_err(|source| CacheError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
