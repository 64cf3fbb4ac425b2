//! photoshelf archives a blog's photo feed and mirrors its images.
//!
//! `sync` walks the feed API page by page and persists each raw response
//! under a per-blog cache directory, resuming past runs by post id. `fetch`
//! reads those cached pages back and downloads every photo variant into a
//! tag-bucketed directory tree, logging posts that could not be completed.

mod cache;
mod cli;
mod config;
mod feed;
mod media;
mod model;
mod sink;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cache::CacheStore;
use crate::cli::{Cli, Command};
use crate::config::{FetchConfig, SyncConfig};
use crate::feed::{CacheReplaySource, FeedClient, NetworkSource, PageSource};
use crate::feed::sync::{write_tag_vocabulary, Synchronizer};
use crate::sink::FileFailureSink;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.as_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Command::Sync(args) => run_sync(SyncConfig::from_args(args)).await,
        Command::Fetch(args) => run_fetch(FetchConfig::from_args(args)).await,
    }
}

async fn run_sync(config: SyncConfig) -> Result<()> {
    info!("starting sync: {config}");

    let store = CacheStore::new(config.cache_dir.clone());
    let source: Box<dyn PageSource> = if config.use_cache {
        Box::new(CacheReplaySource::new(store.clone()))
    } else {
        let client = FeedClient::new(config.feed_base.clone(), config.api_key.clone())?;
        Box::new(NetworkSource::new(client, config.blog_host.clone(), store.clone()))
    };

    let summary = Synchronizer::new(source.as_ref(), &store, config.max_posts)
        .run()
        .await?;
    info!(
        "sync finished: {} pages, {} posts seen (cursor {}, total {})",
        summary.pages_fetched, summary.posts_seen, summary.cursor, summary.total_posts
    );

    let tags_path = write_tag_vocabulary(&store)?;
    info!("tag vocabulary written to {}", tags_path.display());

    Ok(())
}

async fn run_fetch(config: FetchConfig) -> Result<()> {
    let sink = FileFailureSink::new(config.failure_log.clone());
    let summary = media::run(&config, &sink).await?;
    info!(
        "fetch finished: {} pages, {} posts, {} variants downloaded, {} posts failed",
        summary.files_processed,
        summary.posts_seen,
        summary.variants_downloaded,
        summary.failed_posts
    );
    Ok(())
}
