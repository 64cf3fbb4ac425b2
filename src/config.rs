use std::fmt;
use std::path::PathBuf;

use crate::cli::{FetchArgs, SyncArgs};

pub const DEFAULT_FEED_BASE: &str = "https://api.tumblr.com/v2/blog";

/// Appends the canonical host suffix when the argument is a bare blog name.
pub fn normalize_blog_host(blog: &str) -> String {
    if blog.contains('.') {
        blog.to_string()
    } else {
        format!("{blog}.tumblr.com")
    }
}

/// Resolved settings for a feed synchronization run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub blog_host: String,
    pub api_key: String,
    pub feed_base: String,
    pub cache_dir: PathBuf,
    pub use_cache: bool,
    pub max_posts: Option<u64>,
}

impl SyncConfig {
    pub fn from_args(args: SyncArgs) -> Self {
        let blog_host = normalize_blog_host(&args.blog_url);
        let cache_dir = match args.prefix_cache {
            Some(prefix) => prefix.join(&blog_host),
            None => PathBuf::from(&blog_host),
        };
        Self {
            blog_host,
            api_key: args.api_key,
            feed_base: args.feed_base,
            cache_dir,
            use_cache: args.use_cache,
            max_posts: args.max_posts,
        }
    }
}

// The api_key stays out of log output.
impl fmt::Display for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blog={} cache_dir={} use_cache={} max_posts={:?}",
            self.blog_host,
            self.cache_dir.display(),
            self.use_cache,
            self.max_posts
        )
    }
}

/// Resolved settings for a media fetch run.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub json_dir: PathBuf,
    pub output_dir: PathBuf,
    pub overwrite: bool,
    pub failure_log: PathBuf,
    pub no_progress_bar: bool,
}

impl FetchConfig {
    pub fn from_args(args: FetchArgs) -> Self {
        Self {
            json_dir: args.json_path,
            output_dir: args.output_path,
            overwrite: args.overwrite,
            failure_log: args.failure_log,
            no_progress_bar: args.no_progress_bar,
        }
    }
}
