use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::config::DEFAULT_FEED_BASE;

#[derive(Parser, Debug)]
#[command(name = "photoshelf", about = "Archive a blog photo feed and fetch its images")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log verbosity when RUST_LOG is not set
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Synchronize the photo feed into the local page cache
    Sync(SyncArgs),
    /// Download image variants referenced by cached feed pages
    Fetch(FetchArgs),
}

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Blog host, e.g. "myblog" or "myblog.tumblr.com"
    #[arg(short = 'b', long)]
    pub blog_url: String,

    /// Feed API key
    #[arg(short = 'k', long, env = "PHOTOSHELF_API_KEY")]
    pub api_key: String,

    /// Replay pages from the cache instead of the network
    #[arg(short = 'c', long)]
    pub use_cache: bool,

    /// Stop after this many posts instead of the feed's reported total
    #[arg(short = 'm', long)]
    pub max_posts: Option<u64>,

    /// Parent directory for per-blog caches; defaults to the blog host
    #[arg(short = 'p', long)]
    pub prefix_cache: Option<PathBuf>,

    /// Base URL of the feed API
    #[arg(long, default_value = DEFAULT_FEED_BASE)]
    pub feed_base: String,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Directory of cached feed pages to read
    #[arg(short = 'j', long)]
    pub json_path: PathBuf,

    /// Root directory for downloaded images
    #[arg(short = 'o', long)]
    pub output_path: PathBuf,

    /// Re-download files that already exist on disk
    #[arg(long)]
    pub overwrite: bool,

    /// File that records posts whose downloads failed
    #[arg(long, default_value = "images.log")]
    pub failure_log: PathBuf,

    /// Disable the progress bar even on a terminal
    #[arg(long)]
    pub no_progress_bar: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn sync_args_parse() {
        let cli = Cli::try_parse_from([
            "photoshelf",
            "sync",
            "--blog-url",
            "myblog",
            "--api-key",
            "k",
            "--max-posts",
            "40",
        ])
        .unwrap();
        match cli.command {
            Command::Sync(args) => {
                assert_eq!(args.blog_url, "myblog");
                assert_eq!(args.max_posts, Some(40));
                assert!(!args.use_cache);
                assert_eq!(args.feed_base, DEFAULT_FEED_BASE);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn fetch_args_defaults() {
        let cli = Cli::try_parse_from([
            "photoshelf",
            "fetch",
            "-j",
            "cache/myblog",
            "-o",
            "images",
        ])
        .unwrap();
        match cli.command {
            Command::Fetch(args) => {
                assert_eq!(args.failure_log, PathBuf::from("images.log"));
                assert!(!args.overwrite);
                assert!(!args.no_progress_bar);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn api_key_is_required() {
        let err = Cli::try_parse_from(["photoshelf", "sync", "-b", "myblog"]);
        assert!(err.is_err());
    }
}
