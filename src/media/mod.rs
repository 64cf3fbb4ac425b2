//! Media fetch engine: walks the cached page files, resolves each post's
//! missing variants and downloads them, recording per-post failures without
//! ever aborting the batch. Posts are processed one at a time; concurrency
//! lives inside a post (one task per missing variant), which bounds fan-out
//! to a single post's variant count.

pub mod error;
pub mod fetch;
pub mod paths;
pub mod variants;

use std::io::IsTerminal;
use std::time::Duration;

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tracing::{debug, info};

use crate::cache;
use crate::config::FetchConfig;
use crate::media::error::PostFailure;
use crate::model::Post;
use crate::sink::{FailureRecord, FailureSink};

/// Connect timeout for variant requests. Mandatory, so one stuck variant
/// cannot stall its whole post.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Total per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// End-of-run accounting.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub files_processed: usize,
    pub posts_seen: usize,
    pub variants_downloaded: usize,
    pub failed_posts: usize,
}

/// Create a progress bar over the page files. Hidden when the user asked for
/// quiet output or stdout is not a TTY (piped output, cron jobs).
fn create_progress_bar(no_progress_bar: bool, total: u64) -> ProgressBar {
    if no_progress_bar || !std::io::stdout().is_terminal() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .expect("valid template")
        .progress_chars("=> "),
    );
    pb
}

/// Process every page file under the configured json directory.
pub async fn run(config: &FetchConfig, sink: &dyn FailureSink) -> Result<FetchSummary> {
    let client = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let pages = cache::scan_dir(&config.json_dir)?;
    let pb = create_progress_bar(config.no_progress_bar, pages.len() as u64);

    let mut summary = FetchSummary::default();
    for (file_name, page) in pages {
        pb.set_message(file_name.clone());
        summary.files_processed += 1;

        for (raw_id, post) in page.posts() {
            summary.posts_seen += 1;
            let outcome = match post {
                Err(e) => Err(PostFailure {
                    post_id: raw_id,
                    tags: Vec::new(),
                    cause: e.to_string(),
                }),
                Ok(post) => process_post(&client, &post, config, &pb).await,
            };
            match outcome {
                Ok(downloaded) => summary.variants_downloaded += downloaded,
                Err(failure) => {
                    summary.failed_posts += 1;
                    pb.suspend(|| {
                        tracing::error!(
                            "post {} in {} failed: {}",
                            failure.post_id,
                            file_name,
                            failure.cause
                        );
                    });
                    sink.record(&FailureRecord {
                        post_id: failure.post_id,
                        tags: failure.tags,
                        source_file: file_name.clone(),
                        cause: failure.cause,
                    });
                }
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    info!(
        "{} variants downloaded, {} posts failed, {} posts across {} files",
        summary.variants_downloaded, summary.failed_posts, summary.posts_seen,
        summary.files_processed,
    );
    Ok(summary)
}

/// Resolve and download one post's missing variants. An empty photo list is
/// a per-post failure; an empty work-item list means everything is already
/// on disk.
async fn process_post(
    client: &Client,
    post: &Post,
    config: &FetchConfig,
    pb: &ProgressBar,
) -> Result<usize, PostFailure> {
    let Some(set) = post.photos.first() else {
        return Err(PostFailure {
            post_id: post.id,
            tags: post.tags.clone(),
            cause: "post has no photos".to_string(),
        });
    };

    let items = variants::work_items(post, set, &config.output_dir, config.overwrite);
    if items.is_empty() {
        debug!("post {} already complete, skipping", post.id);
        return Ok(0);
    }

    pb.suspend(|| {
        info!(
            "downloading {} variants of post {} for {}",
            items.len(),
            post.id,
            post.tags.first().map(String::as_str).unwrap_or("untagged"),
        );
    });
    fetch::download_post(client, post.id, &post.tags, &items).await
}
