//! Per-post concurrent variant downloads.
//!
//! Every missing variant of one post is fetched in parallel; the caller
//! waits for all of them before moving on, and any failure aggregates into
//! a single post-level error. Siblings are never cancelled: a started
//! fetch always runs to completion and its result is joined.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use futures_util::future::join_all;
use reqwest::Client;
use tracing::warn;

use crate::media::error::{FetchError, PostFailure};
use crate::media::variants::WorkItem;

/// `.part` sibling of the destination. Work items are unique per destination
/// within a post, so the name cannot collide with a concurrent sibling.
fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("download"));
    name.push(".part");
    dest.with_file_name(name)
}

/// Download one variant. The body is fully received, written to a `.part`
/// sibling, and renamed into place only once complete, so a failed or
/// interrupted write never leaves a partial file at the destination.
pub async fn download_variant(client: &Client, item: &WorkItem) -> Result<(), FetchError> {
    let response = client
        .get(&item.url)
        .send()
        .await
        .map_err(|source| FetchError::Http {
            url: item.url.clone(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: item.url.clone(),
            status: status.as_u16(),
        });
    }

    let body = response.bytes().await.map_err(|source| FetchError::Http {
        url: item.url.clone(),
        source,
    })?;

    if let Some(parent) = item.dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let part = part_path(&item.dest);
    if let Err(source) = tokio::fs::write(&part, &body).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(FetchError::Write { path: part, source });
    }
    tokio::fs::rename(&part, &item.dest)
        .await
        .map_err(|source| FetchError::Write {
            path: item.dest.clone(),
            source,
        })
}

/// Execute one post's work items concurrently. Returns the number of
/// variants written, or one aggregated failure carrying the first error.
/// Variants that succeeded alongside a failure stay on disk; the next run's
/// dedup simply skips them and retries only what is missing.
pub async fn download_post(
    client: &Client,
    post_id: u64,
    tags: &[String],
    items: &[WorkItem],
) -> Result<usize, PostFailure> {
    let results = join_all(items.iter().map(|item| download_variant(client, item))).await;

    let mut downloaded = 0usize;
    let mut first_error: Option<FetchError> = None;
    for (item, result) in items.iter().zip(results) {
        match result {
            Ok(()) => downloaded += 1,
            Err(e) => {
                warn!("variant {} of post {} failed: {}", item.url, post_id, e);
                first_error.get_or_insert(e);
            }
        }
    }

    match first_error {
        None => Ok(downloaded),
        Some(e) => Err(PostFailure {
            post_id,
            tags: tags.to_vec(),
            cause: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(server: &MockServer, route: &str, dest: std::path::PathBuf) -> WorkItem {
        WorkItem {
            url: format!("{}{}", server.uri(), route),
            resolution_label: "500".into(),
            dest,
        }
    }

    #[tokio::test]
    async fn test_download_variant_writes_full_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m/1_500.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg-bytes".to_vec()))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("s/sea/500/1.jpg");
        let client = Client::new();
        download_variant(&client, &item(&server, "/m/1_500.jpg", dest.clone()))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg-bytes");
        // The temp file was renamed away, leaving only the destination.
        let siblings = std::fs::read_dir(dest.parent().unwrap()).unwrap().count();
        assert_eq!(siblings, 1);
    }

    #[tokio::test]
    async fn test_download_variant_write_failure_leaves_no_destination() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;

        // A regular file where the destination directory should go makes
        // the write path fail after the body was received.
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("500"), b"in the way").unwrap();
        let dest = tmp.path().join("500/5.jpg");
        let client = Client::new();
        let err = download_variant(&client, &item(&server, "/m/5_500.jpg", dest.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Write { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_variant_failure_leaves_no_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("untagged/500/2.jpg");
        let client = Client::new();
        let err = download_variant(&client, &item(&server, "/m/2_500.jpg", dest.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_post_all_variants_written() {
        let server = MockServer::start().await;
        for route in ["/m/3_500.jpg", "/m/3_1280.jpg"] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
                .mount(&server)
                .await;
        }

        let tmp = TempDir::new().unwrap();
        let items = vec![
            item(&server, "/m/3_500.jpg", tmp.path().join("500/3.jpg")),
            item(&server, "/m/3_1280.jpg", tmp.path().join("1280/3.jpg")),
        ];
        let client = Client::new();
        let n = download_post(&client, 3, &[], &items).await.unwrap();
        assert_eq!(n, 2);
    }

    #[tokio::test]
    async fn test_download_post_aggregates_partial_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/m/4_500.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ok".to_vec()))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/m/4_1280.jpg"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let good = tmp.path().join("500/4.jpg");
        let items = vec![
            item(&server, "/m/4_500.jpg", good.clone()),
            item(&server, "/m/4_1280.jpg", tmp.path().join("1280/4.jpg")),
        ];
        let client = Client::new();
        let failure = download_post(&client, 4, &["sea".into()], &items)
            .await
            .unwrap_err();
        assert_eq!(failure.post_id, 4);
        assert_eq!(failure.tags, vec!["sea"]);
        assert!(failure.cause.contains("HTTP 500"));
        // The sibling that succeeded is not rolled back.
        assert!(good.exists());
    }
}
