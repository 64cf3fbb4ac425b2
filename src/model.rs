//! Typed records for the remote feed's JSON shape.
//!
//! The page envelope is schema-checked as a whole, but individual posts are
//! kept as raw values and converted one at a time with [`Post::from_value`],
//! so a single malformed post surfaces as a per-post error instead of
//! poisoning the page it arrived in.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    /// A post or photo entry is missing a required field.
    #[error("malformed post entry: {0}")]
    MissingField(#[from] serde_json::Error),
}

/// One fetchable rendition of a photo at some resolution.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PhotoVariant {
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// A photo with its original rendition and the smaller alternates the
/// source pre-rendered (largest first, by upstream convention).
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoSet {
    pub original_size: PhotoVariant,
    #[serde(default)]
    pub alt_sizes: Vec<PhotoVariant>,
}

/// A photo post. The remote contract carries exactly one [`PhotoSet`] per
/// post in practice; the model stays generic and consumers use `photos[0]`,
/// treating an empty list as a per-post failure.
#[derive(Debug, Clone, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub photos: Vec<PhotoSet>,
}

impl Post {
    /// Schema-checked conversion of one raw post entry.
    pub fn from_value(value: Value) -> Result<Self, ModelError> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlogInfo {
    /// Total post count the feed reports for the blog.
    pub posts: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedResponse {
    pub blog: BlogInfo,
    /// Raw post entries; convert each with [`Post::from_value`].
    #[serde(default)]
    pub posts: Vec<Value>,
}

/// One immutable page as written to and read back from the cache.
#[derive(Debug, Clone, Deserialize)]
pub struct CachedPage {
    pub response: FeedResponse,
}

impl CachedPage {
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Number of raw post entries on this page.
    pub fn post_count(&self) -> usize {
        self.response.posts.len()
    }

    /// Highest post id on this page, skipping entries without a numeric id.
    pub fn max_post_id(&self) -> u64 {
        self.response
            .posts
            .iter()
            .filter_map(|p| p.get("id").and_then(Value::as_u64))
            .max()
            .unwrap_or(0)
    }

    /// Typed posts, paired with the raw entry's best-effort id so callers
    /// can report failures for entries that do not convert.
    pub fn posts(&self) -> impl Iterator<Item = (u64, Result<Post, ModelError>)> + '_ {
        self.response.posts.iter().map(|raw| {
            let id = raw.get("id").and_then(Value::as_u64).unwrap_or(0);
            (id, Post::from_value(raw.clone()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(posts: Value) -> CachedPage {
        let body = json!({"response": {"blog": {"posts": 42}, "posts": posts}});
        CachedPage::parse(body.to_string().as_bytes()).unwrap()
    }

    #[test]
    fn test_parse_full_page() {
        let p = page(json!([{
            "id": 10,
            "tags": ["landscape", "Sea"],
            "photos": [{
                "original_size": {"url": "https://x/orig_1280.jpg", "width": 1280, "height": 720},
                "alt_sizes": [{"url": "https://x/a_500.jpg", "width": 500, "height": 281}]
            }]
        }]));
        assert_eq!(p.response.blog.posts, 42);
        assert_eq!(p.post_count(), 1);
        let (id, post) = p.posts().next().unwrap();
        let post = post.unwrap();
        assert_eq!(id, 10);
        assert_eq!(post.tags, vec!["landscape", "Sea"]);
        assert_eq!(post.photos[0].alt_sizes[0].width, Some(500));
    }

    #[test]
    fn test_missing_tags_and_photos_default_empty() {
        let p = page(json!([{"id": 3}]));
        let (_, post) = p.posts().next().unwrap();
        let post = post.unwrap();
        assert!(post.tags.is_empty());
        assert!(post.photos.is_empty());
    }

    #[test]
    fn test_malformed_post_is_per_entry_error() {
        let p = page(json!([
            {"id": 1, "photos": [{"original_size": {"url": "https://x/1.jpg"}}]},
            {"tags": ["no-id"]},
        ]));
        let results: Vec<_> = p.posts().collect();
        assert!(results[0].1.is_ok());
        assert_eq!(results[1].0, 0);
        assert!(matches!(results[1].1, Err(ModelError::MissingField(_))));
    }

    #[test]
    fn test_variant_without_dimensions() {
        let p = page(json!([{
            "id": 7,
            "photos": [{"original_size": {"url": "https://x/raw"}}]
        }]));
        let (_, post) = p.posts().next().unwrap();
        let post = post.unwrap();
        let v = &post.photos[0].original_size;
        assert_eq!(v.width, None);
        assert_eq!(v.height, None);
    }

    #[test]
    fn test_max_post_id_ignores_bad_entries() {
        let p = page(json!([{"id": 5}, {"tags": []}, {"id": 12}, {"id": 9}]));
        assert_eq!(p.max_post_id(), 12);
    }

    #[test]
    fn test_max_post_id_empty_page() {
        let p = page(json!([]));
        assert_eq!(p.max_post_id(), 0);
    }
}
