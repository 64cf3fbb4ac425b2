//! Destination path computation.
//!
//! Layout: `<output_root>/<tag_bucket>/<resolution_label>/<post_id><ext>`.
//! Paths are a pure function of the post's first tag, the variant's
//! resolution label and the post id, so repeated runs land on the same
//! files and the existence check doubles as the dedup mechanism.

use std::path::{Path, PathBuf};

/// Fallback extension when the source URL carries none.
const DEFAULT_EXTENSION: &str = ".jpg";

/// Destination subdirectory derived from a post's first tag:
/// `"untagged"` for tagless posts, else `<first char>/<tag>` lowercased.
pub fn tag_bucket(tags: &[String]) -> String {
    match tags.first() {
        None => "untagged".to_string(),
        Some(tag) => {
            let tag = tag.to_lowercase();
            match tag.chars().next() {
                Some(first) => format!("{first}/{tag}"),
                None => "untagged".to_string(),
            }
        }
    }
}

/// Extension of the URL's final path segment including the dot, or `.jpg`
/// when the segment has none.
pub fn file_extension(url: &str) -> &str {
    let segment = url.rsplit('/').next().unwrap_or(url);
    match segment.rfind('.') {
        Some(dot) if dot + 1 < segment.len() => &segment[dot..],
        _ => DEFAULT_EXTENSION,
    }
}

/// Full destination path for one variant of one post.
pub fn destination_path(
    output_root: &Path,
    tags: &[String],
    resolution_label: &str,
    post_id: u64,
    url: &str,
) -> PathBuf {
    let mut path = output_root.to_path_buf();
    for component in tag_bucket(tags).split('/') {
        path.push(component);
    }
    path.push(resolution_label);
    path.push(format!("{}{}", post_id, file_extension(url)));
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_bucket_untagged() {
        assert_eq!(tag_bucket(&[]), "untagged");
    }

    #[test]
    fn test_tag_bucket_first_tag_lowercased() {
        assert_eq!(tag_bucket(&tags(&["Landscape", "sea"])), "l/landscape");
        assert_eq!(tag_bucket(&tags(&["sea"])), "s/sea");
    }

    #[test]
    fn test_tag_bucket_empty_string_tag() {
        assert_eq!(tag_bucket(&tags(&[""])), "untagged");
    }

    #[test]
    fn test_file_extension_from_url() {
        assert_eq!(file_extension("https://x.example/media/abc_500.jpg"), ".jpg");
        assert_eq!(file_extension("https://x.example/media/abc.png"), ".png");
    }

    #[test]
    fn test_file_extension_defaults_to_jpg() {
        assert_eq!(file_extension("https://x.example/media/abc"), ".jpg");
        // A dot elsewhere in the URL must not count as an extension.
        assert_eq!(file_extension("https://x.example/raw"), ".jpg");
    }

    #[test]
    fn test_file_extension_trailing_dot() {
        assert_eq!(file_extension("https://x.example/media/abc."), ".jpg");
    }

    #[test]
    fn test_destination_path_layout() {
        let p = destination_path(
            Path::new("/out"),
            &tags(&["Sea"]),
            "500",
            42,
            "https://x.example/m/42_500.jpg",
        );
        assert_eq!(p, PathBuf::from("/out/s/sea/500/42.jpg"));
    }

    #[test]
    fn test_destination_path_untagged_unknown_width() {
        let p = destination_path(
            Path::new("/out"),
            &[],
            "unknown_width",
            7,
            "https://x.example/m/raw",
        );
        assert_eq!(p, PathBuf::from("/out/untagged/unknown_width/7.jpg"));
    }
}
