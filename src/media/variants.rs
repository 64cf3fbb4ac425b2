//! Variant resolution: from one post's photo set to the list of
//! (url, resolution label, destination) work items worth downloading.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::media::paths;
use crate::model::{PhotoSet, PhotoVariant, Post};

/// Width buckets the source pre-renders, ascending. A variant with no width
/// hint in its URL is labeled with the smallest bucket that covers its
/// declared width.
const RESOLUTION_LADDER: [u32; 7] = [75, 100, 250, 400, 500, 540, 1280];

/// One (variant, destination) pair slated for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub url: String,
    pub resolution_label: String,
    pub dest: PathBuf,
}

/// The authoritative set of fetchable variants for a photo set: the
/// alternates plus the original, unless the original is already the first
/// alternate under another name.
pub fn effective_variants(set: &PhotoSet) -> Vec<&PhotoVariant> {
    let mut variants: Vec<&PhotoVariant> = set.alt_sizes.iter().collect();
    match set.alt_sizes.first() {
        Some(first) if first.url == set.original_size.url => {}
        _ => variants.push(&set.original_size),
    }
    variants
}

/// Resolution label for a variant.
///
/// The URL's last run of digits is trusted verbatim (the source encodes the
/// width in its filenames). Without one, the declared width is rounded up to
/// the ladder; a width above the ladder keeps its literal value so oversized
/// renditions never alias a ladder bucket. No URL digits and no width means
/// `"unknown_width"`.
pub fn resolution_label(variant: &PhotoVariant) -> String {
    if let Some(digits) = last_digit_run(&variant.url) {
        return digits.to_string();
    }
    match variant.width {
        Some(width) => RESOLUTION_LADDER
            .iter()
            .find(|&&bucket| bucket >= width)
            .map(|b| b.to_string())
            .unwrap_or_else(|| width.to_string()),
        None => "unknown_width".to_string(),
    }
}

/// Last maximal run of ASCII digits in `s`, if any.
fn last_digit_run(s: &str) -> Option<&str> {
    let bytes = s.as_bytes();
    let end = bytes.iter().rposition(|b| b.is_ascii_digit())? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);
    Some(&s[start..end])
}

/// Resolve the work items for one post's photo set, dropping items whose
/// destination already exists (unless `overwrite`). Two variants landing on
/// the same label share a destination; only the first is kept, since the
/// post's items download concurrently and must never race on one path. The
/// existence check makes repeated runs idempotent and cheap.
pub fn work_items(
    post: &Post,
    set: &PhotoSet,
    output_root: &Path,
    overwrite: bool,
) -> Vec<WorkItem> {
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    effective_variants(set)
        .into_iter()
        .filter_map(|variant| {
            let label = resolution_label(variant);
            let dest =
                paths::destination_path(output_root, &post.tags, &label, post.id, &variant.url);
            if !claimed.insert(dest.clone()) {
                return None;
            }
            if dest.exists() && !overwrite {
                return None;
            }
            Some(WorkItem {
                url: variant.url.clone(),
                resolution_label: label,
                dest,
            })
        })
        .collect()
}
