//! Image entry ordering and sequential renaming rules.
//!
//! This module implements the in-archive page ordering (numeric stems first,
//! then alphabetic) and the zero-padded naming scheme applied to every output
//! archive.

use std::cmp::Ordering;
use std::path::Path;

use rayon::prelude::*;

/// Image entry extensions recognized inside CBZ archives.
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Returns the lowercase extension of an archive entry, if any.
pub fn entry_extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Whether an archive entry name looks like a page image.
pub fn is_image_entry(name: &str) -> bool {
    entry_extension(name)
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Parses the file stem of an entry as an integer, e.g. "007.jpg" -> 7.
fn numeric_stem(name: &str) -> Option<u64> {
    Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.parse::<u64>().ok())
}

/// Ordering for page entries: numeric stems sort first (numerically),
/// everything else follows alphabetically.
pub fn compare_entries(a: &str, b: &str) -> Ordering {
    match (numeric_stem(a), numeric_stem(b)) {
        (Some(an), Some(bn)) => an.cmp(&bn),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Filters an archive's entry names down to page images, in reading order.
pub fn filter_and_sort_entries(names: Vec<String>) -> Vec<String> {
    let mut images: Vec<String> = names.into_iter().filter(|n| is_image_entry(n)).collect();
    images.par_sort_by(|a, b| compare_entries(a, b));
    images
}

/// Padding width for sequential page names: the digit count of the total
/// entry count of the output archive (cover included).
pub fn padding_width(total_entries: usize) -> usize {
    total_entries.max(1).to_string().len()
}

/// Builds a zero-padded page name, e.g. `page_name(3, 3, "jpg")` -> "003.jpg".
pub fn page_name(index: usize, width: usize, extension: &str) -> String {
    format!("{index:0width$}.{extension}")
}
