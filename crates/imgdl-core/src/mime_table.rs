//! Image media types and the file extensions they map to.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

/// Media type -> extensions. The first extension is the canonical one.
const IMAGE_TYPES: &[(&str, &[&str])] = &[
    ("image/apng", &["apng"]),
    ("image/avif", &["avif"]),
    ("image/bmp", &["bmp"]),
    ("image/gif", &["gif"]),
    ("image/heic", &["heic"]),
    ("image/heif", &["heif"]),
    ("image/jpeg", &["jpg", "jpeg", "jfif", "pjpeg", "pjp"]),
    ("image/jxl", &["jxl"]),
    ("image/png", &["png"]),
    ("image/svg+xml", &["svg"]),
    ("image/tiff", &["tif", "tiff"]),
    ("image/vnd.microsoft.icon", &["ico"]),
    ("image/webp", &["webp"]),
    ("image/x-icon", &["ico", "cur"]),
];

static MIME_TYPE_TO_EXT: LazyLock<HashMap<&'static str, &'static [&'static str]>> =
    LazyLock::new(|| IMAGE_TYPES.iter().copied().collect());

static IMAGE_EXTENSIONS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    IMAGE_TYPES
        .iter()
        .flat_map(|(_, exts)| exts.iter().copied())
        .collect()
});

/// Candidate extensions for a full media type (`image/png`), case-insensitive.
/// Parameters such as `; charset=utf-8` are ignored.
pub fn extensions_for(media_type: &str) -> Option<&'static [&'static str]> {
    let essence = media_type.split(';').next().unwrap_or("").trim();
    MIME_TYPE_TO_EXT
        .get(essence.to_ascii_lowercase().as_str())
        .copied()
}

/// Canonical extension for a media type.
pub fn preferred_extension(media_type: &str) -> Option<&'static str> {
    extensions_for(media_type).and_then(|exts| exts.first().copied())
}

/// Whether a bare extension (no leading dot) belongs to any image type.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(ext.to_ascii_lowercase().as_str())
}
