//! Filesystem-safe filenames.

use super::path::split_extension;

/// Longest file name (in bytes) most filesystems accept.
pub const NAME_MAX: usize = 255;

/// Extensions longer than this are not worth preserving when a name is cut.
const KEEP_EXTENSION_MAX: usize = 16;

/// Makes a single path component safe to create in the download directory.
///
/// Path separators, NUL and control characters become `_`; leading and
/// trailing whitespace and dots are trimmed; the result is capped at
/// [`NAME_MAX`] bytes on a char boundary, keeping a short extension intact.
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = replaced.trim_matches(|c: char| c.is_whitespace() || c == '.');
    if trimmed.len() <= NAME_MAX {
        return trimmed.to_string();
    }
    match split_extension(trimmed) {
        Some((stem, ext)) if ext.len() <= KEEP_EXTENSION_MAX => fit_name(stem, &format!(".{ext}")),
        _ => truncate_bytes(trimmed, NAME_MAX).to_string(),
    }
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char boundary.
pub fn truncate_bytes(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut take = max;
    while !s.is_char_boundary(take) {
        take -= 1;
    }
    &s[..take]
}

/// `stem` + `suffix`, shortening `stem` so the whole name fits in [`NAME_MAX`] bytes.
pub fn fit_name(stem: &str, suffix: &str) -> String {
    let budget = NAME_MAX.saturating_sub(suffix.len());
    let stem = truncate_bytes(stem, budget).trim_end_matches(|c: char| c.is_whitespace() || c == '.');
    format!("{stem}{suffix}")
}
