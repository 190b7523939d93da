//! Path segments and extensions of URL references.

use std::borrow::Cow;

/// Extracts the last path segment from a URL, percent-decoded.
///
/// Returns `None` if the URL cannot be parsed or the path is empty/root.
pub fn filename_from_url_path(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    let decoded = urlencoding::decode(segment).unwrap_or(Cow::Borrowed(segment));
    if decoded.is_empty() || decoded == "." || decoded == ".." {
        return None;
    }
    Some(decoded.into_owned())
}

/// Splits `name` into `(stem, extension)` at the last dot. The extension must
/// be non-empty ASCII alphanumeric; otherwise there is no extension.
pub fn split_extension(name: &str) -> Option<(&str, &str)> {
    let (stem, ext) = name.rsplit_once('.')?;
    if ext.is_empty() || !ext.bytes().all(|b| b.is_ascii_alphanumeric()) {
        return None;
    }
    Some((stem, ext))
}

/// Lower-cased filename extension of a reference as written in markup
/// (absolute, scheme-relative or relative). Query, fragment and authority
/// are ignored, so `https://example.com` has no extension.
pub fn reference_extension(reference: &str) -> Option<String> {
    let path = reference_path(reference.trim());
    let segment = path.rsplit('/').next().unwrap_or(path);
    split_extension(segment).map(|(_, ext)| ext.to_ascii_lowercase())
}

fn reference_path(reference: &str) -> &str {
    let end = reference
        .find(|c| c == '?' || c == '#')
        .unwrap_or(reference.len());
    let without_query = &reference[..end];

    let after_authority = if let Some(rest) = without_query.strip_prefix("//") {
        Some(rest)
    } else {
        without_query.find("://").map(|i| &without_query[i + 3..])
    };

    match after_authority {
        Some(rest) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => without_query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal() {
        assert_eq!(
            filename_from_url_path("https://example.com/a/b/file.png").as_deref(),
            Some("file.png")
        );
        assert_eq!(
            filename_from_url_path("https://example.com/single").as_deref(),
            Some("single")
        );
    }

    #[test]
    fn root_or_empty() {
        assert_eq!(filename_from_url_path("https://example.com/"), None);
        assert_eq!(filename_from_url_path("https://example.com"), None);
        assert_eq!(filename_from_url_path("photo.png"), None);
    }

    #[test]
    fn with_query() {
        assert_eq!(
            filename_from_url_path("https://example.com/file.gif?token=abc").as_deref(),
            Some("file.gif")
        );
    }

    #[test]
    fn extension_of_relative_references() {
        assert_eq!(reference_extension("/img/Cat.PNG").as_deref(), Some("png"));
        assert_eq!(reference_extension("cat.jpg?w=10#top").as_deref(), Some("jpg"));
        assert_eq!(reference_extension("/doc.pdf").as_deref(), Some("pdf"));
        assert_eq!(reference_extension("photo"), None);
        assert_eq!(reference_extension("/dir.d/photo"), None);
        assert_eq!(reference_extension(""), None);
    }

    #[test]
    fn extension_ignores_authority() {
        assert_eq!(reference_extension("https://example.com"), None);
        assert_eq!(reference_extension("//cdn.example.com"), None);
        assert_eq!(
            reference_extension("//cdn.example.com/a.webp").as_deref(),
            Some("webp")
        );
        assert_eq!(
            reference_extension("https://example.com/a/b.gif").as_deref(),
            Some("gif")
        );
    }

    #[test]
    fn split_extension_requires_alphanumeric_suffix() {
        assert_eq!(split_extension("a.png"), Some(("a", "png")));
        assert_eq!(split_extension("a.tar.gz"), Some(("a.tar", "gz")));
        assert_eq!(split_extension("a."), None);
        assert_eq!(split_extension("a.p-g"), None);
        assert_eq!(split_extension("noext"), None);
    }
}
