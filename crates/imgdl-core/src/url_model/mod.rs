//! URL resolution and filename derivation.
//!
//! References found in a page are resolved against the page URL, and the
//! local filename of a remote image is derived from the last path segment of
//! its URL, sanitized for the local filesystem.

mod path;
mod sanitize;

use thiserror::Error;
use url::Url;

pub use path::{filename_from_url_path, reference_extension, split_extension};
pub use sanitize::{fit_name, sanitize_filename, truncate_bytes, NAME_MAX};

/// Stem used when a URL has no usable final path segment.
const DEFAULT_STEM: &str = "image";

#[derive(Debug, Error)]
pub enum UrlError {
    #[error("invalid base URL {url:?}: {source}")]
    Base {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid reference {reference:?}: {source}")]
    Reference {
        reference: String,
        #[source]
        source: url::ParseError,
    },
}

/// Resolves `reference` against `base`.
///
/// - Absolute references (with a scheme) are returned unchanged.
/// - Scheme-relative references (`//host/path`) get `https`.
/// - Everything else is resolved per RFC 3986 against `base`.
pub fn resolve_url(base: &str, reference: &str) -> Result<String, UrlError> {
    match Url::parse(reference) {
        Ok(_) => return Ok(reference.to_string()),
        Err(url::ParseError::RelativeUrlWithoutBase) => {}
        Err(source) => {
            return Err(UrlError::Reference {
                reference: reference.to_string(),
                source,
            })
        }
    }

    if reference.trim_start().starts_with("//") {
        let https = format!("https:{}", reference.trim_start());
        return Url::parse(&https)
            .map(String::from)
            .map_err(|source| UrlError::Reference {
                reference: reference.to_string(),
                source,
            });
    }

    let base_url = Url::parse(base).map_err(|source| UrlError::Base {
        url: base.to_string(),
        source,
    })?;
    base_url
        .join(reference)
        .map(String::from)
        .map_err(|source| UrlError::Reference {
            reference: reference.to_string(),
            source,
        })
}

/// Derives the local filename for a remote image.
///
/// Uses the last path segment of `url`; when that segment has no extension
/// and `extension_hint` is non-empty, `.<hint>` is appended. The result never
/// exceeds [`NAME_MAX`] bytes.
///
/// # Examples
///
/// - `derive_filename("https://example.com/a/cat.png", "")` → `"cat.png"`
/// - `derive_filename("https://example.com/avatar", "jpg")` → `"avatar.jpg"`
/// - `derive_filename("https://example.com/", "gif")` → `"image.gif"`
pub fn derive_filename(url: &str, extension_hint: &str) -> String {
    let name = filename_from_url_path(url)
        .map(|raw| sanitize_filename(&raw))
        .filter(|s| !s.is_empty() && s != "." && s != "..")
        .unwrap_or_else(|| DEFAULT_STEM.to_string());

    if !extension_hint.is_empty() && split_extension(&name).is_none() {
        fit_name(&name, &format!(".{}", extension_hint))
    } else {
        name
    }
}
