//! Per-tag extractors.

use scraper::ElementRef;

use super::classify::{classify_data_uri, classify_reference, Leniency};
use super::{ExtractError, NormalizedContent, PayloadEncoding, SourceKind};
use crate::data_uri::has_data_scheme;
use crate::mime_table::{is_image_extension, preferred_extension};
use crate::url_model::reference_extension;

/// Longest data URI prefix quoted in error messages.
const QUOTE_MAX: usize = 64;

fn attr<'a>(element: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    element.value().attr(name)
}

/// Attribute value that must be present and non-empty.
fn required<'a>(
    element: &ElementRef<'a>,
    name: &'static str,
    kind: SourceKind,
) -> Result<&'a str, ExtractError> {
    match attr(element, name).map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ExtractError::MissingAttribute { attr: name, kind }),
    }
}

fn quote(s: &str) -> String {
    match s.char_indices().nth(QUOTE_MAX) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// `<a href>`: links to non-image targets are common and yield nothing.
pub(super) fn anchor(element: ElementRef<'_>) -> Result<Option<NormalizedContent>, ExtractError> {
    let href = attr(&element, "href").ok_or(ExtractError::MissingAttribute {
        attr: "href",
        kind: SourceKind::Anchor,
    })?;
    classify_reference(href.trim(), SourceKind::Anchor, Leniency::Strict)
}

/// `<img src>`: always an image, whatever its extension says.
pub(super) fn image(element: ElementRef<'_>) -> Result<Option<NormalizedContent>, ExtractError> {
    let src = required(&element, "src", SourceKind::Image)?;
    if has_data_scheme(src) {
        return match classify_data_uri(src, SourceKind::Image)? {
            Some(content) => Ok(Some(content)),
            None => Err(ExtractError::UnrecognizedInlineImage(quote(src))),
        };
    }
    match classify_reference(src, SourceKind::Image, Leniency::AssumeImage)? {
        Some(content) => Ok(Some(content)),
        None => {
            tracing::debug!(src, "extension not recognized as an image extension");
            Ok(Some(NormalizedContent::remote(SourceKind::Image, "", src)))
        }
    }
}

/// `<svg>`: the element's own markup is the image.
pub(super) fn vector_graphic(element: ElementRef<'_>) -> Result<NormalizedContent, ExtractError> {
    NormalizedContent::inline(
        SourceKind::VectorGraphic,
        PayloadEncoding::Markup,
        "svg",
        element.html(),
    )
}

/// `<iframe src>`: frames usually hold documents, so only clear images count.
pub(super) fn frame(element: ElementRef<'_>) -> Result<Option<NormalizedContent>, ExtractError> {
    let src = required(&element, "src", SourceKind::Frame)?;
    classify_reference(src, SourceKind::Frame, Leniency::Strict)
}

/// `<link href>`: same rules as frames.
pub(super) fn link(element: ElementRef<'_>) -> Result<Option<NormalizedContent>, ExtractError> {
    let href = required(&element, "href", SourceKind::Link)?;
    classify_reference(href, SourceKind::Link, Leniency::Strict)
}

/// `<object data>` and `<embed src>`, both with an optional `type`.
///
/// An explicit non-image `type` rejects the element outright. An explicit
/// image `type` is enough to accept a reference without an extension.
pub(super) fn embeddable(
    element: ElementRef<'_>,
    reference_attr: &'static str,
    kind: SourceKind,
) -> Result<Option<NormalizedContent>, ExtractError> {
    let reference = required(&element, reference_attr, kind)?;
    let declared = attr(&element, "type").map(str::trim);

    let mut type_extension = "";
    if let Some(media_type) = declared {
        let top_level = media_type.split('/').next().unwrap_or("").trim();
        if !top_level.eq_ignore_ascii_case("image") {
            return Ok(None);
        }
        match preferred_extension(media_type) {
            Some(ext) => type_extension = ext,
            None => tracing::debug!(media_type, %kind, "image type without a known extension"),
        }
    }

    if has_data_scheme(reference) {
        return classify_data_uri(reference, kind);
    }
    match reference_extension(reference) {
        None if declared.is_some() => Ok(Some(NormalizedContent::remote(
            kind,
            type_extension,
            reference,
        ))),
        Some(ext) if is_image_extension(&ext) => {
            Ok(Some(NormalizedContent::remote(kind, ext, reference)))
        }
        _ => Ok(None),
    }
}
