//! Shared reference classification: inline image, remote image, or neither.

use super::{ExtractError, NormalizedContent, PayloadEncoding, SourceKind};
use crate::data_uri::{has_data_scheme, parse_data_uri};
use crate::mime_table::{is_image_extension, preferred_extension};
use crate::url_model::reference_extension;

/// How much evidence a reference needs before it counts as an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Leniency {
    /// Needs an image data URI or a known image extension.
    Strict,
    /// The element is an image by definition; a missing extension is fine.
    AssumeImage,
}

pub(super) fn classify_reference(
    reference: &str,
    source: SourceKind,
    leniency: Leniency,
) -> Result<Option<NormalizedContent>, ExtractError> {
    if has_data_scheme(reference) {
        return classify_data_uri(reference, source);
    }
    match reference_extension(reference) {
        Some(ext) if is_image_extension(&ext) => {
            Ok(Some(NormalizedContent::remote(source, ext, reference)))
        }
        None if leniency == Leniency::AssumeImage => {
            Ok(Some(NormalizedContent::remote(source, "", reference)))
        }
        _ => Ok(None),
    }
}

/// Parses a data URI and keeps it only if its media type maps to an image extension.
pub(super) fn classify_data_uri(
    reference: &str,
    source: SourceKind,
) -> Result<Option<NormalizedContent>, ExtractError> {
    let uri = parse_data_uri(reference)?;
    if !uri.is_image() {
        return Ok(None);
    }
    let essence = uri.essence();
    let Some(ext) = preferred_extension(&essence) else {
        tracing::debug!(media_type = %essence, %source, "no extension known for image media type");
        return Ok(None);
    };
    let encoding = if uri.is_base64 {
        PayloadEncoding::Base64
    } else {
        tracing::warn!(media_type = %essence, %source, "image data URI without base64 marker");
        PayloadEncoding::PercentEncoded
    };
    NormalizedContent::inline(source, encoding, ext, uri.payload).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_uri::DataUriError;
    use crate::extract::Origin;

    #[test]
    fn image_data_uri_becomes_inline_payload() {
        let c = classify_reference("data:image/png;base64,iVBORw0K", SourceKind::Anchor, Leniency::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(c.origin, Origin::InlinePayload(PayloadEncoding::Base64));
        assert_eq!(c.extension_hint, "png");
        assert_eq!(c.data, "iVBORw0K");
    }

    #[test]
    fn non_base64_image_data_uri_is_accepted() {
        let c = classify_data_uri("data:image/svg+xml,%3Csvg%2F%3E", SourceKind::Link)
            .unwrap()
            .unwrap();
        assert_eq!(c.origin, Origin::InlinePayload(PayloadEncoding::PercentEncoded));
        assert_eq!(c.extension_hint, "svg");
    }

    #[test]
    fn non_image_or_unknown_data_uri_is_skipped() {
        assert!(classify_data_uri("data:text/plain,hi", SourceKind::Anchor)
            .unwrap()
            .is_none());
        assert!(classify_data_uri("data:image/x-weird;base64,AA", SourceKind::Anchor)
            .unwrap()
            .is_none());
    }

    #[test]
    fn malformed_data_uri_is_an_error() {
        assert!(matches!(
            classify_reference("data:image,xx", SourceKind::Frame, Leniency::Strict),
            Err(ExtractError::DataUri(_))
        ));
    }

    #[test]
    fn data_prefix_without_comma_is_an_error_not_a_url() {
        for leniency in [Leniency::Strict, Leniency::AssumeImage] {
            assert!(matches!(
                classify_reference("data:image/png;base64", SourceKind::Image, leniency),
                Err(ExtractError::DataUri(DataUriError::MissingComma))
            ));
        }
    }

    #[test]
    fn extension_decides_remote_references() {
        let c = classify_reference("/a/cat.GIF", SourceKind::Anchor, Leniency::Strict)
            .unwrap()
            .unwrap();
        assert_eq!(c.origin, Origin::RemoteReference);
        assert_eq!(c.extension_hint, "gif");
        assert_eq!(c.data, "/a/cat.GIF");

        assert!(classify_reference("/doc.pdf", SourceKind::Anchor, Leniency::Strict)
            .unwrap()
            .is_none());
        assert!(classify_reference("/page", SourceKind::Anchor, Leniency::Strict)
            .unwrap()
            .is_none());
    }

    #[test]
    fn assume_image_accepts_missing_extension_only() {
        let c = classify_reference("photo", SourceKind::Image, Leniency::AssumeImage)
            .unwrap()
            .unwrap();
        assert_eq!(c.extension_hint, "");
        assert!(classify_reference("photo.php", SourceKind::Image, Leniency::AssumeImage)
            .unwrap()
            .is_none());
    }
}
