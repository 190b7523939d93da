//! Element extractors: one handling procedure per image-bearing tag.
//!
//! Each extractor inspects a single element and yields at most one
//! [`NormalizedContent`]. `Ok(None)` means the element is recognized but does
//! not reference an image; that is not an error.

mod classify;
mod elements;
mod error;

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

use scraper::ElementRef;

pub use error::ExtractError;

/// Which markup element produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Anchor,
    Image,
    VectorGraphic,
    Frame,
    EmbeddedObject,
    Link,
    Embed,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            SourceKind::Anchor => "<a>",
            SourceKind::Image => "<img>",
            SourceKind::VectorGraphic => "<svg>",
            // Shared by `iframe` and the legacy `frame` tag.
            SourceKind::Frame => "<iframe>/<frame>",
            SourceKind::EmbeddedObject => "<object>",
            SourceKind::Link => "<link>",
            SourceKind::Embed => "<embed>",
        };
        f.write_str(tag)
    }
}

/// How literal inline text becomes file bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadEncoding {
    /// `;base64` data URI payload.
    Base64,
    /// Plain data URI payload with `%XX` escapes.
    PercentEncoded,
    /// Serialized markup, written as UTF-8.
    Markup,
}

/// Whether `data` must be fetched or is already in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    RemoteReference,
    InlinePayload(PayloadEncoding),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::RemoteReference => f.write_str("remote"),
            Origin::InlinePayload(_) => f.write_str("inline"),
        }
    }
}

/// One image reference found in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedContent {
    pub source: SourceKind,
    pub origin: Origin,
    /// Suffix (no dot) to use when the URL lacks one. Never empty for inline payloads.
    pub extension_hint: String,
    /// URL for remote references, literal payload text for inline ones.
    pub data: String,
}

impl NormalizedContent {
    pub fn remote(
        source: SourceKind,
        extension_hint: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            source,
            origin: Origin::RemoteReference,
            extension_hint: extension_hint.into(),
            data: url.into(),
        }
    }

    /// Inline payload record. Fails if `extension` is empty.
    pub fn inline(
        source: SourceKind,
        encoding: PayloadEncoding,
        extension: &str,
        payload: impl Into<String>,
    ) -> Result<Self, ExtractError> {
        if extension.is_empty() {
            return Err(ExtractError::MissingInlineExtension(source));
        }
        Ok(Self {
            source,
            origin: Origin::InlinePayload(encoding),
            extension_hint: extension.to_string(),
            data: payload.into(),
        })
    }

    pub fn is_remote(&self) -> bool {
        self.origin == Origin::RemoteReference
    }
}

/// Lower-cased tag name -> element kind.
static DISPATCH: LazyLock<HashMap<&'static str, SourceKind>> = LazyLock::new(|| {
    HashMap::from([
        ("a", SourceKind::Anchor),
        ("img", SourceKind::Image),
        ("svg", SourceKind::VectorGraphic),
        ("iframe", SourceKind::Frame),
        ("frame", SourceKind::Frame),
        ("object", SourceKind::EmbeddedObject),
        ("link", SourceKind::Link),
        ("embed", SourceKind::Embed),
    ])
});

/// Kind handling `tag`, or `None` for tags that never carry images.
pub fn kind_for_tag(tag: &str) -> Option<SourceKind> {
    DISPATCH.get(tag.to_ascii_lowercase().as_str()).copied()
}

impl SourceKind {
    /// Runs this kind's extractor on `element`, which must have a matching tag.
    pub fn extract(self, element: ElementRef<'_>) -> Result<Option<NormalizedContent>, ExtractError> {
        match self {
            SourceKind::Anchor => elements::anchor(element),
            SourceKind::Image => elements::image(element),
            SourceKind::VectorGraphic => elements::vector_graphic(element).map(Some),
            SourceKind::Frame => elements::frame(element),
            SourceKind::EmbeddedObject => elements::embeddable(element, "data", self),
            SourceKind::Link => elements::link(element),
            SourceKind::Embed => elements::embeddable(element, "src", self),
        }
    }
}
