//! Per-element extraction errors. The walker logs and drops these.

use thiserror::Error;

use super::SourceKind;
use crate::data_uri::DataUriError;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("'{attr}' attribute not found or empty in {kind} element")]
    MissingAttribute { attr: &'static str, kind: SourceKind },
    #[error("invalid data URI: {0}")]
    DataUri(#[from] DataUriError),
    /// `<img>` carries a data URI that is not a known image type.
    #[error("unrecognized image in data URI {0:?}")]
    UnrecognizedInlineImage(String),
    /// An inline payload needs an extension to be written out.
    #[error("inline payload in {0} element has no file extension")]
    MissingInlineExtension(SourceKind),
}
