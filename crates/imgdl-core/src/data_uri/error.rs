//! Error type for `data:` URI parsing and payload decoding.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DataUriError {
    /// Input does not start with the `data:` literal.
    #[error("not a data URI")]
    NotDataUri,
    /// No comma separates the meta segment from the payload.
    #[error("data URI has no ',' before its payload")]
    MissingComma,
    /// Media type is present but not `type/subtype`, or contains stray characters.
    #[error("malformed media type in data URI: {0:?}")]
    MalformedMediaType(String),
    /// A `;`-separated token is neither `base64` nor `key=value`.
    #[error("malformed data URI parameter: {0:?}")]
    MalformedParameter(String),
    /// Payload is flagged `;base64` but does not decode.
    #[error("invalid base64 payload: {0}")]
    InvalidBase64(String),
}
