//! `data:` URI codec (RFC 2397).
//!
//! Parsing is purely syntactic: the payload is kept exactly as written after
//! the first comma. Turning it into bytes is a separate step
//! ([`decode_payload`]) done by whoever writes it out.

mod decode;
mod error;
mod parse;

use std::collections::HashMap;

pub use decode::decode_payload;
pub use error::DataUriError;
pub use parse::parse_data_uri;

const SCHEME: &str = "data:";
const DEFAULT_TYPE: &str = "text";
const DEFAULT_SUBTYPE: &str = "plain";
const DEFAULT_CHARSET: &str = "US-ASCII";

/// Parsed `data:` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// Top-level media type, `text` when omitted.
    pub media_type: String,
    /// Media subtype, `plain` when omitted.
    pub subtype: String,
    /// `key=value` parameters; `charset=US-ASCII` only when nothing was given.
    pub parameters: HashMap<String, String>,
    /// True iff a `;base64` marker preceded the payload.
    pub is_base64: bool,
    /// Raw text after the first comma, neither percent- nor base64-decoded.
    pub payload: String,
}

impl DataUri {
    /// `type/subtype`, lower-cased for table lookups.
    pub fn essence(&self) -> String {
        format!("{}/{}", self.media_type, self.subtype).to_ascii_lowercase()
    }

    pub fn is_image(&self) -> bool {
        self.media_type.eq_ignore_ascii_case("image")
    }

    pub fn decode_payload(&self) -> Result<Vec<u8>, DataUriError> {
        decode_payload(&self.payload, self.is_base64)
    }
}

/// True if `s` starts with the `data:` literal (case-insensitive, no leading
/// whitespace), whether or not the rest is well formed.
pub fn has_data_scheme(s: &str) -> bool {
    parse::has_scheme(s)
}

/// Fast syntactic check: `data:` prefix (case-insensitive, no leading
/// whitespace) followed somewhere by the payload comma.
pub fn is_data_uri(s: &str) -> bool {
    parse::has_scheme(s) && s.as_bytes()[SCHEME.len()..].contains(&b',')
}
