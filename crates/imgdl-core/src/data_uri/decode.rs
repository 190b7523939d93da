//! Payload decoding: percent-escapes first, then base64 when flagged.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;

use super::DataUriError;

/// Standard alphabet; inline images in the wild often drop the `=` padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Turns a raw data URI payload into bytes.
pub fn decode_payload(payload: &str, is_base64: bool) -> Result<Vec<u8>, DataUriError> {
    let unescaped = urlencoding::decode_binary(payload.as_bytes());
    if !is_base64 {
        return Ok(unescaped.into_owned());
    }
    let compact: Vec<u8> = unescaped
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    LENIENT_BASE64
        .decode(&compact)
        .map_err(|e| DataUriError::InvalidBase64(e.to_string()))
}
