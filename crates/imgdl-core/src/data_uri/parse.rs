//! RFC 2397 grammar: `data:[<mediatype>][;charset=<value>][;base64],<data>`.

use std::collections::HashMap;

use super::{DataUri, DataUriError, DEFAULT_CHARSET, DEFAULT_SUBTYPE, DEFAULT_TYPE, SCHEME};

/// Parses `input` into a [`DataUri`]. The payload is returned as-is.
pub fn parse_data_uri(input: &str) -> Result<DataUri, DataUriError> {
    if !has_scheme(input) {
        return Err(DataUriError::NotDataUri);
    }
    let rest = &input[SCHEME.len()..];
    let (meta, payload) = rest.split_once(',').ok_or(DataUriError::MissingComma)?;

    let mut uri = DataUri {
        media_type: DEFAULT_TYPE.to_string(),
        subtype: DEFAULT_SUBTYPE.to_string(),
        parameters: HashMap::new(),
        is_base64: false,
        payload: payload.to_string(),
    };

    let mut tokens = meta.split(';');
    let mut explicit_media_type = false;
    let mut pending_first = None;

    if let Some(first) = tokens.next() {
        if let Some((ty, sub)) = first.split_once('/') {
            if !is_token(ty) || !is_token(sub) {
                return Err(DataUriError::MalformedMediaType(first.to_string()));
            }
            uri.media_type = ty.to_string();
            uri.subtype = sub.to_string();
            explicit_media_type = true;
        } else if first.eq_ignore_ascii_case("base64") || first.contains('=') {
            // `data:;base64,` or `data:charset=x,` – no media type, only parameters.
            pending_first = Some(first);
        } else if !first.is_empty() {
            return Err(DataUriError::MalformedMediaType(first.to_string()));
        }
    }

    for token in pending_first.into_iter().chain(tokens) {
        apply_parameter(&mut uri, token)?;
    }

    if !explicit_media_type && uri.parameters.is_empty() {
        uri.parameters
            .insert("charset".to_string(), DEFAULT_CHARSET.to_string());
    }

    Ok(uri)
}

/// Case-insensitive `data:` prefix check; no allocation.
pub(super) fn has_scheme(input: &str) -> bool {
    input
        .as_bytes()
        .get(..SCHEME.len())
        .map(|p| p.eq_ignore_ascii_case(SCHEME.as_bytes()))
        .unwrap_or(false)
}

fn apply_parameter(uri: &mut DataUri, token: &str) -> Result<(), DataUriError> {
    if token.is_empty() {
        return Ok(());
    }
    if token.eq_ignore_ascii_case("base64") {
        uri.is_base64 = true;
        return Ok(());
    }
    let (key, value) = token
        .split_once('=')
        .ok_or_else(|| DataUriError::MalformedParameter(token.to_string()))?;
    if !is_token(key) || value.chars().any(|c| c.is_ascii_whitespace() || c.is_control()) {
        return Err(DataUriError::MalformedParameter(token.to_string()));
    }
    uri.parameters.insert(key.to_string(), value.to_string());
    Ok(())
}

/// RFC 2045 `token`: non-empty, visible ASCII, no tspecials.
fn is_token(s: &str) -> bool {
    const TSPECIALS: &[u8] = b"()<>@,;:\\\"/[]?=";
    !s.is_empty()
        && s
            .bytes()
            .all(|b| b.is_ascii_graphic() && !TSPECIALS.contains(&b))
}
