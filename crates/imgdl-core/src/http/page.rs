//! Page fetch: GET the page, require an HTML response, keep the final URL.

use std::io;

use thiserror::Error;

use super::{is_success, perform, HttpOptions, TransferError};

/// A fetched HTML page.
#[derive(Debug, Clone)]
pub struct Page {
    /// URL after redirects; base for relative references.
    pub url: String,
    pub body: String,
}

#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Transfer(#[from] TransferError),
    #[error("received response code {0}")]
    Http(u32),
    #[error("response has no Content-Type")]
    MissingContentType,
    #[error("incorrect media type: {0}")]
    NotHtml(String),
    #[error("page larger than {0} bytes")]
    TooLarge(u64),
}

impl From<curl::Error> for PageError {
    fn from(e: curl::Error) -> Self {
        PageError::Transfer(TransferError::Curl(e))
    }
}

/// Fetches `url` and returns its body if it is `text/html`.
///
/// Blocking; call from `spawn_blocking` when used from async code.
pub fn fetch_page(url: &str, http: &HttpOptions) -> Result<Page, PageError> {
    let mut easy = http.easy(url)?;
    let limit = http.max_page_bytes;
    let mut body = Vec::new();
    let mut too_large = false;
    let transfer = perform(&mut easy, None, |chunk| {
        if (body.len() + chunk.len()) as u64 > limit {
            too_large = true;
            return Err(io::Error::other("page size limit reached"));
        }
        body.extend_from_slice(chunk);
        Ok(())
    });
    if too_large {
        return Err(PageError::TooLarge(limit));
    }
    transfer?;

    let code = easy.response_code()?;
    if !is_success(code) {
        return Err(PageError::Http(code));
    }

    let content_type = easy
        .content_type()?
        .map(str::to_string)
        .ok_or(PageError::MissingContentType)?;
    let media_type = media_type_essence(&content_type);
    if media_type.is_empty() {
        return Err(PageError::MissingContentType);
    }
    if media_type != "text/html" {
        return Err(PageError::NotHtml(media_type));
    }

    let final_url = easy.effective_url()?.unwrap_or(url).to_string();
    tracing::debug!(url = %final_url, bytes = body.len(), "fetched page");

    let body = decode_body(body, charset_param(&content_type).as_deref());
    Ok(Page {
        url: final_url,
        body,
    })
}

/// Turns the page bytes into text. UTF-8 is tried first; a declared Latin-1
/// charset is decoded byte for byte; anything else is decoded lossily with a
/// warning, since references with non-ASCII bytes may come out mangled.
fn decode_body(bytes: Vec<u8>, charset: Option<&str>) -> String {
    let bytes = match String::from_utf8(bytes) {
        Ok(text) => return text,
        Err(e) => e.into_bytes(),
    };
    match charset {
        Some("iso-8859-1" | "latin1" | "l1" | "us-ascii" | "ascii") => {
            bytes.iter().map(|&b| char::from(b)).collect()
        }
        _ => {
            let text = String::from_utf8_lossy(&bytes).into_owned();
            let replaced = text.chars().filter(|&c| c == char::REPLACEMENT_CHARACTER).count();
            tracing::warn!(
                charset = charset.unwrap_or("none"),
                replaced,
                "page is not valid UTF-8; invalid bytes were replaced"
            );
            text
        }
    }
}

/// Lower-cased `charset` parameter of a Content-Type, unquoted.
fn charset_param(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_ascii_lowercase())
    })
}

/// `text/html; charset=utf-8` -> `text/html`.
fn media_type_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}
