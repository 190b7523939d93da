//! HTTP GET over libcurl (the `curl` crate).
//!
//! Transfers are blocking; async callers run them on `spawn_blocking`.
//! TLS verification is off unless [`HttpOptions::verify_tls`] is set: pages
//! with broken or self-signed certificates are still scraped.

mod page;

use std::io;
use std::time::Duration;

use curl::easy::Easy;
use thiserror::Error;

use crate::control::CancelToken;

pub use page::{fetch_page, Page, PageError};

#[derive(Debug, Error)]
pub enum TransferError {
    #[error("{0}")]
    Curl(#[from] curl::Error),
    #[error("write failed: {0}")]
    Write(#[source] io::Error),
    #[error("transfer cancelled")]
    Cancelled,
}

/// Settings shared by the page fetch and every image GET.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// Verify peer certificates and host names.
    pub verify_tls: bool,
    pub connect_timeout: Duration,
    /// Wall-clock limit for one whole transfer.
    pub request_timeout: Duration,
    pub user_agent: String,
    /// Largest page body accepted by [`fetch_page`]; images are not limited.
    pub max_page_bytes: u64,
}

/// Default cap on a fetched HTML page.
pub const DEFAULT_MAX_PAGE_BYTES: u64 = 16 * 1024 * 1024;

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            verify_tls: false,
            connect_timeout: Duration::from_secs(15),
            request_timeout: Duration::from_secs(120),
            user_agent: default_user_agent(),
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
        }
    }
}

pub fn default_user_agent() -> String {
    format!("imgdl/{}", env!("CARGO_PKG_VERSION"))
}

impl HttpOptions {
    /// New GET handle for `url` with redirects, timeouts and TLS policy applied.
    pub(crate) fn easy(&self, url: &str) -> Result<Easy, curl::Error> {
        let mut easy = Easy::new();
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.request_timeout)?;
        easy.useragent(&self.user_agent)?;
        easy.ssl_verify_peer(self.verify_tls)?;
        easy.ssl_verify_host(self.verify_tls)?;
        Ok(easy)
    }
}

/// Runs the transfer on `easy`, handing each body chunk to `sink`.
///
/// The response code is left on `easy` for the caller to check. When `cancel`
/// is given, the transfer is aborted as soon as it is set.
pub(crate) fn perform<F>(
    easy: &mut Easy,
    cancel: Option<&CancelToken>,
    mut sink: F,
) -> Result<(), TransferError>
where
    F: FnMut(&[u8]) -> io::Result<()>,
{
    let mut write_error: Option<io::Error> = None;
    if cancel.is_some() {
        easy.progress(true)?;
    }

    let result = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match sink(data) {
            Ok(()) => Ok(data.len()),
            Err(e) => {
                write_error = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        if let Some(token) = cancel {
            transfer.progress_function(|_, _, _, _| !token.is_cancelled())?;
        }
        transfer.perform()
    };

    match result {
        Ok(()) => Ok(()),
        Err(e) if e.is_aborted_by_callback() => Err(TransferError::Cancelled),
        Err(e) if e.is_write_error() => match write_error {
            Some(io_err) => Err(TransferError::Write(io_err)),
            None => Err(TransferError::Curl(e)),
        },
        Err(e) => Err(TransferError::Curl(e)),
    }
}

/// True for 2xx status codes.
pub(crate) fn is_success(code: u32) -> bool {
    (200..300).contains(&code)
}
