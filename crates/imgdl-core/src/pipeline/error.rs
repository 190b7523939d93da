use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::data_uri::DataUriError;
use crate::http::{PageError, TransferError};

/// Why one item (or the whole page) produced no file.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("page: {0}")]
    Page(#[from] PageError),
    #[error("received response code {0}")]
    Http(u32),
    #[error(transparent)]
    Transfer(TransferError),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("inline payload: {0}")]
    Payload(#[from] DataUriError),
    #[error("no download slot within {0:?}")]
    AdmissionTimeout(Duration),
    #[error("cancelled")]
    Cancelled,
    #[error("internal error: {0}")]
    Internal(String),
}

impl DownloadError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        DownloadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl From<TransferError> for DownloadError {
    fn from(e: TransferError) -> Self {
        match e {
            TransferError::Cancelled => DownloadError::Cancelled,
            other => DownloadError::Transfer(other),
        }
    }
}

impl From<curl::Error> for DownloadError {
    fn from(e: curl::Error) -> Self {
        DownloadError::Transfer(TransferError::Curl(e))
    }
}
