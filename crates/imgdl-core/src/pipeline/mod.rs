//! Bounded-concurrency download of the images found on one page.
//!
//! A single dispatch loop admits items through a counting semaphore of
//! capacity C and spawns one task per admitted item. Each task holds its
//! permit until its result has been sent. After the last item the loop
//! acquires all C permits, so the result channel closes only once every task
//! has reported.

mod error;
mod fetch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, OwnedSemaphorePermit, Semaphore};

use crate::config::{CollisionPolicy, ImgdlConfig};
use crate::control::CancelToken;
use crate::extract::{NormalizedContent, Origin, SourceKind};
use crate::http::{fetch_page, HttpOptions};
use crate::walker::extract_images;

pub use error::DownloadError;
pub use fetch::{decode_inline, TEMP_SUFFIX};

/// Minimum buffered results between the pipeline and its consumer.
const MIN_CHANNEL_DEPTH: usize = 16;

/// Outcome for one item. `source` is `None` only for a page-level failure.
#[derive(Debug)]
pub struct DownloadResult {
    pub source: Option<SourceKind>,
    pub outcome: Result<PathBuf, DownloadError>,
}

impl DownloadResult {
    fn item(source: SourceKind, outcome: Result<PathBuf, DownloadError>) -> Self {
        Self {
            source: Some(source),
            outcome,
        }
    }

    fn page_failure(error: DownloadError) -> Self {
        Self {
            source: None,
            outcome: Err(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// True for the single result reported when the page could not be fetched or parsed.
    pub fn is_page_failure(&self) -> bool {
        self.source.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Maximum simultaneous downloads (C). Zero is treated as one.
    pub concurrency: usize,
    pub http: HttpOptions,
    pub collision: CollisionPolicy,
    /// Fail an item that has not obtained a slot within this long.
    pub admission_timeout: Option<Duration>,
}

impl Default for DownloadOptions {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            http: HttpOptions::default(),
            collision: CollisionPolicy::default(),
            admission_timeout: None,
        }
    }
}

impl DownloadOptions {
    pub fn from_config(cfg: &ImgdlConfig) -> Self {
        Self {
            concurrency: cfg
                .max_concurrent_downloads
                .unwrap_or_else(default_concurrency),
            http: cfg.http_options(),
            collision: cfg.collision_policy,
            admission_timeout: cfg.admission_timeout_secs.map(Duration::from_secs),
        }
    }

    fn permits(&self) -> u32 {
        u32::try_from(self.concurrency.max(1)).unwrap_or(u32::MAX)
    }
}

/// Number of logical CPUs, or 1 if it cannot be determined.
pub fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Fetches the page at `page_url`, extracts its images and downloads them into `dir`.
///
/// Results arrive on the returned channel in completion order; it closes after
/// the last one. If the page cannot be fetched or is not HTML, exactly one
/// failure with `source: None` is sent. Must be called within a Tokio runtime.
pub fn download_images(
    page_url: impl Into<String>,
    dir: impl Into<PathBuf>,
    options: DownloadOptions,
    cancel: Arc<CancelToken>,
) -> mpsc::Receiver<DownloadResult> {
    let page_url = page_url.into();
    let dir = dir.into();
    let depth = options.concurrency.max(MIN_CHANNEL_DEPTH);
    let (tx, rx) = mpsc::channel(depth);

    tokio::spawn(async move {
        let scanned = collect_images(&page_url, &options.http).await;
        match scanned {
            Ok(items) => run_pipeline(items, dir, options, cancel, tx).await,
            Err(e) => {
                tracing::warn!(url = %page_url, error = %e, "page failed");
                let _ = tx.send(DownloadResult::page_failure(e)).await;
            }
        }
    });
    rx
}

/// Fetches `page_url` and returns the image records found on it, in document order.
pub async fn collect_images(
    page_url: &str,
    http: &HttpOptions,
) -> Result<Vec<NormalizedContent>, DownloadError> {
    if !http.verify_tls {
        tracing::warn!("TLS certificate verification is disabled");
    }
    let url = page_url.to_string();
    let http = http.clone();
    tokio::task::spawn_blocking(move || {
        let page = fetch_page(&url, &http)?;
        let items = extract_images(&page.body, &page.url);
        tracing::info!(url = %page.url, images = items.len(), "extracted images");
        Ok(items)
    })
    .await
    .map_err(|e| DownloadError::Internal(e.to_string()))?
}

enum Admission {
    Granted(OwnedSemaphorePermit),
    TimedOut(Duration),
    Cancelled,
}

/// Waits for one permit, giving up on cancellation or after `limit`.
async fn admit(
    semaphore: &Arc<Semaphore>,
    cancel: &CancelToken,
    limit: Option<Duration>,
) -> Admission {
    let acquire = Arc::clone(semaphore).acquire_owned();
    let bounded = async move {
        match limit {
            Some(limit) => tokio::time::timeout(limit, acquire)
                .await
                .map_err(|_| limit),
            None => Ok(acquire.await),
        }
    };
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Admission::Cancelled,
        res = bounded => match res {
            Ok(Ok(permit)) => Admission::Granted(permit),
            // The semaphore is never closed while the loop owns it.
            Ok(Err(_)) => Admission::Cancelled,
            Err(limit) => Admission::TimedOut(limit),
        },
    }
}

/// Downloads `items` into `dir` with at most `options.concurrency` in flight,
/// sending one result per item on `tx`. Returns after every item has reported.
pub async fn run_pipeline(
    items: Vec<NormalizedContent>,
    dir: PathBuf,
    options: DownloadOptions,
    cancel: Arc<CancelToken>,
    tx: mpsc::Sender<DownloadResult>,
) {
    let permits = options.permits();
    let semaphore = Arc::new(Semaphore::new(permits as usize));
    let options = Arc::new(options);
    let total = items.len();
    tracing::info!(total, concurrency = permits, dir = %dir.display(), "starting downloads");

    let mut pending = items.into_iter();
    while let Some(item) = pending.next() {
        if tx.is_closed() {
            tracing::debug!("result receiver dropped; stopping dispatch");
            break;
        }
        let permit = match admit(&semaphore, &cancel, options.admission_timeout).await {
            Admission::Granted(permit) => permit,
            Admission::TimedOut(limit) => {
                tracing::warn!(source = %item.source, data = %item.data, ?limit, "admission timed out");
                let _ = tx
                    .send(DownloadResult::item(item.source, Err(DownloadError::AdmissionTimeout(limit))))
                    .await;
                continue;
            }
            Admission::Cancelled => {
                tracing::info!(remaining = pending.len() + 1, "cancelled before dispatch");
                for skipped in std::iter::once(item).chain(pending.by_ref()) {
                    let _ = tx
                        .send(DownloadResult::item(skipped.source, Err(DownloadError::Cancelled)))
                        .await;
                }
                break;
            }
        };

        let tx = tx.clone();
        let dir = dir.clone();
        let options = Arc::clone(&options);
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            let source = item.source;
            let outcome = download_item(item, dir, &options, cancel).await;
            if let Err(e) = &outcome {
                tracing::debug!(%source, error = %e, "download failed");
            }
            let _ = tx.send(DownloadResult::item(source, outcome)).await;
            drop(permit);
        });
    }

    // Drain barrier: every permit back means every task has sent its result.
    if let Ok(all) = semaphore.acquire_many(permits).await {
        drop(all);
    }
    tracing::info!(total, "downloads finished");
}

async fn download_item(
    item: NormalizedContent,
    dir: PathBuf,
    options: &DownloadOptions,
    cancel: Arc<CancelToken>,
) -> Result<PathBuf, DownloadError> {
    if cancel.is_cancelled() {
        return Err(DownloadError::Cancelled);
    }
    let http = options.http.clone();
    let collision = options.collision;
    tokio::task::spawn_blocking(move || match item.origin {
        Origin::InlinePayload(encoding) => {
            fetch::write_inline(&dir, &item.extension_hint, &item.data, encoding)
        }
        Origin::RemoteReference => fetch::fetch_remote(
            &item.data,
            &item.extension_hint,
            &dir,
            &http,
            collision,
            &cancel,
        ),
    })
    .await
    .map_err(|e| DownloadError::Internal(e.to_string()))?
}

/// Ensures `dir` exists and is a directory.
pub fn prepare_dir(dir: &Path) -> Result<(), DownloadError> {
    std::fs::create_dir_all(dir).map_err(|e| DownloadError::io(dir, e))
}
