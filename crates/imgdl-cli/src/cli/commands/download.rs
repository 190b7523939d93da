//! `imgdl download` – fetch a page and download its images.

use anyhow::{Context, Result};
use imgdl_core::config::{CollisionPolicy, ImgdlConfig};
use imgdl_core::control::CancelToken;
use imgdl_core::pipeline::{download_images, prepare_dir, DownloadError, DownloadOptions, DownloadResult};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Command-line flags that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct DownloadOverrides {
    pub jobs: Option<usize>,
    pub verify_tls: bool,
    pub rename_collisions: bool,
    pub admission_timeout_secs: Option<u64>,
}

impl DownloadOverrides {
    pub fn apply(&self, cfg: &ImgdlConfig) -> DownloadOptions {
        let mut options = DownloadOptions::from_config(cfg);
        if let Some(jobs) = self.jobs {
            options.concurrency = jobs.max(1);
        }
        if self.verify_tls {
            options.http.verify_tls = true;
        }
        if self.rename_collisions {
            options.collision = CollisionPolicy::Rename;
        }
        if let Some(secs) = self.admission_timeout_secs {
            options.admission_timeout = Some(Duration::from_secs(secs));
        }
        options
    }
}

/// Per-run counts printed after the last result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub saved: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl Summary {
    fn record(&mut self, result: &DownloadResult) {
        match &result.outcome {
            Ok(_) => self.saved += 1,
            Err(DownloadError::Cancelled) => self.cancelled += 1,
            Err(_) => self.failed += 1,
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} saved, {} failed", self.saved, self.failed)?;
        if self.cancelled > 0 {
            write!(f, ", {} cancelled", self.cancelled)?;
        }
        Ok(())
    }
}

pub async fn run_download(
    cfg: &ImgdlConfig,
    url: &str,
    dir: &Path,
    overrides: DownloadOverrides,
) -> Result<()> {
    prepare_dir(dir).with_context(|| format!("cannot use download dir {}", dir.display()))?;
    let options = overrides.apply(cfg);
    tracing::debug!(?options, "download options");

    let cancel = Arc::new(CancelToken::new());
    let ctrl_c = {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("cancelling...");
                cancel.cancel();
            }
        })
    };

    let mut rx = download_images(url, dir, options, Arc::clone(&cancel));
    let mut summary = Summary::default();
    let mut page_error = None;
    while let Some(result) = rx.recv().await {
        if result.is_page_failure() {
            if let Err(e) = result.outcome {
                page_error = Some(e);
            }
            continue;
        }
        summary.record(&result);
        match &result.outcome {
            Ok(path) => println!("saved {}", path.display()),
            Err(e) => println!("error: {}", e),
        }
    }
    ctrl_c.abort();

    if let Some(e) = page_error {
        return Err(anyhow::Error::new(e).context(format!("failed to scan {}", url)));
    }
    println!("{}", summary);
    tracing::info!(saved = summary.saved, failed = summary.failed, cancelled = summary.cancelled, "download finished");
    Ok(())
}
