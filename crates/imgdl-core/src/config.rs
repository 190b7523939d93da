use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::http::{default_user_agent, HttpOptions, DEFAULT_MAX_PAGE_BYTES};

/// What to do when two remote images map to the same local filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Last writer wins.
    #[default]
    Overwrite,
    /// Pick `name-1.ext`, `name-2.ext`, ... for later arrivals.
    Rename,
}

/// Global configuration loaded from `~/.config/imgdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImgdlConfig {
    /// Maximum simultaneous downloads (None = available parallelism).
    pub max_concurrent_downloads: Option<usize>,
    /// Verify TLS certificates for the page and every image. Off by default
    /// so that sites with misconfigured certificates can still be scraped.
    pub verify_tls: bool,
    pub connect_timeout_secs: u64,
    /// Limit for one whole transfer (page or image).
    pub request_timeout_secs: u64,
    /// Fail an item that waits longer than this for a download slot (None = wait forever).
    pub admission_timeout_secs: Option<u64>,
    pub user_agent: String,
    /// Refuse HTML pages larger than this many bytes.
    pub max_page_bytes: u64,
    pub collision_policy: CollisionPolicy,
}

impl Default for ImgdlConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: None,
            verify_tls: false,
            connect_timeout_secs: 15,
            request_timeout_secs: 120,
            admission_timeout_secs: None,
            user_agent: default_user_agent(),
            max_page_bytes: DEFAULT_MAX_PAGE_BYTES,
            collision_policy: CollisionPolicy::Overwrite,
        }
    }
}

impl ImgdlConfig {
    pub fn http_options(&self) -> HttpOptions {
        HttpOptions {
            verify_tls: self.verify_tls,
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
            max_page_bytes: self.max_page_bytes,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("imgdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<ImgdlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = ImgdlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<ImgdlConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let cfg: ImgdlConfig = toml::from_str(&data)
        .with_context(|| format!("invalid config: {}", path.display()))?;
    Ok(cfg)
}
