//! `imgdl list` – print the images a page references.

use anyhow::{Context, Result};
use imgdl_core::config::ImgdlConfig;
use imgdl_core::extract::NormalizedContent;
use imgdl_core::pipeline::collect_images;

/// Inline payloads longer than this are cut in the listing.
const INLINE_PREVIEW_CHARS: usize = 40;

pub async fn run_list(cfg: &ImgdlConfig, url: &str, verify_tls: bool) -> Result<()> {
    let mut http = cfg.http_options();
    if verify_tls {
        http.verify_tls = true;
    }
    let items = collect_images(url, &http)
        .await
        .with_context(|| format!("failed to scan {}", url))?;
    for item in &items {
        println!("{}", format_record(item));
    }
    Ok(())
}

/// `<source>\t<origin>\t<hint>\t<data>`; an empty hint prints as `-`.
pub(crate) fn format_record(item: &NormalizedContent) -> String {
    let hint = if item.extension_hint.is_empty() {
        "-"
    } else {
        item.extension_hint.as_str()
    };
    let data = if item.is_remote() {
        item.data.clone()
    } else {
        abbreviate(&item.data)
    };
    format!("{}\t{}\t{}\t{}", item.source, item.origin, hint, data)
}

fn abbreviate(payload: &str) -> String {
    let flat: String = payload
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .collect();
    let total = flat.chars().count();
    if total <= INLINE_PREVIEW_CHARS {
        return flat;
    }
    let head: String = flat.chars().take(INLINE_PREVIEW_CHARS).collect();
    format!("{}... ({} chars)", head, total)
}
