//! CLI for imgdl.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use imgdl_core::config;
use std::path::PathBuf;

use commands::{run_completions, run_download, run_list, DownloadOverrides};

/// Top-level CLI for imgdl.
#[derive(Debug, Parser)]
#[command(name = "imgdl")]
#[command(about = "imgdl: download every image referenced by a web page", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Fetch a page and download all images it references.
    Download {
        /// HTTP/HTTPS URL of the page.
        url: String,
        /// Directory to save images into (created if missing).
        #[arg(long, default_value = ".", value_name = "DIR")]
        dir: PathBuf,
        /// Download up to N images at once (default: config, then CPU count).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Verify TLS certificates (off by default).
        #[arg(long)]
        verify_tls: bool,
        /// Save colliding file names as name-1.ext, name-2.ext, ... instead of overwriting.
        #[arg(long)]
        rename_collisions: bool,
        /// Fail an image that waits longer than SECS for a download slot.
        #[arg(long, value_name = "SECS")]
        admission_timeout: Option<u64>,
    },

    /// Fetch a page and list the images it references without downloading.
    List {
        /// HTTP/HTTPS URL of the page.
        url: String,
        /// Verify TLS certificates (off by default).
        #[arg(long)]
        verify_tls: bool,
    },

    /// Print a shell completion script.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell);
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                url,
                dir,
                jobs,
                verify_tls,
                rename_collisions,
                admission_timeout,
            } => {
                let overrides = DownloadOverrides {
                    jobs,
                    verify_tls,
                    rename_collisions,
                    admission_timeout_secs: admission_timeout,
                };
                run_download(&cfg, &url, &dir, overrides).await?;
            }
            CliCommand::List { url, verify_tls } => run_list(&cfg, &url, verify_tls).await?,
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
