//! CLI command handlers. Each command is in its own file.

mod completions;
mod download;
mod list;

pub use completions::run_completions;
pub use download::{run_download, DownloadOverrides};
pub use list::run_list;
