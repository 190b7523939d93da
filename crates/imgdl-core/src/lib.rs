//! Image extraction from a single HTML page and bounded-concurrency download.

pub mod config;
pub mod control;
pub mod data_uri;
pub mod extract;
pub mod http;
pub mod logging;
pub mod mime_table;
pub mod pipeline;
pub mod url_model;
pub mod walker;

