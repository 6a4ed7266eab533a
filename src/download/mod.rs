//! Concurrent batch download with age-based cleanup

mod operations;
mod types;

pub use operations::download_files;
pub use types::{CleanupPolicy, DownloadOptions, DownloadReport, DownloadRequest};
