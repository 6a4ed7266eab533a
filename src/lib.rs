pub mod api;
pub mod download;
pub mod error;
pub mod objects;
pub mod transfers;
pub mod upload;

pub use api::{Credentials, PremiumizeApi, RemoteHost};

pub use download::{
    download_files, CleanupPolicy, DownloadOptions, DownloadReport, DownloadRequest,
};

pub use error::{PremiumizeError, Result};

pub use objects::{File, Folder, Item, Transfer};

pub use transfers::{clean_transfers, list_transfers, CleanReport};

pub use upload::upload_links;
