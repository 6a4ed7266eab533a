//! Remote API client for premiumize.me
//!
//! The [`RemoteHost`] trait is the seam between the orchestration logic and
//! the service: everything above it is testable without network access, and
//! [`PremiumizeApi`] is the production implementation.

pub mod auth;
pub mod client;
mod responses;

pub use auth::Credentials;
pub use client::PremiumizeApi;

use crate::error::Result;
use crate::objects::{Folder, Item, Transfer};
use async_trait::async_trait;
use std::path::Path;

/// Operations the remote service must provide.
///
/// All methods take `&self`; implementations must be safe for concurrent
/// invocation of independent operations.
#[async_trait]
pub trait RemoteHost: Send + Sync {
    /// Full snapshot of "My Files"
    async fn get_files(&self) -> Result<Vec<Item>>;

    /// Full snapshot of active and completed transfers
    async fn get_transfers(&self) -> Result<Vec<Transfer>>;

    /// Fetch `item`'s content into `directory`.
    ///
    /// `Ok(false)` means the service refused the item (no link, error
    /// status); transport failures surface as `Err`.
    async fn download_file(&self, item: &Item, directory: &Path) -> Result<bool>;

    /// Let the service resolve a direct-download link and fetch its content
    /// into `directory`, bypassing the snapshot/filter flow
    async fn download_directdl(&self, url: &str, directory: &Path) -> Result<()>;

    /// Immediate children of a folder
    async fn list_folder(&self, folder: &Folder) -> Result<Vec<Item>>;

    /// Remove an item from "My Files"; not guaranteed idempotent
    async fn delete(&self, item: &Item) -> Result<()>;

    /// Remove a transfer
    async fn delete_transfer(&self, transfer: &Transfer) -> Result<()>;

    /// Submit a link/magnet as a new transfer. Returns the created transfer,
    /// or `None` when the service accepted the job but reports no transfer
    /// for it yet.
    async fn upload(&self, src: &str) -> Result<Option<Transfer>>;
}
