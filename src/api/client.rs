//! HTTP client for the premiumize.me API
//!
//! POST-form transport with a small retry budget, short-lived list caches and
//! a cap on simultaneous streaming transfers. Construction fails outright on
//! unusable credentials; there is no half-initialized client.

use crate::api::auth::Credentials;
use crate::api::responses::{
    DirectDlResponse, Envelope, FolderListResponse, TransferCreateResponse, TransferListResponse,
    ZipGenerateResponse,
};
use crate::api::RemoteHost;
use crate::error::{PremiumizeError, Result};
use crate::objects::{Folder, Item, Transfer};
use async_trait::async_trait;
use futures::future::join_all;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, Semaphore};

const BASE_URL: &str = "https://www.premiumize.me/api";

/// How long file/transfer snapshots stay valid
const CACHE_TIME: Duration = Duration::from_secs(5);

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempts per API call before giving up
const RETRIES: u32 = 3;

/// Simultaneous streaming transfers, independent of how many download tasks
/// are in flight
const MAX_SIMULTANEOUS_TRANSFERS: usize = 2;

struct Cached<T> {
    value: Vec<T>,
    valid_until: Instant,
}

/// Client for the premiumize.me API
pub struct PremiumizeApi {
    http: reqwest::Client,
    credentials: Credentials,
    transfer_slots: Semaphore,
    file_cache: Mutex<Option<Cached<Item>>>,
    transfer_cache: Mutex<Option<Cached<Transfer>>>,
}

impl PremiumizeApi {
    /// Create a client from an inline `user:password` string or a path to a
    /// file with that content. Fails on malformed credentials.
    pub fn new(auth: &str) -> Result<Self> {
        let credentials = Credentials::parse(auth)?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(PremiumizeApi {
            http,
            credentials,
            transfer_slots: Semaphore::new(MAX_SIMULTANEOUS_TRANSFERS),
            file_cache: Mutex::new(None),
            transfer_cache: Mutex::new(None),
        })
    }

    /// Release the underlying connection pool. Called exactly once at the end
    /// of the process lifetime.
    pub async fn close(self) {
        drop(self.http);
    }

    /// Fetch a single transfer by id from the current snapshot
    pub async fn get_transfer(&self, id: &str) -> Result<Option<Transfer>> {
        let transfers = self.get_transfers().await?;
        Ok(transfers.into_iter().find(|t| t.id == id))
    }

    /// Do a request, take care of the login, timeouts and retries
    async fn make_request(&self, path: &str, data: &[(&str, &str)]) -> Result<String> {
        let mut form: Vec<(&str, &str)> = vec![
            ("customer_id", &self.credentials.customer_id),
            ("pin", &self.credentials.pin),
        ];
        form.extend_from_slice(data);

        let url = format!("{}{}", BASE_URL, path);
        for _ in 0..RETRIES {
            match self.http.post(&url).form(&form).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.text().await?);
                }
                Ok(response) => {
                    log::error!(
                        "Calling {} returned status code {}, retrying...",
                        path,
                        response.status()
                    );
                }
                Err(e) if e.is_timeout() || e.is_connect() => {
                    log::warn!("Timeout, retrying...");
                }
                Err(e) => return Err(e.into()),
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }

        Err(PremiumizeError::timeout(path))
    }

    /// Validate the response envelope, then deserialize the payload
    fn parse<T: DeserializeOwned>(&self, operation: &str, text: &str) -> Result<T> {
        let envelope: Envelope = serde_json::from_str(text)?;
        if envelope.is_error() {
            return Err(PremiumizeError::api_error(operation, envelope.message()));
        }
        Ok(serde_json::from_str(text)?)
    }

    async fn request_parsed<T: DeserializeOwned>(
        &self,
        path: &str,
        data: &[(&str, &str)],
    ) -> Result<T> {
        let text = self.make_request(path, data).await?;
        self.parse(path.trim_start_matches('/'), &text)
    }

    /// List a folder, or the account root when `folder` is `None`
    async fn fetch_folder(&self, folder: Option<&Folder>) -> Result<Vec<Item>> {
        let data: Vec<(&str, &str)> = match folder {
            Some(f) => vec![("id", f.id.as_str())],
            None => vec![],
        };
        let listing: FolderListResponse = self.request_parsed("/folder/list", &data).await?;
        Ok(listing.content)
    }

    /// Have the service pack a folder into a zip and hand out its location
    async fn generate_zip(&self, folder: &Folder) -> Result<String> {
        let response: ZipGenerateResponse = self
            .request_parsed("/zip/generate", &[("folders[]", folder.id.as_str())])
            .await?;
        Ok(response.location)
    }

    async fn invalidate_file_cache(&self) {
        *self.file_cache.lock().await = None;
    }

    async fn invalidate_transfer_cache(&self) {
        *self.transfer_cache.lock().await = None;
    }

    /// Local file already holds the remote content (size within 0.1%)
    async fn already_downloaded(&self, destination: &Path, size: u64) -> bool {
        let Ok(metadata) = tokio::fs::metadata(destination).await else {
            return false;
        };
        let local = metadata.len() as f64;
        let remote = size as f64;
        remote * 0.999 < local && local < remote * 1.001
    }

    /// Stream a link's content to `destination`.
    ///
    /// `Ok(false)` when the service answers with a non-success status; holds
    /// one of the transfer slots while the body streams.
    async fn fetch_to_file(&self, link: &str, destination: &Path) -> Result<bool> {
        let _slot = self
            .transfer_slots
            .acquire()
            .await
            .map_err(|_| PremiumizeError::api_error("download", "transfer slots closed"))?;

        let response = self.http.get(link).send().await?;
        if !response.status().is_success() {
            log::error!(
                "Download of \"{}\" failed, returned \"{}\"",
                link,
                response.status()
            );
            return Ok(false);
        }

        let mut file = tokio::fs::File::create(destination).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            file.write_all(&chunk?).await?;
        }
        file.flush().await?;
        Ok(true)
    }
}

#[async_trait]
impl RemoteHost for PremiumizeApi {
    async fn get_files(&self) -> Result<Vec<Item>> {
        {
            let cache = self.file_cache.lock().await;
            if let Some(cached) = cache.as_ref() {
                if cached.valid_until > Instant::now() {
                    return Ok(cached.value.clone());
                }
            }
        }

        let items = self.fetch_folder(None).await?;
        *self.file_cache.lock().await = Some(Cached {
            value: items.clone(),
            valid_until: Instant::now() + CACHE_TIME,
        });
        Ok(items)
    }

    async fn get_transfers(&self) -> Result<Vec<Transfer>> {
        {
            let cache = self.transfer_cache.lock().await;
            if let Some(cached) = cache.as_ref() {
                if cached.valid_until > Instant::now() {
                    return Ok(cached.value.clone());
                }
            }
        }

        let listing: TransferListResponse = self.request_parsed("/transfer/list", &[]).await?;
        *self.transfer_cache.lock().await = Some(Cached {
            value: listing.transfers.clone(),
            valid_until: Instant::now() + CACHE_TIME,
        });
        Ok(listing.transfers)
    }

    async fn download_file(&self, item: &Item, directory: &Path) -> Result<bool> {
        let (name, link, size) = match item {
            Item::File(file) => {
                if file.link.is_empty() {
                    log::warn!("Could not download file \"{}\": no link", file.name);
                    return Ok(false);
                }
                (file.name.clone(), file.link.clone(), file.size)
            }
            Item::Folder(folder) => match self.generate_zip(folder).await {
                Ok(location) if !location.is_empty() => {
                    (format!("{}.zip", folder.name), location, 0)
                }
                Ok(_) => {
                    log::error!("Could not create zip \"{}\": empty location", folder.name);
                    return Ok(false);
                }
                Err(PremiumizeError::Api { message, .. }) => {
                    log::error!("Could not create zip \"{}\": {}", folder.name, message);
                    return Ok(false);
                }
                Err(e) => return Err(e),
            },
        };

        tokio::fs::create_dir_all(directory).await?;
        let destination = directory.join(&name);

        if size > 0 && self.already_downloaded(&destination, size).await {
            log::info!("Skipped \"{}\", already exists", name);
            return Ok(true);
        }

        let size_note = if size > 0 {
            format!(" ({} MB)", size / (1024 * 1024))
        } else {
            String::new()
        };
        log::info!("Downloading {}{}...", name, size_note);

        self.fetch_to_file(&link, &destination).await
    }

    async fn download_directdl(&self, url: &str, directory: &Path) -> Result<()> {
        let response: DirectDlResponse = self
            .request_parsed("/transfer/directdl", &[("src", url)])
            .await?;

        tokio::fs::create_dir_all(directory).await?;

        let fetches = response
            .content
            .iter()
            .filter(|entry| !entry.link.is_empty())
            .map(|entry| async move {
                let name = entry.link.rsplit('/').next().unwrap_or("download");
                let destination = directory.join(name);
                log::info!("Downloading {}...", name);
                if let Err(e) = self.fetch_to_file(&entry.link, &destination).await {
                    log::error!("Download of \"{}\" failed: {}", entry.link, e);
                }
            });
        join_all(fetches).await;
        Ok(())
    }

    async fn list_folder(&self, folder: &Folder) -> Result<Vec<Item>> {
        self.fetch_folder(Some(folder)).await
    }

    async fn delete(&self, item: &Item) -> Result<()> {
        let path = match item {
            Item::File(_) => "/item/delete",
            Item::Folder(_) => "/folder/delete",
        };
        let text = self.make_request(path, &[("id", item.id())]).await?;
        let envelope: Envelope = serde_json::from_str(&text)?;
        if envelope.is_error() {
            return Err(PremiumizeError::api_error(
                path.trim_start_matches('/'),
                envelope.message(),
            ));
        }

        self.invalidate_file_cache().await;
        Ok(())
    }

    async fn delete_transfer(&self, transfer: &Transfer) -> Result<()> {
        let text = self
            .make_request("/transfer/delete", &[("id", transfer.id.as_str())])
            .await?;
        let envelope: Envelope = serde_json::from_str(&text)?;
        if envelope.is_error() {
            return Err(PremiumizeError::api_error(
                "transfer/delete",
                envelope.message(),
            ));
        }

        self.invalidate_transfer_cache().await;
        Ok(())
    }

    async fn upload(&self, src: &str) -> Result<Option<Transfer>> {
        let text = self.make_request("/transfer/create", &[("src", src)]).await?;
        let envelope: Envelope = serde_json::from_str(&text)?;
        if envelope.is_error() {
            if envelope.error.as_deref() == Some("duplicate") {
                log::debug!("\"{}\" was already in the transfer list, continuing...", src);
            } else {
                log::error!("Could not upload \"{}\": {}", src, envelope.message());
                return Ok(None);
            }
        }

        self.invalidate_file_cache().await;

        let created: TransferCreateResponse = serde_json::from_str(&text)?;
        match created.id {
            Some(id) => self.get_transfer(&id).await,
            None => Ok(None),
        }
    }
}
