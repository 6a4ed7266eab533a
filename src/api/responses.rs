//! Response envelopes for the premiumize.me API (v3)

use crate::objects::{Item, Transfer};
use serde::Deserialize;

/// Fields common to every response; `status == "error"` marks a failed call
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl Envelope {
    pub fn is_error(&self) -> bool {
        self.status.as_deref() == Some("error")
    }

    pub fn message(&self) -> &str {
        self.message.as_deref().unwrap_or("?")
    }
}

/// `/folder/list`
#[derive(Debug, Deserialize)]
pub(crate) struct FolderListResponse {
    #[serde(default)]
    pub content: Vec<Item>,
}

/// `/transfer/list`
#[derive(Debug, Deserialize)]
pub(crate) struct TransferListResponse {
    #[serde(default)]
    pub transfers: Vec<Transfer>,
}

/// `/zip/generate`
#[derive(Debug, Deserialize)]
pub(crate) struct ZipGenerateResponse {
    #[serde(default)]
    pub location: String,
}

/// One entry of a `/transfer/directdl` response
#[derive(Debug, Deserialize)]
pub(crate) struct DirectDlEntry {
    #[serde(default)]
    pub link: String,
}

/// `/transfer/directdl`
#[derive(Debug, Deserialize)]
pub(crate) struct DirectDlResponse {
    #[serde(default)]
    pub content: Vec<DirectDlEntry>,
}

/// `/transfer/create`
#[derive(Debug, Deserialize)]
pub(crate) struct TransferCreateResponse {
    #[serde(default)]
    pub id: Option<String>,
}
