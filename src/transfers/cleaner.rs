//! Failed/stale transfer cleanup
//!
//! Failed transfers go immediately. Stale transfers (stuck loading or
//! downloading at 0 mbit/s) are only deleted when they were already stale in
//! the previous invocation, tracked through a plain id file.

use crate::api::RemoteHost;
use crate::error::Result;
use crate::objects::Transfer;
use futures::future::join_all;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;

static STALLED_MESSAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)Downloading at 0 mbit/s from \d peers\. \d% of [\d.]+ (\wB|Bytes) finished\. ETA is unknown",
    )
    .expect("stalled-message pattern is valid")
});

/// Outcome of one cleanup run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    /// Transfers deleted because they failed
    pub failed_deleted: usize,
    /// Transfers deleted because they were stale twice in a row
    pub stale_deleted: usize,
    /// Non-finished transfers remembered for the next run
    pub remembered: usize,
}

/// Delete failed and repeatedly-stale transfers, then record the current
/// non-finished transfer ids in `prev_file` for the next invocation.
pub async fn clean_transfers<H: RemoteHost>(host: &H, prev_file: &Path) -> Result<CleanReport> {
    let previous = read_previous_ids(prev_file).await;

    let transfers: Vec<Transfer> = host
        .get_transfers()
        .await?
        .into_iter()
        .filter(|transfer| transfer.status != "finished")
        .collect();

    let failed: Vec<&Transfer> = transfers.iter().filter(|t| is_failed(t)).collect();
    for transfer in &failed {
        log::info!("{} is failed, deleting!", transfer.name());
    }

    let mut stale: Vec<&Transfer> = Vec::new();
    for transfer in transfers.iter().filter(|t| is_stale(t)) {
        log::info!("{} is stale!", transfer.name());
        if previous.contains(transfer.id.as_str()) {
            log::info!("\twas stale before, deleting");
            stale.push(transfer);
        }
    }

    let failed_count = failed.len();
    let stale_count = stale.len();
    let deletions = failed.into_iter().chain(stale).map(|transfer| async move {
        if let Err(e) = host.delete_transfer(transfer).await {
            log::error!("Could not delete transfer \"{}\": {}", transfer.name(), e);
        }
    });
    join_all(deletions).await;

    write_ids(prev_file, &transfers).await?;

    Ok(CleanReport {
        failed_deleted: failed_count,
        stale_deleted: stale_count,
        remembered: transfers.len(),
    })
}

fn is_failed(transfer: &Transfer) -> bool {
    transfer.status == "error"
        && transfer
            .message
            .as_deref()
            .unwrap_or("")
            .starts_with("Could not add")
}

fn is_stale(transfer: &Transfer) -> bool {
    match transfer.message.as_deref() {
        Some("Loading...") => true,
        Some(message) => STALLED_MESSAGE.is_match(message),
        None => false,
    }
}

/// Ids recorded by the previous run; an unreadable file means nothing counts
/// as stale-twice yet
async fn read_previous_ids(prev_file: &Path) -> HashSet<String> {
    match tokio::fs::read_to_string(prev_file).await {
        Ok(content) => content.lines().map(str::to_string).collect(),
        Err(_) => HashSet::new(),
    }
}

async fn write_ids(prev_file: &Path, transfers: &[Transfer]) -> Result<()> {
    let mut content = String::new();
    for transfer in transfers {
        content.push_str(&transfer.id);
        content.push('\n');
    }
    tokio::fs::write(prev_file, content).await?;
    Ok(())
}
