//! Download-and-cleanup orchestration
//!
//! The batch fans out one task per matched item, unbounded; the API client
//! caps how many bodies actually stream at once. The batch completes only
//! when every task has finished, and item failures never abort siblings.

use crate::api::RemoteHost;
use crate::download::types::{CleanupPolicy, DownloadOptions, DownloadReport, DownloadRequest};
use crate::error::Result;
use crate::objects::Item;
use chrono::Utc;
use futures::future::join_all;

/// Download everything the request names into the target directory, then
/// apply the cleanup policy to each successfully handled item.
///
/// Errors local to one item are logged and counted in the report, not raised;
/// only precondition failures (the snapshot fetch, a direct-download call)
/// abort the invocation.
pub async fn download_files<H: RemoteHost>(
    host: &H,
    request: &DownloadRequest,
    options: &DownloadOptions,
) -> Result<DownloadReport> {
    let pattern = match request {
        DownloadRequest::DirectLink(url) => {
            host.download_directdl(url, &options.directory).await?;
            return Ok(DownloadReport {
                matched: 1,
                fetched: 1,
                ..Default::default()
            });
        }
        DownloadRequest::Pattern(pattern) => pattern,
    };

    let files = host.get_files().await?;
    let matched: Vec<&Item> = files.iter().filter(|item| item.matches(pattern)).collect();

    let outcomes = join_all(
        matched
            .iter()
            .copied()
            .map(|item| fetch_and_clean(host, item, options)),
    )
    .await;

    let mut report = DownloadReport {
        matched: matched.len(),
        ..Default::default()
    };
    for outcome in outcomes {
        report.fetched += usize::from(outcome.fetched);
        report.deleted += usize::from(outcome.deleted);
        report.failed += usize::from(outcome.failed);
    }
    Ok(report)
}

#[derive(Default)]
struct ItemOutcome {
    fetched: bool,
    deleted: bool,
    failed: bool,
}

/// Per-item task: attempt the download, and on success run the cleanup step.
/// No retry; a failed download leaves the item untouched remotely.
async fn fetch_and_clean<H: RemoteHost>(
    host: &H,
    item: &Item,
    options: &DownloadOptions,
) -> ItemOutcome {
    let fetched = if options.cleanup_only {
        Ok(true)
    } else {
        host.download_file(item, &options.directory).await
    };

    match fetched {
        Ok(true) => match clean(host, item, options.cleanup).await {
            Ok(deleted) => ItemOutcome {
                fetched: true,
                deleted,
                failed: false,
            },
            Err(e) => {
                log::error!("Cleanup of \"{}\" failed: {}", item.name(), e);
                ItemOutcome {
                    fetched: true,
                    deleted: false,
                    failed: true,
                }
            }
        },
        Ok(false) => {
            log::error!("Could not download \"{}\"", item.name());
            ItemOutcome {
                failed: true,
                ..Default::default()
            }
        }
        Err(e) => {
            log::error!("Download of \"{}\" failed: {}", item.name(), e);
            ItemOutcome {
                failed: true,
                ..Default::default()
            }
        }
    }
}

/// Cleanup step: delete the item once it has outlived the retention period.
///
/// Folders are checked one level deep: the folder goes when none of its
/// direct children is a file younger than the threshold, so an empty folder
/// and a folder holding only sub-folders are both eligible.
async fn clean<H: RemoteHost>(host: &H, item: &Item, policy: CleanupPolicy) -> Result<bool> {
    if policy == CleanupPolicy::Disabled {
        return Ok(false);
    }
    let now = Utc::now();

    match item {
        Item::File(file) => {
            if policy.is_expired(file.created_at, now) {
                log::info!("Deleting \"{}\", older than the retention period", file.name);
                host.delete(item).await?;
                return Ok(true);
            }
        }
        Item::Folder(folder) => {
            let children = host.list_folder(folder).await?;
            let has_young_file = children
                .iter()
                .any(|child| matches!(child, Item::File(f) if !policy.is_expired(f.created_at, now)));
            if !has_young_file {
                log::info!(
                    "Deleting folder \"{}\", no files younger than the retention period",
                    folder.name
                );
                host.delete(item).await?;
                return Ok(true);
            }
        }
    }
    Ok(false)
}
