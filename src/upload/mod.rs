//! Transfer creation from links and magnets

use crate::api::RemoteHost;
use crate::error::Result;
use crate::objects::Transfer;
use futures::future::join_all;

/// Submit every link as a new transfer, concurrently. Service-side rejections
/// come back as `None` (and are logged by the client); duplicates resolve to
/// the already-existing transfer.
pub async fn upload_links<H: RemoteHost>(
    host: &H,
    links: &[String],
) -> Result<Vec<Option<Transfer>>> {
    let submissions = join_all(links.iter().map(|link| host.upload(link))).await;

    let mut created = Vec::with_capacity(submissions.len());
    for submission in submissions {
        created.push(submission?);
    }

    log::info!("Ids of uploaded transfers:");
    for transfer in created.iter().flatten() {
        log::info!("{}", transfer.id);
    }

    Ok(created)
}
