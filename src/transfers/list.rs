//! Transfer listing

use crate::api::RemoteHost;
use crate::error::{PremiumizeError, Result};
use crate::objects::Transfer;
use regex::Regex;

/// List all transfers whose name matches the pattern, one line per transfer,
/// names left-aligned to the longest match. Snapshot order is preserved.
///
/// Fails with an empty-result error when nothing matches; the alignment width
/// is undefined over an empty set.
pub async fn list_transfers<H: RemoteHost>(host: &H, pattern: &Regex) -> Result<Vec<String>> {
    let transfers = host.get_transfers().await?;
    let matched: Vec<Transfer> = transfers
        .into_iter()
        .filter(|transfer| transfer.matches(pattern))
        .collect();

    if matched.is_empty() {
        return Err(PremiumizeError::empty_result("transfers"));
    }

    // Width in characters, not bytes, so non-ASCII names stay aligned.
    let width = matched
        .iter()
        .map(|transfer| transfer.name().chars().count())
        .max()
        .unwrap_or(0);

    Ok(matched
        .iter()
        .map(|transfer| format!("{:<width$}  {}", transfer.name(), transfer.status_msg()))
        .collect())
}
