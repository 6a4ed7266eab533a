//! Types for download orchestration

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use regex::RegexBuilder;
use std::path::PathBuf;

/// What to download: a name filter over "My Files", or a link the service can
/// fetch directly.
///
/// The variant is decided once at the boundary; the orchestration never
/// re-derives intent from the input string.
#[derive(Debug, Clone)]
pub enum DownloadRequest {
    /// Case-insensitive name filter
    Pattern(regex::Regex),
    /// Direct-download link, handed to the service as-is
    DirectLink(String),
}

impl DownloadRequest {
    /// Parse a raw CLI input. `http(s)://` inputs become direct links;
    /// anything else is compiled as a case-insensitive regular expression and
    /// rejected here if it does not compile.
    pub fn parse(input: &str) -> Result<Self> {
        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(DownloadRequest::DirectLink(input.to_string()));
        }

        let pattern = RegexBuilder::new(input).case_insensitive(true).build()?;
        Ok(DownloadRequest::Pattern(pattern))
    }
}

/// Age-based deletion policy applied after a successful download
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleanupPolicy {
    /// Never delete anything
    Disabled,
    /// Delete items older than this once they were downloaded
    MaxAge(Duration),
}

impl CleanupPolicy {
    /// Negative day counts disable cleanup. Day counts beyond what a
    /// `Duration` can hold saturate; they behave like "keep forever".
    pub fn from_days(days: i64) -> Self {
        if days < 0 {
            CleanupPolicy::Disabled
        } else {
            CleanupPolicy::MaxAge(Duration::try_days(days).unwrap_or(Duration::MAX))
        }
    }

    /// Whether an item created at `created_at` has outlived the retention
    /// period at `now`. A deadline past the representable time range means
    /// the item can never expire.
    pub fn is_expired(&self, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            CleanupPolicy::Disabled => false,
            CleanupPolicy::MaxAge(max_age) => match created_at.checked_add_signed(*max_age) {
                Some(deadline) => deadline < now,
                None => false,
            },
        }
    }
}

/// Options for a batch download invocation
#[derive(Debug, Clone)]
pub struct DownloadOptions {
    /// Target directory for downloaded content
    pub directory: PathBuf,
    /// Deletion policy for successfully handled items
    pub cleanup: CleanupPolicy,
    /// Skip the network transfer and only apply the cleanup policy
    pub cleanup_only: bool,
}

impl DownloadOptions {
    /// Download into `directory`, no cleanup
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            cleanup: CleanupPolicy::Disabled,
            cleanup_only: false,
        }
    }

    /// Set the cleanup policy
    pub fn cleanup(mut self, policy: CleanupPolicy) -> Self {
        self.cleanup = policy;
        self
    }

    /// Only run cleanup, skipping the downloads themselves
    pub fn cleanup_only(mut self, cleanup_only: bool) -> Self {
        self.cleanup_only = cleanup_only;
        self
    }
}

/// Outcome of a batch download. Individual failures are logged, not raised,
/// so the batch itself completes even when every item failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Items whose name matched the pattern
    pub matched: usize,
    /// Items downloaded (or skipped in cleanup-only mode)
    pub fetched: usize,
    /// Items deleted by the cleanup policy
    pub deleted: usize,
    /// Items whose download or cleanup failed
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_url_becomes_direct_link() {
        let request = DownloadRequest::parse("https://example.com/some/file.iso").unwrap();
        assert!(matches!(request, DownloadRequest::DirectLink(ref url)
            if url == "https://example.com/some/file.iso"));

        let request = DownloadRequest::parse("http://example.com/x").unwrap();
        assert!(matches!(request, DownloadRequest::DirectLink(_)));
    }

    #[test]
    fn test_parse_pattern_is_case_insensitive() {
        let request = DownloadRequest::parse(r"report.*\.pdf").unwrap();
        match request {
            DownloadRequest::Pattern(re) => {
                assert!(re.is_match("Report_Q1.pdf"));
                assert!(re.is_match("report_q2.PDF"));
                assert!(!re.is_match("invoice.pdf"));
            }
            DownloadRequest::DirectLink(_) => panic!("expected a pattern"),
        }
    }

    #[test]
    fn test_parse_rejects_invalid_regex() {
        assert!(DownloadRequest::parse(r"report[").is_err());
    }

    #[test]
    fn test_cleanup_policy_from_days() {
        assert_eq!(CleanupPolicy::from_days(-1), CleanupPolicy::Disabled);
        assert_eq!(
            CleanupPolicy::from_days(30),
            CleanupPolicy::MaxAge(Duration::days(30))
        );
    }

    #[test]
    fn test_cleanup_policy_expiry() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let disabled = CleanupPolicy::from_days(-1);
        assert!(!disabled.is_expired(now - Duration::days(1000), now));

        let keep_nothing = CleanupPolicy::from_days(0);
        assert!(keep_nothing.is_expired(now - Duration::seconds(1), now));
        assert!(!keep_nothing.is_expired(now + Duration::seconds(1), now));

        let month = CleanupPolicy::from_days(30);
        assert!(month.is_expired(now - Duration::days(45), now));
        assert!(!month.is_expired(now - Duration::days(15), now));
    }

    #[test]
    fn test_extreme_retention_never_expires_or_panics() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        // Day count no Duration can hold: saturates instead of aborting.
        let forever = CleanupPolicy::from_days(i64::MAX);
        assert!(!forever.is_expired(now - Duration::days(10_000), now));

        // Representable duration whose deadline overflows the datetime range.
        let beyond_calendar = CleanupPolicy::from_days(100_000_000);
        assert!(!beyond_calendar.is_expired(now, now));
    }
}
