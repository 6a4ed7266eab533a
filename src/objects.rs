//! Data model for the remote account
//!
//! Files, folders and transfers as returned by the premiumize.me API. All of
//! these are read-only snapshots; they go stale the moment the remote account
//! changes and are re-fetched per invocation.

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

fn epoch() -> DateTime<Utc> {
    DateTime::UNIX_EPOCH
}

/// A file or folder in "My Files", tagged by the API's `type` field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Item {
    File(File),
    Folder(Folder),
}

impl Item {
    /// Display name, used for pattern matching and logging
    pub fn name(&self) -> &str {
        match self {
            Item::File(f) => &f.name,
            Item::Folder(f) => &f.name,
        }
    }

    /// Remote id of the item
    pub fn id(&self) -> &str {
        match self {
            Item::File(f) => &f.id,
            Item::Folder(f) => &f.id,
        }
    }

    /// Case-insensitive name match (the regex is compiled case-insensitively
    /// at the boundary)
    pub fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.name())
    }
}

impl Display for Item {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Item::File(file) => file.fmt(f),
            Item::Folder(folder) => folder.fmt(f),
        }
    }
}

/// A file stored in the remote account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct File {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Size in bytes; 0 when the service does not report one
    #[serde(default)]
    pub size: u64,
    /// Creation timestamp, unix seconds on the wire
    #[serde(default = "epoch", with = "chrono::serde::ts_seconds")]
    pub created_at: DateTime<Utc>,
    /// Direct download link for the file's content
    #[serde(default)]
    pub link: String,
}

impl File {
    pub fn size_in_mb(&self) -> u64 {
        self.size / (1024 * 1024)
    }
}

impl Display for File {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({}MB)", self.id, self.name, self.size_in_mb())
    }
}

/// A folder in the remote account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Display for Folder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.id)
    }
}

/// A remote-to-remote fetch job (e.g. a magnet/torrent) tracked by the service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub id: String,
    /// The service reports no name until the transfer content is known
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub folder_id: String,
    #[serde(default)]
    pub file_id: String,
}

impl Transfer {
    /// Display name, `<not yet set>` while the service has none
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("<not yet set>")
    }

    pub fn matches(&self, pattern: &Regex) -> bool {
        pattern.is_match(self.name())
    }

    /// Human-readable status summary
    pub fn status_msg(&self) -> String {
        if self.status == "finished" {
            self.status.clone()
        } else {
            format!("{}: {}", self.status, self.message.as_deref().unwrap_or(""))
        }
    }

    /// Whether the service is still working on this transfer
    pub fn is_running(&self) -> bool {
        match self.status.as_str() {
            "queued" | "running" => true,
            "waiting" => !self
                .message
                .as_deref()
                .unwrap_or("")
                .starts_with("Torrent did not finish for "),
            _ => false,
        }
    }
}

impl Display for Transfer {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name(), self.status_msg())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::RegexBuilder;

    fn pattern(expr: &str) -> Regex {
        RegexBuilder::new(expr)
            .case_insensitive(true)
            .build()
            .unwrap()
    }

    #[test]
    fn test_item_deserializes_by_type_tag() {
        let json = r#"{"type": "file", "id": "f1", "name": "Report_Q1.pdf",
                       "size": 2097152, "created_at": 1700000000, "link": "https://dl/f1"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        match &item {
            Item::File(file) => {
                assert_eq!(file.name, "Report_Q1.pdf");
                assert_eq!(file.size_in_mb(), 2);
                assert_eq!(file.created_at.timestamp(), 1700000000);
            }
            Item::Folder(_) => panic!("expected a file"),
        }

        let json = r#"{"type": "folder", "id": "d1", "name": "season 1"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(matches!(item, Item::Folder(_)));
        assert_eq!(item.name(), "season 1");
    }

    #[test]
    fn test_item_matches_case_insensitive() {
        let json = r#"{"type": "file", "id": "f2", "name": "report_q2.PDF"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert!(item.matches(&pattern(r"report.*\.pdf")));
        assert!(!item.matches(&pattern(r"invoice.*\.pdf")));
    }

    #[test]
    fn test_transfer_status_msg() {
        let done: Transfer = serde_json::from_str(
            r#"{"id": "t1", "name": "some.torrent", "status": "finished"}"#,
        )
        .unwrap();
        assert_eq!(done.status_msg(), "finished");

        let waiting: Transfer = serde_json::from_str(
            r#"{"id": "t2", "status": "waiting", "message": "Loading..."}"#,
        )
        .unwrap();
        assert_eq!(waiting.name(), "<not yet set>");
        assert_eq!(waiting.status_msg(), "waiting: Loading...");
    }

    #[test]
    fn test_transfer_is_running() {
        let queued: Transfer =
            serde_json::from_str(r#"{"id": "t3", "status": "queued"}"#).unwrap();
        assert!(queued.is_running());

        let gave_up: Transfer = serde_json::from_str(
            r#"{"id": "t4", "status": "waiting",
                "message": "Torrent did not finish for 3 days"}"#,
        )
        .unwrap();
        assert!(!gave_up.is_running());

        let errored: Transfer = serde_json::from_str(
            r#"{"id": "t5", "status": "error", "message": "Could not add"}"#,
        )
        .unwrap();
        assert!(!errored.is_running());
    }
}
