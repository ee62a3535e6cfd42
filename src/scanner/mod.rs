//! Remote tree scanning: file records, the crawler, and scan progress state.
//!
//! # Architecture
//!
//! The scanner is divided into submodules:
//! - [`crawler`]: iterative traversal of the remote hierarchy
//! - [`state`]: scan lifecycle state shared with status queries
//!
//! A scan produces [`FileRecord`]s; everything downstream (grouping, stats,
//! deletion safety) operates on those records without touching the network.

pub mod crawler;
pub mod state;

use chrono::{DateTime, Utc};
use serde::Serialize;

// Re-export main types
pub use crawler::Crawler;
pub use state::{ScanState, ScanStatus};

/// Metadata for one file discovered in the remote tree.
///
/// Immutable once emitted by the crawler; owned by the session's file set
/// until removed by deletion.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    /// Remote item id, unique within the store.
    pub id: String,
    /// File name without path.
    pub name: String,
    /// Full path from the drive root, `/`-separated.
    pub path: String,
    /// Size in bytes.
    pub size: u64,
    /// Last-modified timestamp reported by the remote store.
    pub last_modified: DateTime<Utc>,
    /// Content hash, when the remote store supplied one. Absent for items
    /// the store did not hash.
    pub fingerprint: Option<String>,
    /// Id of the containing folder, when known.
    pub parent_id: Option<String>,
}

impl FileRecord {
    /// File extension: the substring after the final `.` of the name.
    ///
    /// `None` when the name has no dot or nothing follows it.
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.name
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|ext| !ext.is_empty())
    }
}
