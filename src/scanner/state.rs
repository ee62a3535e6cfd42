//! Scan lifecycle state shared between the crawl task and status queries.

use serde::Serialize;

/// Lifecycle phase of the current scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    /// No scan has run since creation or the last reset.
    Idle,
    /// A crawl task is actively walking the remote tree.
    Scanning,
    /// The last crawl finished and the file set is complete.
    Complete,
    /// The last crawl aborted; partial results are retained.
    Error,
}

/// Progress snapshot exposed to status queries.
///
/// Mutated only by the active crawl task; readers always receive a cloned
/// snapshot, never a partially updated view.
#[derive(Debug, Clone, Serialize)]
pub struct ScanState {
    pub status: ScanStatus,
    /// Files discovered so far; monotonic while scanning.
    pub files_scanned: u64,
    /// Total files found, set when a scan completes.
    pub total_files: Option<u64>,
    /// Diagnostic text, populated on start, completion, and error.
    pub message: Option<String>,
}

impl ScanState {
    /// Fresh idle state.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            status: ScanStatus::Idle,
            files_scanned: 0,
            total_files: None,
            message: None,
        }
    }

    /// State for a scan that is just starting.
    #[must_use]
    pub(crate) fn starting() -> Self {
        Self {
            status: ScanStatus::Scanning,
            files_scanned: 0,
            total_files: None,
            message: Some("Starting scan...".to_string()),
        }
    }

    /// Whether a crawl task is currently active.
    #[must_use]
    pub fn is_scanning(&self) -> bool {
        self.status == ScanStatus::Scanning
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::idle()
    }
}
