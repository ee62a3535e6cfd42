//! Aggregate counters over a scan's files and duplicate groups.

use serde::Serialize;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// Dashboard-level aggregates derived from files and groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DedupStats {
    /// All scanned files, duplicates or not.
    pub total_files: usize,
    /// Number of duplicate groups.
    pub duplicate_groups: usize,
    /// Redundant copies across all groups (each group minus its keeper).
    pub total_duplicate_files: usize,
    /// Bytes freed by deleting every redundant copy.
    pub reclaimable_bytes: u64,
}

/// Compute aggregates. Pure: no filtering of its own, no side effects.
#[must_use]
pub fn calculate_stats(files: &[FileRecord], groups: &[DuplicateGroup]) -> DedupStats {
    DedupStats {
        total_files: files.len(),
        duplicate_groups: groups.len(),
        total_duplicate_files: groups.iter().map(DuplicateGroup::duplicate_count).sum(),
        reclaimable_bytes: groups.iter().map(|group| group.reclaimable_size).sum(),
    }
}
