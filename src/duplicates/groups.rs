//! Duplicate group construction and invariants.
//!
//! # Overview
//!
//! A [`DuplicateGroup`] holds every scanned file sharing one content
//! fingerprint. Members are ordered ascending by last-modified and the
//! earliest copy is the suggested keeper, on the theory that the oldest
//! copy is most likely the canonical original.

use serde::Serialize;

use crate::scanner::FileRecord;

/// Confirmed duplicate group of files sharing a content fingerprint.
#[derive(Debug, Clone, Serialize)]
pub struct DuplicateGroup {
    /// Content hash shared by every member.
    pub fingerprint: String,
    /// Members, ascending by last-modified; ties keep discovery order.
    pub files: Vec<FileRecord>,
    /// Sum of member sizes in bytes.
    pub total_size: u64,
    /// Bytes freed by deleting all but the suggested keeper.
    pub reclaimable_size: u64,
    /// Id of the earliest-modified member.
    pub suggested_keep_id: String,
}

impl DuplicateGroup {
    /// Build a group from the files sharing `fingerprint`.
    ///
    /// Returns `None` for fewer than two members; a single copy is not a
    /// duplicate.
    #[must_use]
    pub fn from_members(fingerprint: String, mut files: Vec<FileRecord>) -> Option<Self> {
        if files.len() < 2 {
            return None;
        }
        // Stable sort: equal timestamps keep their discovery order.
        files.sort_by_key(|file| file.last_modified);
        let total_size: u64 = files.iter().map(|file| file.size).sum();
        let keeper = &files[0];
        let reclaimable_size = total_size - keeper.size;
        let suggested_keep_id = keeper.id.clone();
        Some(Self {
            fingerprint,
            total_size,
            reclaimable_size,
            suggested_keep_id,
            files,
        })
    }

    /// Number of files in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// A group built via [`from_members`](Self::from_members) is never
    /// empty; provided for completeness.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Redundant copies beyond the keeper.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.files.len().saturating_sub(1)
    }

    /// Member ids in group order.
    #[must_use]
    pub fn member_ids(&self) -> Vec<&str> {
        self.files.iter().map(|file| file.id.as_str()).collect()
    }
}
