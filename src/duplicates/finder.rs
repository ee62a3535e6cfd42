//! Duplicate detection over scanned file records.
//!
//! # Filter ordering
//!
//! Filtering happens per file, before grouping. Filtering whole groups
//! after the fact can hide qualifying files that share a fingerprint with
//! non-qualifying ones and produce inconsistent group membership, so the
//! filter is applied to individual files first and groups are formed from
//! the survivors only.

use std::collections::HashMap;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecord;

/// File-level filter applied before grouping.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFilter {
    /// Keep files of at least this many bytes.
    pub min_size: Option<u64>,
    /// Extension allow-list, case-insensitive; leading dots in the values
    /// are ignored.
    pub extensions: Option<Vec<String>>,
    /// Keep files whose path starts with this folder prefix.
    pub folder_path: Option<String>,
}

impl DuplicateFilter {
    /// Whether `file` passes every configured criterion.
    #[must_use]
    pub fn matches(&self, file: &FileRecord) -> bool {
        if let Some(min_size) = self.min_size {
            if file.size < min_size {
                return false;
            }
        }

        if let Some(extensions) = &self.extensions {
            let Some(ext) = file.extension() else {
                return false;
            };
            let allowed = extensions
                .iter()
                .any(|value| value.trim_start_matches('.').eq_ignore_ascii_case(ext));
            if !allowed {
                return false;
            }
        }

        if let Some(folder) = &self.folder_path {
            // Normalize to exactly one trailing slash so "/foo" cannot
            // match "/foobar/...".
            let prefix = format!("{}/", folder.trim_end_matches('/'));
            if !file.path.starts_with(&prefix) {
                return false;
            }
        }

        true
    }
}

/// Group files by content fingerprint into ranked duplicate groups.
///
/// Files without a fingerprint can never be grouped and are skipped.
/// Partitions with fewer than two surviving members are discarded. The
/// result is ordered descending by reclaimable size so the highest-impact
/// cleanup opportunities come first; ties keep the fingerprint discovery
/// order.
#[must_use]
pub fn find_duplicates(
    files: &[FileRecord],
    filter: Option<&DuplicateFilter>,
) -> Vec<DuplicateGroup> {
    let mut order: Vec<&str> = Vec::new();
    let mut partitions: HashMap<&str, Vec<FileRecord>> = HashMap::new();

    for file in files {
        if let Some(filter) = filter {
            if !filter.matches(file) {
                continue;
            }
        }
        let Some(fingerprint) = file.fingerprint.as_deref() else {
            continue;
        };
        let members = partitions.entry(fingerprint).or_insert_with(|| {
            order.push(fingerprint);
            Vec::new()
        });
        members.push(file.clone());
    }

    let mut groups: Vec<DuplicateGroup> = order
        .into_iter()
        .filter_map(|fingerprint| {
            let members = partitions.remove(fingerprint)?;
            DuplicateGroup::from_members(fingerprint.to_string(), members)
        })
        .collect();

    groups.sort_by(|a, b| b.reclaimable_size.cmp(&a.reclaimable_size));

    log::debug!(
        "grouped {} file(s) into {} duplicate group(s)",
        files.len(),
        groups.len()
    );
    groups
}
