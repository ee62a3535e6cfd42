//! Safety-checked deletion of redundant copies.
//!
//! # Safety
//!
//! Deletion is fail-closed: if a requested batch would remove every member
//! of any duplicate group, the whole batch is rejected before any network
//! call and the caller must resubmit a corrected request. The executor
//! never silently protects one arbitrary copy, since that would leave the
//! caller believing ids were deleted that were not.
//!
//! Past the safety check, failures are per id: a rejected or
//! retry-exhausted delete is recorded and its siblings proceed.

use std::collections::HashSet;

use serde::Serialize;

use crate::duplicates::DuplicateGroup;
use crate::error::Error;
use crate::remote::{AccessToken, ApiError, BackoffPolicy, DriveApi};

/// A single id the executor could not delete, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct DeleteFailure {
    pub id: String,
    pub reason: String,
}

/// Outcome of one delete batch. Transient; returned once per call and not
/// persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DeleteResult {
    /// Ids actually removed, including ids the store had already deleted.
    pub deleted: Vec<String>,
    /// Per-id failures; siblings in the batch are unaffected.
    pub failed: Vec<DeleteFailure>,
}

/// Verify that `ids` leaves at least one member alive in every group.
///
/// # Errors
///
/// [`Error::UnsafeDelete`] naming the first group whose member set is
/// fully covered by the request. Nothing has been deleted at that point.
pub fn validate_preserves_copy(ids: &[String], groups: &[DuplicateGroup]) -> Result<(), Error> {
    let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
    for group in groups {
        let covered = group
            .files
            .iter()
            .all(|file| requested.contains(file.id.as_str()));
        if covered {
            log::warn!(
                "rejecting delete batch: would remove all {} copies of group {}",
                group.len(),
                group.fingerprint
            );
            return Err(Error::UnsafeDelete {
                fingerprint: short_fingerprint(&group.fingerprint),
            });
        }
    }
    Ok(())
}

/// Delete each id through the shared backoff policy, one at a time.
///
/// Concurrency is deliberately bounded to a single in-flight request so a
/// large batch cannot amplify rate-limit pressure. A 404 means the item is
/// already gone and counts as success; other rejections and exhausted
/// retry budgets are recorded per id without aborting siblings.
///
/// The executor does not own the scanned file set; callers prune the
/// successfully deleted ids themselves.
///
/// # Errors
///
/// [`Error::UnsafeDelete`] when the batch fails the upfront safety check;
/// no deletions are performed in that case.
pub async fn delete_batch<A: DriveApi>(
    api: &A,
    backoff: &BackoffPolicy,
    token: &AccessToken,
    ids: &[String],
    groups: &[DuplicateGroup],
) -> Result<DeleteResult, Error> {
    validate_preserves_copy(ids, groups)?;

    let mut result = DeleteResult::default();
    for id in ids {
        match backoff.run("delete item", || api.delete_item(token, id)).await {
            Ok(()) => {
                log::info!("deleted remote item {id}");
                result.deleted.push(id.clone());
            }
            Err(Error::Api(ApiError::Request { status: 404 })) => {
                log::debug!("item {id} already gone, counting as deleted");
                result.deleted.push(id.clone());
            }
            Err(err) => {
                log::warn!("failed to delete {id}: {err}");
                result.failed.push(DeleteFailure {
                    id: id.clone(),
                    reason: err.to_string(),
                });
            }
        }
    }

    log::info!(
        "delete batch finished: {} deleted, {} failed",
        result.deleted.len(),
        result.failed.len()
    );
    Ok(result)
}

/// Shorten a fingerprint for error messages.
fn short_fingerprint(fingerprint: &str) -> String {
    if fingerprint.chars().count() > 8 {
        let prefix: String = fingerprint.chars().take(8).collect();
        format!("{prefix}...")
    } else {
        fingerprint.to_string()
    }
}
