//! Crate-level error types.
//!
//! The remote seam has its own [`ApiError`](crate::remote::ApiError)
//! classifying individual request outcomes; this module defines what
//! surfaces to callers of the core: permanent request failures, retry-budget
//! exhaustion, and the fail-closed deletion safety rejection.

use thiserror::Error;

use crate::remote::ApiError;

/// Errors surfaced by the dedup core.
#[derive(Debug, Error)]
pub enum Error {
    /// A remote request failed permanently (non-retryable status or a
    /// malformed response body).
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The retry budget for an operation was exhausted.
    ///
    /// Fatal to the current crawl, or to a single delete within a batch;
    /// never fatal to sibling deletes.
    #[error("retry budget exhausted for {operation}, last status: {last_status:?}")]
    RetryExhausted {
        /// Short name of the operation that gave up.
        operation: String,
        /// HTTP status observed on the final attempt, if any.
        last_status: Option<u16>,
    },

    /// A delete request would remove every copy in a duplicate group.
    ///
    /// The entire batch is rejected before any deletion is performed.
    #[error("cannot delete all copies of duplicate group (hash: {fingerprint})")]
    UnsafeDelete {
        /// Shortened fingerprint of the group that would be destroyed.
        fingerprint: String,
    },
}
