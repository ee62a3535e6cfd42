//! Remote storage API surface.
//!
//! # Overview
//!
//! Everything that touches the network lives under this module:
//! - [`client`]: `reqwest`-based [`GraphClient`] speaking a Microsoft-Graph
//!   style drive API (paginated children listings, delete-by-id)
//! - [`backoff`]: the retry/backoff policy shared by the crawler and the
//!   deletion executor
//!
//! The crawl and delete paths are generic over the [`DriveApi`] trait so
//! tests can substitute an in-memory drive for the real client.

pub mod backoff;
pub mod client;

use std::fmt;
use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

pub use backoff::BackoffPolicy;
pub use client::GraphClient;

/// Bearer credential handed to the core by the (out-of-scope) auth layer.
///
/// The `Debug` implementation redacts the secret so tokens never land in
/// logs or error messages.
#[derive(Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a bearer token string.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// The raw secret, for building `Authorization` headers.
    #[must_use]
    pub fn secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Outcome classification for a single remote request.
///
/// The variants map one-to-one onto the transport signals the remote store
/// emits; [`BackoffPolicy`](backoff::BackoffPolicy) decides what to do with
/// each.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP 429. Retryable after the server-suggested delay, when present.
    #[error("rate limited by remote API, retry-after: {retry_after:?}s")]
    RateLimited {
        /// Seconds from the `Retry-After` header, if the server sent one.
        retry_after: Option<u64>,
    },

    /// HTTP 5xx. Transient; retryable with exponential backoff.
    #[error("remote API server error, status {status}")]
    Server { status: u16 },

    /// Any other non-2xx status. Permanent; never retried.
    #[error("remote API rejected the request, status {status}")]
    Request { status: u16 },

    /// Connection-level failure (DNS, TLS, timeout). Treated as transient.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the expected JSON shape. Permanent.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status associated with this error, if one was observed.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::Server { status } | Self::Request { status } => Some(*status),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            Self::Decode(_) => None,
        }
    }

    /// Whether a retry of the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Server { .. } | Self::Transport(_)
        )
    }
}

/// A folder-like node in the remote hierarchy that holds child items.
#[derive(Debug, Clone)]
pub struct RemoteContainer {
    pub id: String,
    pub name: String,
}

/// A leaf file with the content metadata the remote store reports.
#[derive(Debug, Clone)]
pub struct RemoteFile {
    pub id: String,
    pub name: String,
    /// Absent for some item kinds; callers default it to zero.
    pub size: Option<u64>,
    pub last_modified: DateTime<Utc>,
    /// Strong content hash, when the store computed one.
    pub sha256: Option<String>,
    /// Weaker fallback hash some stores report instead.
    pub quick_xor: Option<String>,
    /// Id of the containing folder, when known.
    pub parent_id: Option<String>,
}

/// One item from a listing page, already classified.
#[derive(Debug, Clone)]
pub enum RemoteItem {
    Container(RemoteContainer),
    File(RemoteFile),
}

/// One page of a children listing.
#[derive(Debug, Clone)]
pub struct ItemPage {
    pub items: Vec<RemoteItem>,
    /// Continuation cursor; present when more results exist.
    pub next_cursor: Option<String>,
}

/// Client-side view of the remote storage API.
///
/// Implementations classify transport outcomes into [`ApiError`] variants
/// but do not retry; retry scheduling belongs to the caller's
/// [`BackoffPolicy`].
pub trait DriveApi: Send + Sync {
    /// List one page of children of `container_id` (`None` is the drive
    /// root), following `cursor` when continuing a previous page.
    fn list_children(
        &self,
        token: &AccessToken,
        container_id: Option<&str>,
        cursor: Option<&str>,
    ) -> impl Future<Output = Result<ItemPage, ApiError>> + Send;

    /// Delete a single item by id.
    fn delete_item(
        &self,
        token: &AccessToken,
        item_id: &str,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;
}
