//! DriveDupe - duplicate finder core for remote cloud drives.
//!
//! Crawls a paginated, rate-limited cloud-storage tree, groups files by
//! content hash into ranked duplicate groups, and deletes redundant copies
//! behind a fail-closed safety check that never leaves a group with zero
//! surviving members.
//!
//! The crate is transport-agnostic toward its callers: [`ScanSession`]
//! exposes plain methods (start/status/reset, duplicate listing, stats,
//! deletion) that an HTTP layer can wrap however it prefers. Credentials are
//! handed in as an [`AccessToken`](remote::AccessToken); acquiring and
//! refreshing them is out of scope here.

pub mod actions;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod remote;
pub mod scanner;
pub mod session;

pub use error::Error;
pub use session::ScanSession;
