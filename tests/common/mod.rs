//! Shared test fixtures: an in-memory [`DriveApi`] implementation and
//! record builders.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use drivedupe::remote::{
    AccessToken, ApiError, BackoffPolicy, DriveApi, ItemPage, RemoteContainer, RemoteFile,
    RemoteItem,
};
use drivedupe::scanner::FileRecord;

pub fn token() -> AccessToken {
    AccessToken::new("test-token")
}

/// Tiny backoff budgets so failure-path tests finish quickly.
pub fn fast_backoff() -> BackoffPolicy {
    BackoffPolicy::new(
        3,
        Duration::from_millis(1),
        Duration::from_millis(4),
        Duration::from_millis(1),
    )
}

pub fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn file_item(
    id: &str,
    name: &str,
    size: u64,
    modified_secs: i64,
    sha256: Option<&str>,
) -> RemoteItem {
    RemoteItem::File(RemoteFile {
        id: id.to_string(),
        name: name.to_string(),
        size: Some(size),
        last_modified: timestamp(modified_secs),
        sha256: sha256.map(str::to_string),
        quick_xor: None,
        parent_id: None,
    })
}

pub fn folder_item(id: &str, name: &str) -> RemoteItem {
    RemoteItem::Container(RemoteContainer {
        id: id.to_string(),
        name: name.to_string(),
    })
}

pub fn record(id: &str, name: &str, size: u64, modified_secs: i64, hash: Option<&str>) -> FileRecord {
    FileRecord {
        id: id.to_string(),
        name: name.to_string(),
        path: format!("/{name}"),
        size,
        last_modified: timestamp(modified_secs),
        fingerprint: hash.map(str::to_string),
        parent_id: None,
    }
}

/// Scriptable in-memory drive.
///
/// Listings are keyed by container id (empty string = drive root) as a
/// sequence of pages; the fake hands out numeric continuation cursors
/// between them. Listing errors can be injected for specific call indices,
/// and delete outcomes scripted per id (default: success).
///
/// Clones share all counters and scripted state, so tests can keep a probe
/// handle after moving the drive into a session.
#[derive(Clone, Default)]
pub struct FakeDrive {
    listings: HashMap<String, Vec<Vec<RemoteItem>>>,
    list_errors: Arc<Mutex<HashMap<usize, ApiError>>>,
    delete_outcomes: Arc<Mutex<HashMap<String, VecDeque<Result<(), ApiError>>>>>,
    pub list_calls: Arc<AtomicUsize>,
    pub deleted: Arc<Mutex<Vec<String>>>,
    list_delay: Option<Duration>,
}

impl FakeDrive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of children for a container (empty id = root).
    pub fn with_children(mut self, container_id: &str, items: Vec<RemoteItem>) -> Self {
        self.listings
            .entry(container_id.to_string())
            .or_default()
            .push(items);
        self
    }

    /// Fail the `call_index`-th listing call (0-based, counted across all
    /// containers and retries) with `err`.
    pub fn with_list_error_at(self, call_index: usize, err: ApiError) -> Self {
        self.list_errors.lock().unwrap().insert(call_index, err);
        self
    }

    /// Script the next outcome of deleting `id` (consumed in order;
    /// default is success).
    pub fn with_delete_outcome(self, id: &str, outcome: Result<(), ApiError>) -> Self {
        self.delete_outcomes
            .lock()
            .unwrap()
            .entry(id.to_string())
            .or_default()
            .push_back(outcome);
        self
    }

    /// Delay every listing call; lets tests observe the scanning status.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }
}

impl DriveApi for FakeDrive {
    async fn list_children(
        &self,
        _token: &AccessToken,
        container_id: Option<&str>,
        cursor: Option<&str>,
    ) -> Result<ItemPage, ApiError> {
        let call = self.list_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.list_errors.lock().unwrap().remove(&call) {
            return Err(err);
        }
        if let Some(delay) = self.list_delay {
            tokio::time::sleep(delay).await;
        }

        let key = container_id.unwrap_or("");
        let pages = self.listings.get(key).cloned().unwrap_or_default();
        let index: usize = cursor.map_or(0, |c| c.parse().expect("numeric cursor"));
        let items = pages.get(index).cloned().unwrap_or_default();
        let next_cursor = (index + 1 < pages.len()).then(|| (index + 1).to_string());
        Ok(ItemPage { items, next_cursor })
    }

    async fn delete_item(&self, _token: &AccessToken, item_id: &str) -> Result<(), ApiError> {
        let outcome = self
            .delete_outcomes
            .lock()
            .unwrap()
            .get_mut(item_id)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Ok(()));
        if outcome.is_ok() {
            self.deleted.lock().unwrap().push(item_id.to_string());
        }
        outcome
    }
}
