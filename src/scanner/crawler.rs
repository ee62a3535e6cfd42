//! Iterative crawler over the remote file hierarchy.
//!
//! # Traversal
//!
//! The crawl keeps an explicit work stack of pending containers instead of
//! recursing, so arbitrarily deep trees cannot exhaust the call stack. For
//! each container, pages are fetched through the shared
//! [`BackoffPolicy`](crate::remote::BackoffPolicy) and followed via the
//! continuation cursor until the listing is exhausted; discovered
//! sub-containers are pushed onto the stack together with the path prefix
//! of their contents.
//!
//! [`Crawler::next_file`] is the lazy output sequence: it returns the next
//! discovered [`FileRecord`], fetching further pages only on demand. The
//! sequence is finite and not restartable mid-stream; a fresh scan builds a
//! fresh crawler starting at the root.

use std::collections::VecDeque;

use crate::error::Error;
use crate::remote::{AccessToken, BackoffPolicy, DriveApi, RemoteFile, RemoteItem};
use crate::scanner::FileRecord;

/// A container waiting to be listed.
#[derive(Debug)]
struct PendingContainer {
    /// Remote id; `None` is the drive root.
    id: Option<String>,
    /// Path prefix for children (no trailing slash; empty at the root).
    path: String,
}

/// Work-stack crawler producing a finite, lazy sequence of file records.
pub struct Crawler<'a, A> {
    api: &'a A,
    token: &'a AccessToken,
    backoff: &'a BackoffPolicy,
    /// Containers not yet listed.
    work: Vec<PendingContainer>,
    /// Container currently being paged, when a cursor is outstanding.
    current: Option<PendingContainer>,
    cursor: Option<String>,
    /// Files from the last fetched page, drained one at a time.
    buffered: VecDeque<FileRecord>,
}

impl<'a, A: DriveApi> Crawler<'a, A> {
    /// Create a crawler positioned at the drive root.
    #[must_use]
    pub fn new(api: &'a A, token: &'a AccessToken, backoff: &'a BackoffPolicy) -> Self {
        Self {
            api,
            token,
            backoff,
            work: vec![PendingContainer {
                id: None,
                path: String::new(),
            }],
            current: None,
            cursor: None,
            buffered: VecDeque::new(),
        }
    }

    /// Next file in the traversal, or `None` once the tree is exhausted.
    ///
    /// # Errors
    ///
    /// Propagates permanent request failures and retry-budget exhaustion
    /// from the page fetch; the traversal cannot continue past either.
    pub async fn next_file(&mut self) -> Result<Option<FileRecord>, Error> {
        loop {
            if let Some(record) = self.buffered.pop_front() {
                return Ok(Some(record));
            }

            let (container, cursor) = match self.current.take() {
                Some(container) => (container, self.cursor.take()),
                None => match self.work.pop() {
                    Some(container) => (container, None),
                    None => return Ok(None),
                },
            };

            let api = self.api;
            let token = self.token;
            let container_id = container.id.as_deref();
            let page = self
                .backoff
                .run("list children", || {
                    api.list_children(token, container_id, cursor.as_deref())
                })
                .await?;

            log::debug!(
                "listed {} item(s) under '{}' (more: {})",
                page.items.len(),
                if container.path.is_empty() { "/" } else { container.path.as_str() },
                page.next_cursor.is_some()
            );

            for item in page.items {
                match item {
                    RemoteItem::Container(child) => {
                        self.work.push(PendingContainer {
                            path: format!("{}/{}", container.path, child.name),
                            id: Some(child.id),
                        });
                    }
                    RemoteItem::File(file) => {
                        self.buffered.push_back(into_record(file, &container.path));
                    }
                }
            }

            if page.next_cursor.is_some() {
                self.cursor = page.next_cursor;
                self.current = Some(container);
            }
        }
    }
}

/// Build a [`FileRecord`], preferring the strong hash over the weaker one
/// and defaulting a missing size to zero.
fn into_record(file: RemoteFile, parent_path: &str) -> FileRecord {
    let path = format!("{parent_path}/{}", file.name);
    FileRecord {
        path,
        id: file.id,
        name: file.name,
        size: file.size.unwrap_or(0),
        last_modified: file.last_modified,
        fingerprint: file.sha256.or(file.quick_xor),
        parent_id: file.parent_id,
    }
}
