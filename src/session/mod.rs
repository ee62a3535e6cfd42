//! Scan session: shared state, the background crawl task, and the control
//! surface tying the crawler, grouper, and deleter together.
//!
//! # Concurrency
//!
//! The session data (scan state plus file set) sits behind one mutex. The
//! active crawl task is its only writer; status queries clone snapshots
//! under the lock, so a reader can never observe a half-applied update.
//!
//! A generation counter makes stale crawl tasks visible to themselves:
//! `reset` and every new `start_scan` bump the generation, and a task whose
//! generation no longer matches stops without touching newer state. There
//! is no cancellation primitive beyond that; an abandoned crawl finishes
//! its current request harmlessly and its results are simply not read.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::actions::delete::{delete_batch, DeleteResult};
use crate::duplicates::{
    calculate_stats, find_duplicates, DedupStats, DuplicateFilter, DuplicateGroup,
};
use crate::error::Error;
use crate::remote::{AccessToken, BackoffPolicy, DriveApi};
use crate::scanner::{Crawler, FileRecord, ScanState, ScanStatus};

/// Everything the crawl task and the readers share.
#[derive(Debug, Default)]
struct SessionData {
    scan: ScanState,
    files: Vec<FileRecord>,
}

#[derive(Debug, Default)]
struct Shared {
    data: Mutex<SessionData>,
    /// Bumped by `start_scan` and `reset`; a crawl task holding an older
    /// value knows it has been superseded.
    generation: AtomicU64,
}

/// One logical dedup session over a single remote drive.
///
/// Cheap to clone; clones share the same state, so an HTTP layer can hand
/// one handle to every request handler.
pub struct ScanSession<A> {
    api: Arc<A>,
    backoff: BackoffPolicy,
    shared: Arc<Shared>,
}

impl<A> Clone for ScanSession<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            backoff: self.backoff.clone(),
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<A: DriveApi + 'static> ScanSession<A> {
    /// Create a session with the default backoff policy.
    #[must_use]
    pub fn new(api: A) -> Self {
        Self::with_backoff(api, BackoffPolicy::default())
    }

    /// Create a session with a custom backoff policy.
    #[must_use]
    pub fn with_backoff(api: A, backoff: BackoffPolicy) -> Self {
        Self {
            api: Arc::new(api),
            backoff,
            shared: Arc::new(Shared::default()),
        }
    }

    /// Start a background scan from the drive root.
    ///
    /// Idempotent while a scan is running: the current state is returned
    /// unchanged and no second crawl task is spawned, since the crawl task
    /// is the single writer of the shared file set. From any other status
    /// the previous results are discarded and a fresh crawl begins.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_scan(&self, token: AccessToken) -> ScanState {
        let (state, generation) = {
            let mut data = self.shared.data.lock().unwrap();
            if data.scan.is_scanning() {
                log::debug!("scan already in progress, not starting another");
                return data.scan.clone();
            }
            let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
            data.files.clear();
            data.scan = ScanState::starting();
            (data.scan.clone(), generation)
        };

        log::info!("starting scan (generation {generation})");
        tokio::spawn(crawl_task(
            Arc::clone(&self.api),
            Arc::clone(&self.shared),
            self.backoff.clone(),
            token,
            generation,
        ));

        state
    }

    /// Current scan progress snapshot.
    #[must_use]
    pub fn status(&self) -> ScanState {
        self.shared.data.lock().unwrap().scan.clone()
    }

    /// Abandon any previous results and return to idle.
    ///
    /// An in-flight crawl task is not interrupted mid-request; it notices
    /// the generation bump at its next write and stops harmlessly.
    pub fn reset(&self) {
        let mut data = self.shared.data.lock().unwrap();
        self.shared.generation.fetch_add(1, Ordering::SeqCst);
        data.files.clear();
        data.scan = ScanState::idle();
        log::info!("scan state reset");
    }

    /// Snapshot of the files collected by the current or last scan.
    #[must_use]
    pub fn files(&self) -> Vec<FileRecord> {
        self.shared.data.lock().unwrap().files.clone()
    }

    /// Ranked duplicate groups over the current file set.
    #[must_use]
    pub fn duplicates(&self, filter: Option<&DuplicateFilter>) -> Vec<DuplicateGroup> {
        let files = self.files();
        find_duplicates(&files, filter)
    }

    /// Aggregate counters over the current file set and its groups.
    #[must_use]
    pub fn stats(&self) -> DedupStats {
        let files = self.files();
        let groups = find_duplicates(&files, None);
        calculate_stats(&files, &groups)
    }

    /// Delete the requested ids after the fail-closed safety check, then
    /// prune the successfully deleted ids from the session's file set.
    ///
    /// # Errors
    ///
    /// [`Error::UnsafeDelete`] when the batch would destroy an entire
    /// duplicate group; nothing is deleted in that case.
    pub async fn delete_files(
        &self,
        ids: &[String],
        token: &AccessToken,
    ) -> Result<DeleteResult, Error> {
        let files = self.files();
        let groups = find_duplicates(&files, None);
        let result = delete_batch(self.api.as_ref(), &self.backoff, token, ids, &groups).await?;

        if !result.deleted.is_empty() {
            let deleted: HashSet<&str> = result.deleted.iter().map(String::as_str).collect();
            let mut data = self.shared.data.lock().unwrap();
            data.files.retain(|file| !deleted.contains(file.id.as_str()));
        }
        Ok(result)
    }
}

/// Background crawl: drives the crawler and publishes progress, stopping
/// silently once superseded by a reset or a newer scan.
async fn crawl_task<A: DriveApi>(
    api: Arc<A>,
    shared: Arc<Shared>,
    backoff: BackoffPolicy,
    token: AccessToken,
    generation: u64,
) {
    let mut crawler = Crawler::new(api.as_ref(), &token, &backoff);
    loop {
        match crawler.next_file().await {
            Ok(Some(record)) => {
                let mut data = shared.data.lock().unwrap();
                if shared.generation.load(Ordering::SeqCst) != generation {
                    log::debug!("crawl task superseded, discarding further results");
                    return;
                }
                data.scan.files_scanned += 1;
                log::trace!("discovered {}", record.path);
                data.files.push(record);
            }
            Ok(None) => {
                let mut data = shared.data.lock().unwrap();
                if shared.generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                let found = data.scan.files_scanned;
                data.scan.status = ScanStatus::Complete;
                data.scan.total_files = Some(found);
                data.scan.message = Some(format!("Scan complete. Found {found} files."));
                log::info!("scan complete: {found} file(s)");
                return;
            }
            Err(err) => {
                let mut data = shared.data.lock().unwrap();
                if shared.generation.load(Ordering::SeqCst) != generation {
                    return;
                }
                // Keep whatever was collected so callers can inspect it.
                data.scan.status = ScanStatus::Error;
                data.scan.message = Some(err.to_string());
                log::error!(
                    "scan failed after {} file(s): {err}",
                    data.scan.files_scanned
                );
                return;
            }
        }
    }
}
