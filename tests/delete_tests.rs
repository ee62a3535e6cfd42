//! Deletion executor behavior: the fail-closed safety check, per-id
//! failure isolation, and 404-as-success.

mod common;

use std::time::Duration;

use common::{fast_backoff, file_item, folder_item, record, token, FakeDrive};
use drivedupe::actions::delete_batch;
use drivedupe::duplicates::find_duplicates;
use drivedupe::error::Error;
use drivedupe::remote::ApiError;
use drivedupe::scanner::FileRecord;
use drivedupe::ScanSession;

/// f1 oldest (100 B), f2 newer (100 B), f3 newest (200 B), all hash "h".
fn scenario_files() -> Vec<FileRecord> {
    vec![
        record("f1", "f1.bin", 100, 100, Some("h")),
        record("f2", "f2.bin", 100, 200, Some("h")),
        record("f3", "f3.bin", 200, 300, Some("h")),
    ]
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_string()).collect()
}

#[tokio::test]
async fn deleting_an_entire_group_is_rejected_before_any_call() {
    let drive = FakeDrive::new();
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let err = delete_batch(
        &drive,
        &fast_backoff(),
        &token(),
        &ids(&["f1", "f2", "f3"]),
        &groups,
    )
    .await
    .unwrap_err();

    match err {
        Error::UnsafeDelete { fingerprint } => assert_eq!(fingerprint, "h"),
        other => panic!("expected UnsafeDelete, got {other:?}"),
    }
    // Fail-closed: nothing was deleted anywhere in the batch
    assert!(drive.deleted.lock().unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_proper_subset_succeeds() {
    let drive = FakeDrive::new();
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let result = delete_batch(&drive, &fast_backoff(), &token(), &ids(&["f2", "f3"]), &groups)
        .await
        .unwrap();

    assert_eq!(result.deleted, vec!["f2".to_string(), "f3".to_string()]);
    assert!(result.failed.is_empty());

    // With f2 and f3 gone only one copy remains, so the group drops out
    let remaining: Vec<FileRecord> = files
        .into_iter()
        .filter(|f| !result.deleted.contains(&f.id))
        .collect();
    assert!(find_duplicates(&remaining, None).is_empty());
}

#[tokio::test]
async fn not_found_counts_as_already_deleted() {
    let drive = FakeDrive::new()
        .with_delete_outcome("f2", Err(ApiError::Request { status: 404 }));
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let result = delete_batch(&drive, &fast_backoff(), &token(), &ids(&["f2"]), &groups)
        .await
        .unwrap();

    assert_eq!(result.deleted, vec!["f2".to_string()]);
    assert!(result.failed.is_empty());
}

#[tokio::test]
async fn other_client_errors_are_recorded_per_id() {
    let drive = FakeDrive::new()
        .with_delete_outcome("f2", Err(ApiError::Request { status: 403 }));
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let result = delete_batch(&drive, &fast_backoff(), &token(), &ids(&["f2", "f3"]), &groups)
        .await
        .unwrap();

    // The 403 does not abort the sibling delete
    assert_eq!(result.deleted, vec!["f3".to_string()]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].id, "f2");
    assert!(result.failed[0].reason.contains("403"));
}

#[tokio::test]
async fn retry_exhaustion_is_per_id() {
    // fast_backoff allows 3 attempts; exhaust them for f2 only
    let drive = FakeDrive::new()
        .with_delete_outcome("f2", Err(ApiError::Server { status: 503 }))
        .with_delete_outcome("f2", Err(ApiError::Server { status: 503 }))
        .with_delete_outcome("f2", Err(ApiError::Server { status: 503 }));
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let result = delete_batch(&drive, &fast_backoff(), &token(), &ids(&["f2", "f3"]), &groups)
        .await
        .unwrap();

    assert_eq!(result.deleted, vec!["f3".to_string()]);
    assert_eq!(result.failed.len(), 1);
    assert_eq!(result.failed[0].id, "f2");
    assert!(result.failed[0].reason.contains("retry budget exhausted"));
}

#[tokio::test]
async fn transient_delete_failure_recovers() {
    let drive = FakeDrive::new()
        .with_delete_outcome("f2", Err(ApiError::RateLimited { retry_after: Some(0) }))
        .with_delete_outcome("f2", Ok(()));
    let files = scenario_files();
    let groups = find_duplicates(&files, None);

    let result = delete_batch(&drive, &fast_backoff(), &token(), &ids(&["f2"]), &groups)
        .await
        .unwrap();

    assert_eq!(result.deleted, vec!["f2".to_string()]);
    assert!(result.failed.is_empty());
}

#[tokio::test]
async fn session_delete_prunes_the_file_set() {
    let drive = FakeDrive::new()
        .with_children(
            "",
            vec![
                file_item("f1", "f1.bin", 100, 100, Some("h")),
                file_item("f2", "f2.bin", 100, 200, Some("h")),
                folder_item("d1", "sub"),
            ],
        )
        .with_children("d1", vec![file_item("f3", "f3.bin", 200, 300, Some("h"))]);
    let session = ScanSession::with_backoff(drive, fast_backoff());

    session.start_scan(token());
    for _ in 0..500 {
        if !session.status().is_scanning() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(session.files().len(), 3);

    let result = session
        .delete_files(&ids(&["f2", "f3"]), &token())
        .await
        .unwrap();
    assert_eq!(result.deleted.len(), 2);

    // The surviving copy is no longer a duplicate of anything
    assert_eq!(session.files().len(), 1);
    assert_eq!(session.files()[0].id, "f1");
    assert!(session.duplicates(None).is_empty());
    assert_eq!(session.stats().duplicate_groups, 0);
}

#[tokio::test]
async fn session_delete_rejects_unsafe_batches() {
    let drive = FakeDrive::new().with_children(
        "",
        vec![
            file_item("f1", "f1.bin", 100, 100, Some("h")),
            file_item("f2", "f2.bin", 100, 200, Some("h")),
        ],
    );
    let probe = drive.clone();
    let session = ScanSession::with_backoff(drive, fast_backoff());

    session.start_scan(token());
    for _ in 0..500 {
        if !session.status().is_scanning() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let err = session
        .delete_files(&ids(&["f1", "f2"]), &token())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnsafeDelete { .. }));

    // File set untouched, nothing deleted remotely
    assert_eq!(session.files().len(), 2);
    assert!(probe.deleted.lock().unwrap().is_empty());
}
