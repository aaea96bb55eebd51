//! Integration tests for progress tracking
//!
//! Exercises the lifecycle rules through the store factory, the way the CLI
//! builds its progress store.

use archivist::adapters::store::create_progress_storage;
use archivist::config::{StoreBackend, StoreConfig};
use archivist::core::state::{ExportStatus, ProgressManager};
use archivist::domain::{ArchivistError, ExportUnit, JobHandle, LogGroupName, Region};
use std::collections::HashSet;

async fn memory_manager() -> ProgressManager {
    let config = StoreConfig {
        backend: StoreBackend::Memory,
        ..Default::default()
    };
    ProgressManager::new_with_storage(create_progress_storage(&config).await.unwrap())
}

fn unit(region: &str, name: &str) -> ExportUnit {
    ExportUnit::new(Region::new(region).unwrap(), LogGroupName::new(name).unwrap())
}

fn task(id: &str) -> JobHandle {
    JobHandle::new(id).unwrap()
}

#[tokio::test]
async fn test_full_lifecycle() {
    let progress = memory_manager().await;
    let u = unit("us-east-1", "/aws/lambda/orders");

    assert!(progress.get_status(&u.region, &u.name).await.unwrap().is_none());

    let submitted = progress
        .record_submitted(&u.region, &u.name, &task("t-1"))
        .await
        .unwrap();
    assert_eq!(submitted.status, ExportStatus::InProgress);
    assert_eq!(submitted.attempts, 1);
    assert!(submitted.submitted_at.is_some());

    let failed = progress
        .record_failed(&u.region, &u.name, Some(&task("t-1")), "CANCELLED")
        .await
        .unwrap();
    assert_eq!(failed.status, ExportStatus::Failed);
    assert_eq!(failed.last_error.as_deref(), Some("CANCELLED"));

    let retried = progress
        .record_submitted(&u.region, &u.name, &task("t-2"))
        .await
        .unwrap();
    assert_eq!(retried.attempts, 2);
    assert!(retried.last_error.is_none());

    let completed = progress
        .record_completed(&u.region, &u.name, &task("t-2"))
        .await
        .unwrap();
    assert_eq!(completed.status, ExportStatus::Completed);
    assert_eq!(completed.job_handle, Some(task("t-2")));
    assert!(completed.last_export_duration().is_some());
}

#[tokio::test]
async fn test_completed_never_regresses() {
    let progress = memory_manager().await;
    let u = unit("us-east-1", "/app");

    progress
        .record_submitted(&u.region, &u.name, &task("t-1"))
        .await
        .unwrap();
    progress
        .record_completed(&u.region, &u.name, &task("t-1"))
        .await
        .unwrap();

    let err = progress
        .record_failed(&u.region, &u.name, None, "late failure")
        .await
        .unwrap_err();
    assert!(matches!(err, ArchivistError::State(_)));

    let stored = progress.get_status(&u.region, &u.name).await.unwrap().unwrap();
    assert_eq!(stored.status, ExportStatus::Completed);
}

#[tokio::test]
async fn test_same_name_in_two_regions_is_tracked_separately() {
    let progress = memory_manager().await;
    let east = unit("us-east-1", "/shared/name");
    let west = unit("eu-west-1", "/shared/name");

    progress
        .record_submitted(&east.region, &east.name, &task("t-e"))
        .await
        .unwrap();
    progress
        .record_completed(&east.region, &east.name, &task("t-e"))
        .await
        .unwrap();

    let next = progress
        .next_pending_unit(&[east.clone(), west.clone()], &HashSet::new())
        .await
        .unwrap();
    assert_eq!(next, Some(west));
}

#[tokio::test]
async fn test_list_records_is_ordered_by_region_then_name() {
    let progress = memory_manager().await;

    for u in [
        unit("us-east-1", "/b"),
        unit("eu-west-1", "/z"),
        unit("us-east-1", "/a"),
    ] {
        progress
            .record_submission_error(&u.region, &u.name, "throttled")
            .await
            .unwrap();
    }

    let listed: Vec<String> = progress
        .list_records()
        .await
        .unwrap()
        .iter()
        .map(|r| r.id())
        .collect();
    assert_eq!(listed, vec!["eu-west-1#/z", "us-east-1#/a", "us-east-1#/b"]);
}
