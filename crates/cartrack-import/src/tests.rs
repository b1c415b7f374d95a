//! End-to-end pipeline tests over the in-memory SQLite store.

use cartrack_core::{
  car::NewCar,
  dedup::DuplicateError,
  status::CarStatus,
  store::{CarStore, StoreError as _},
  validate::{Field, RawRow},
};
use cartrack_store_sqlite::SqliteStore;

use crate::pipeline::{import_batch, ImportError, ImportOptions};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn row(id: &str, plate: &str) -> RawRow {
  RawRow {
    id:    id.into(),
    make:  "Ford".into(),
    model: "Focus".into(),
    color: "Silver".into(),
    license_plate: plate.into(),
  }
}

fn roster(n: usize) -> Vec<RawRow> {
  (1..=n)
    .map(|i| row(&i.to_string(), &format!("IMP-{i:03}")))
    .collect()
}

#[tokio::test]
async fn import_commits_cars_with_initial_history() {
  let s = store().await;

  let report = import_batch(&s, roster(3), &ImportOptions::default())
    .await
    .unwrap();

  assert_eq!(report.total_rows, 3);
  assert_eq!(report.committed, 3);
  assert_eq!(report.batches, 1);
  assert!(!report.dry_run);

  assert_eq!(s.car_count().await.unwrap(), 3);
  for i in 1..=3 {
    let history = s.history(i).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, CarStatus::PreArrival);
  }
}

#[tokio::test]
async fn five_rows_at_batch_size_two_make_three_batches() {
  let s = store().await;
  let options = ImportOptions { batch_size: 2, ..ImportOptions::default() };

  let report = import_batch(&s, roster(5), &options).await.unwrap();

  // 2 + 2 + 1
  assert_eq!(report.batches, 3);
  assert_eq!(report.committed, 5);

  assert_eq!(s.car_count().await.unwrap(), 5);
  for i in 1..=5 {
    assert_eq!(s.history(i).await.unwrap().len(), 1);
  }
}

#[tokio::test]
async fn one_bad_row_rejects_the_whole_roster() {
  let s = store().await;
  let mut rows = roster(3);
  rows[1].color = String::new();

  let err = import_batch(&s, rows, &ImportOptions::default())
    .await
    .unwrap_err();

  match err {
    ImportError::Validation(errors) => {
      assert_eq!(errors.len(), 1);
      assert_eq!(errors[0].row, 2);
      assert_eq!(errors[0].field, Field::Color);
    }
    other => panic!("expected Validation, got {other}"),
  }

  // All-or-nothing: zero rows committed.
  assert_eq!(s.car_count().await.unwrap(), 0);
}

#[tokio::test]
async fn best_effort_skips_bad_rows_and_commits_the_rest() {
  let s = store().await;
  let mut rows = roster(4);
  rows[2].make = String::new();

  let options = ImportOptions { best_effort: true, ..ImportOptions::default() };
  let report = import_batch(&s, rows, &options).await.unwrap();

  assert_eq!(report.total_rows, 4);
  assert_eq!(report.skipped_rows, 1);
  assert_eq!(report.committed, 3);
  assert_eq!(s.car_count().await.unwrap(), 3);
  assert!(s.get_car(3).await.unwrap().is_none());
}

#[tokio::test]
async fn dry_run_commits_nothing_but_counts_everything() {
  let s = store().await;
  let options = ImportOptions { dry_run: true, ..ImportOptions::default() };

  let report = import_batch(&s, roster(5), &options).await.unwrap();

  assert!(report.dry_run);
  assert_eq!(report.valid_rows, 5);
  assert_eq!(report.committed, 0);
  assert_eq!(report.batches, 0);

  assert_eq!(s.car_count().await.unwrap(), 0);

  // The real run commits exactly what the dry run promised.
  let real = import_batch(&s, roster(5), &ImportOptions::default())
    .await
    .unwrap();
  assert_eq!(real.committed, report.valid_rows);
}

#[tokio::test]
async fn duplicates_within_roster_are_all_reported() {
  let s = store().await;
  let rows = vec![
    row("1", "DUP-001"),
    row("2", "dup-001"),
    row("1", "DUP-003"),
  ];

  let err = import_batch(&s, rows, &ImportOptions::default())
    .await
    .unwrap_err();

  match err {
    ImportError::Duplicates(errors) => {
      assert_eq!(errors.len(), 2);
      assert!(matches!(
        errors[0],
        DuplicateError::PlateInBatch { row: 2, first_row: 1, .. }
      ));
      assert!(matches!(
        errors[1],
        DuplicateError::IdInBatch { row: 3, first_row: 1, id: 1 }
      ));
    }
    other => panic!("expected Duplicates, got {other}"),
  }

  assert_eq!(s.car_count().await.unwrap(), 0);
}

#[tokio::test]
async fn storage_failure_reports_the_commit_boundary() {
  let s = store().await;
  // A car already holds id 2 under an unrelated plate. Deduplication only
  // checks plates, so the clash surfaces as a storage failure when the
  // second single-row batch hits the primary key.
  s.create_cars(&[NewCar {
    id:            2,
    make:          "Mazda".into(),
    model:         "CX-5".into(),
    color:         "Red".into(),
    license_plate: "SEED-02".into(),
  }])
  .await
  .unwrap();

  let rows = vec![row("1", "BND-001"), row("2", "BND-002"), row("3", "BND-003")];
  let options = ImportOptions { batch_size: 1, ..ImportOptions::default() };
  let err = import_batch(&s, rows, &options).await.unwrap_err();

  match err {
    ImportError::Storage { committed, batch_index, source } => {
      assert_eq!(committed, 1);
      assert_eq!(batch_index, 1);
      assert!(source.is_constraint_violation());
    }
    other => panic!("expected Storage, got {other}"),
  }

  // The batch before the failure stays committed, with its initial history;
  // the batch after it was never attempted.
  assert_eq!(s.car_count().await.unwrap(), 2);
  assert_eq!(s.history(1).await.unwrap().len(), 1);
  assert!(s.get_car(3).await.unwrap().is_none());
}

#[tokio::test]
async fn rerun_without_clear_fails_on_every_known_plate() {
  let s = store().await;
  import_batch(&s, roster(3), &ImportOptions::default())
    .await
    .unwrap();

  let err = import_batch(&s, roster(3), &ImportOptions::default())
    .await
    .unwrap_err();

  match err {
    ImportError::Duplicates(errors) => {
      assert_eq!(errors.len(), 3);
      assert!(
        errors
          .iter()
          .all(|e| matches!(e, DuplicateError::PlateInStorage { .. }))
      );
    }
    other => panic!("expected Duplicates, got {other}"),
  }

  // Zero new rows committed by the failed re-run.
  assert_eq!(s.car_count().await.unwrap(), 3);
}

#[tokio::test]
async fn clear_then_import_leaves_exactly_the_new_roster() {
  let s = store().await;
  import_batch(&s, roster(4), &ImportOptions::default())
    .await
    .unwrap();
  s.transition(1, CarStatus::CheckedIn, None).await.unwrap();

  // Same plates again; only legal because of the clear.
  let options = ImportOptions { clear: true, ..ImportOptions::default() };
  let report = import_batch(&s, roster(2), &options).await.unwrap();

  assert!(report.cleared);
  assert_eq!(report.committed, 2);
  assert_eq!(s.car_count().await.unwrap(), 2);
  for i in 1..=2 {
    assert_eq!(s.history(i).await.unwrap().len(), 1);
  }
}

#[tokio::test]
async fn dry_run_with_clear_still_writes_nothing() {
  let s = store().await;
  import_batch(&s, roster(2), &ImportOptions::default())
    .await
    .unwrap();

  let options = ImportOptions {
    clear: true,
    dry_run: true,
    ..ImportOptions::default()
  };
  let report = import_batch(&s, roster(2), &options).await.unwrap();

  assert!(report.dry_run);
  assert!(!report.cleared);
  assert_eq!(s.car_count().await.unwrap(), 2);
}
