//! The import orchestrator.
//!
//! Composes the row validator, the deduplicator, and a [`CarStore`] backend
//! over one roster batch: validate everything, reject wholesale on any
//! problem (unless best-effort), then commit in fixed-size atomic batches
//! with per-batch progress. Nothing is retried here; on a storage failure the
//! caller gets the exact commit boundary and decides for itself.

use std::fmt;

use cartrack_core::{
  car::NewCar,
  dedup::{BatchIndex, DuplicateError},
  validate::{validate, FieldError, RawRow},
  store::{CarStore, StoreError},
};
use serde::Serialize;
use thiserror::Error;

/// Batch size used when the caller does not choose one; matches the roster
/// sizes this tool is run against (a few hundred rows at most).
pub const DEFAULT_BATCH_SIZE: usize = 50;

// ─── Options & report ────────────────────────────────────────────────────────

/// Caller-supplied knobs for one import run. Passed in explicitly; the
/// pipeline reads no ambient configuration.
#[derive(Debug, Clone)]
pub struct ImportOptions {
  /// Delete all existing history and cars before importing. Irreversible.
  pub clear:       bool,
  /// Validate and deduplicate only; commit nothing.
  pub dry_run:     bool,
  /// Skip rows that fail validation instead of rejecting the whole roster.
  /// Duplicates still reject wholesale.
  pub best_effort: bool,
  /// Rows per atomic storage batch.
  pub batch_size:  usize,
}

impl Default for ImportOptions {
  fn default() -> Self {
    Self {
      clear:       false,
      dry_run:     false,
      best_effort: false,
      batch_size:  DEFAULT_BATCH_SIZE,
    }
  }
}

/// What one import run did (or, for a dry run, would have done).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
  /// Rows read from the roster.
  pub total_rows:   usize,
  /// Rows that passed validation and deduplication.
  pub valid_rows:   usize,
  /// Rows dropped in best-effort mode.
  pub skipped_rows: usize,
  /// Rows actually written. Zero for a dry run.
  pub committed:    usize,
  /// Storage batches committed.
  pub batches:      usize,
  pub cleared:      bool,
  pub dry_run:      bool,
}

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why an import run stopped. Validation and duplicate failures are
/// aggregated so the user sees every problem in one pass, never just the
/// first.
#[derive(Debug, Error)]
pub enum ImportError<E: StoreError> {
  #[error("{} validation error(s)", .0.len())]
  Validation(Vec<FieldError>),

  #[error("{} duplicate(s)", .0.len())]
  Duplicates(Vec<DuplicateError>),

  /// A batch failed mid-run. Everything up to `committed` rows stayed
  /// committed; batches after `batch_index` were never attempted.
  #[error(
    "storage failure at batch {batch_index} after {committed} committed row(s): {source}"
  )]
  Storage {
    committed:   usize,
    batch_index: usize,
    source:      E,
  },
}

impl<E: StoreError> ImportError<E> {
  /// Write the full aggregated error list, one problem per line.
  pub fn write_summary(&self, out: &mut impl fmt::Write) -> fmt::Result {
    match self {
      Self::Validation(errors) => {
        for e in errors {
          writeln!(out, "{e}")?;
        }
      }
      Self::Duplicates(errors) => {
        for e in errors {
          writeln!(out, "{e}")?;
        }
      }
      Self::Storage { .. } => writeln!(out, "{self}")?,
    }
    Ok(())
  }
}

// ─── Pipeline ────────────────────────────────────────────────────────────────

/// Run one roster import against `store`.
///
/// Steps: validate every row (collecting all field errors), deduplicate the
/// survivors against each other and against storage, stop there for a dry
/// run, optionally clear existing data, then commit `batch_size`-row atomic
/// batches until done or a batch fails.
///
/// Re-running the same roster without `clear` fails deterministically in the
/// duplicate check: plate uniqueness makes the import idempotent rather than
/// silently doubling the fleet. Cancelling the returned future between
/// batches leaves previously committed batches intact.
pub async fn import_batch<S: CarStore>(
  store: &S,
  rows: Vec<RawRow>,
  options: &ImportOptions,
) -> Result<ImportReport, ImportError<S::Error>> {
  let total_rows = rows.len();
  let batch_size = options.batch_size.max(1);

  // Step 1: validate everything, keeping every error.
  let mut cars: Vec<NewCar> = Vec::with_capacity(total_rows);
  let mut row_numbers: Vec<usize> = Vec::with_capacity(total_rows);
  let mut field_errors: Vec<FieldError> = Vec::new();

  for (index, row) in rows.iter().enumerate() {
    let row_number = index + 1;
    match validate(row, row_number) {
      Ok(car) => {
        cars.push(car);
        row_numbers.push(row_number);
      }
      Err(mut errors) => field_errors.append(&mut errors),
    }
  }

  let skipped_rows = total_rows - cars.len();
  if !field_errors.is_empty() {
    if options.best_effort {
      tracing::warn!(
        skipped = skipped_rows,
        errors = field_errors.len(),
        "best-effort import: skipping invalid rows"
      );
    } else {
      return Err(ImportError::Validation(field_errors));
    }
  }

  // Step 2: deduplicate across the whole parsed set and existing storage.
  // When the run will clear first, storage plates are about to vanish and
  // must not block the import.
  let existing = if options.clear {
    Default::default()
  } else {
    store
      .existing_plates()
      .await
      .map_err(|source| ImportError::Storage { committed: 0, batch_index: 0, source })?
  };

  let mut index = BatchIndex::new();
  let mut duplicates: Vec<DuplicateError> = Vec::new();
  for (car, &row_number) in cars.iter().zip(&row_numbers) {
    if let Err(e) = index.check(car, row_number, &existing) {
      duplicates.push(e);
    }
  }
  if !duplicates.is_empty() {
    return Err(ImportError::Duplicates(duplicates));
  }

  let valid_rows = cars.len();

  // Step 3: dry run stops before any write.
  if options.dry_run {
    tracing::info!(rows = valid_rows, "dry run: roster is importable");
    return Ok(ImportReport {
      total_rows,
      valid_rows,
      skipped_rows,
      committed: 0,
      batches: 0,
      cleared: false,
      dry_run: true,
    });
  }

  // Step 4: explicit, irreversible pre-import reset.
  if options.clear {
    tracing::warn!("clearing all existing cars and history (irreversible)");
    store
      .clear_all()
      .await
      .map_err(|source| ImportError::Storage { committed: 0, batch_index: 0, source })?;
  }

  // Step 5: fixed-size atomic batches, stopping at the first failure.
  let mut committed = 0usize;
  let mut batches = 0usize;
  for (batch_index, batch) in cars.chunks(batch_size).enumerate() {
    store.create_cars(batch).await.map_err(|source| {
      ImportError::Storage { committed, batch_index, source }
    })?;

    committed += batch.len();
    batches += 1;
    tracing::info!(committed, total = valid_rows, "imported batch");
  }

  Ok(ImportReport {
    total_rows,
    valid_rows,
    skipped_rows,
    committed,
    batches,
    cleared: options.clear,
    dry_run: false,
  })
}
