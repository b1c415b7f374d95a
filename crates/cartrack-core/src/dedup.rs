//! Batch deduplication — license plates (and explicit roster ids) must be
//! unique within an import batch and against existing storage before any row
//! of the batch commits.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::car::NewCar;

/// Canonical form used for plate uniqueness: trimmed, ASCII-uppercased.
/// The display form on [`crate::car::Car`] keeps the supplied casing.
pub fn normalize_plate(plate: &str) -> String { plate.trim().to_ascii_uppercase() }

/// A batch-level uniqueness violation. Recoverable by correcting the roster;
/// the import pipeline aggregates every duplicate before giving up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DuplicateError {
  #[error("row {row}: plate {plate:?} duplicates row {first_row} of this batch")]
  PlateInBatch {
    row:       usize,
    first_row: usize,
    plate:     String,
  },

  #[error("row {row}: plate {plate:?} already exists in storage")]
  PlateInStorage { row: usize, plate: String },

  #[error("row {row}: id {id} duplicates row {first_row} of this batch")]
  IdInBatch {
    row:       usize,
    first_row: usize,
    id:        i64,
  },
}

/// Tracks what has been seen so far within one batch.
#[derive(Debug, Default)]
pub struct BatchIndex {
  plates: HashMap<String, usize>,
  ids:    HashMap<i64, usize>,
}

impl BatchIndex {
  pub fn new() -> Self { Self::default() }

  /// Check `candidate` against the batch so far and against the set of
  /// normalized plates already in storage. On success the candidate is
  /// recorded so later rows collide against it.
  pub fn check(
    &mut self,
    candidate: &NewCar,
    row: usize,
    existing_plates: &HashSet<String>,
  ) -> Result<(), DuplicateError> {
    let plate = normalize_plate(&candidate.license_plate);

    if let Some(&first_row) = self.plates.get(&plate) {
      return Err(DuplicateError::PlateInBatch {
        row,
        first_row,
        plate: candidate.license_plate.clone(),
      });
    }
    if existing_plates.contains(&plate) {
      return Err(DuplicateError::PlateInStorage {
        row,
        plate: candidate.license_plate.clone(),
      });
    }
    if let Some(&first_row) = self.ids.get(&candidate.id) {
      return Err(DuplicateError::IdInBatch { row, first_row, id: candidate.id });
    }

    self.plates.insert(plate, row);
    self.ids.insert(candidate.id, row);
    Ok(())
  }
}
