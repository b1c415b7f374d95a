//! Car records — the envelope the status ledger hangs off.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::CarStatus;

/// One vehicle checked in for the event.
///
/// `current_status` is a cache of the car's most recent ledger entry. It is
/// written only inside the same atomic unit as the ledger append, never
/// independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Car {
  /// Assigned at import from the roster; unique and immutable.
  pub id:             i64,
  pub make:           String,
  pub model:          String,
  pub color:          String,
  /// Business key as supplied (trimmed). Uniqueness is enforced on the
  /// normalized form; see [`crate::dedup::normalize_plate`].
  pub license_plate:  String,
  pub current_status: CarStatus,
  /// Server-assigned; never changes after creation.
  pub created_at:     DateTime<Utc>,
}

/// Validated input to [`crate::store::CarStore::create_cars`], the single
/// creation path for cars. Every field has already been trimmed and checked
/// by [`crate::validate::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCar {
  pub id:            i64,
  pub make:          String,
  pub model:         String,
  pub color:         String,
  pub license_plate: String,
}
