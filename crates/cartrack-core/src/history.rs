//! The status history ledger types.
//!
//! An entry is an immutable fact: "car X was observed in status S at time T".
//! Entries are never updated or deleted; a correction is a new transition
//! (typically a reset), never a rewrite.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::CarStatus;

/// One appended ledger fact. Within a car's sequence, `recorded_at` is
/// non-decreasing and ties are broken by `entry_id` (insertion order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
  /// Storage-assigned, monotonically increasing per insert.
  pub entry_id:    i64,
  pub car_id:      i64,
  pub status:      CarStatus,
  /// Present (and non-empty) exactly for reset entries.
  pub reason:      Option<String>,
  pub recorded_at: DateTime<Utc>,
}
