//! The `CarStore` trait and its error-classification companion.
//!
//! The trait is implemented by storage backends (e.g. `cartrack-store-sqlite`).
//! Higher layers (`cartrack-import`, `cartrack-cli`) depend on this
//! abstraction, not on any concrete backend.

use std::{collections::HashSet, future::Future};

use crate::{
  car::{Car, NewCar},
  history::StatusHistoryEntry,
  status::CarStatus,
};

/// Classification hooks every backend error must provide, so callers can
/// tell a duplicate-key rejection from a transient outage without knowing
/// the backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// A uniqueness or referential-integrity rejection (duplicate plate or id).
  fn is_constraint_violation(&self) -> bool;

  /// A transient infrastructure failure the caller may retry (e.g. a busy
  /// database or a bounded timeout). Retrying is the caller's decision;
  /// nothing in the core retries automatically.
  fn is_retryable(&self) -> bool;
}

/// Abstraction over a car-tracker storage backend.
///
/// The history ledger is strictly append-only: the trait exposes no way to
/// update or delete individual entries. Cars enter storage only through
/// [`create_cars`](Self::create_cars) and change status only through
/// [`transition`](Self::transition). The only deletion surface is the bulk
/// [`clear_all`](Self::clear_all), an explicit, irreversible pre-import reset.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait CarStore: Send + Sync {
  type Error: StoreError;

  // ── Creation ──────────────────────────────────────────────────────────

  /// Persist a batch of new cars, each with its initial `PRE_ARRIVAL`
  /// history entry, as a single atomic unit: either every car in `batch`
  /// exists with exactly one ledger entry afterwards, or none do.
  ///
  /// Fails with a constraint violation on a duplicate plate or id.
  fn create_cars<'a>(
    &'a self,
    batch: &'a [NewCar],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Transitions ───────────────────────────────────────────────────────

  /// Apply a status transition to one car: validate against the transition
  /// table, append exactly one history entry, and update the car's cached
  /// `current_status`, all atomically. Concurrent transitions for the same
  /// car serialize; a lost update must never diverge the cache from the
  /// ledger.
  fn transition(
    &self,
    car_id: i64,
    requested: CarStatus,
    reason: Option<String>,
  ) -> impl Future<Output = Result<StatusHistoryEntry, Self::Error>> + Send + '_;

  // ── Reads ─────────────────────────────────────────────────────────────

  fn get_car(
    &self,
    id: i64,
  ) -> impl Future<Output = Result<Option<Car>, Self::Error>> + Send + '_;

  /// Look up a car by license plate (case-insensitive).
  fn find_car_by_plate<'a>(
    &'a self,
    plate: &'a str,
  ) -> impl Future<Output = Result<Option<Car>, Self::Error>> + Send + 'a;

  fn list_cars(
    &self,
  ) -> impl Future<Output = Result<Vec<Car>, Self::Error>> + Send + '_;

  /// A car's full ledger, ordered by `recorded_at` then insertion order.
  /// Non-empty for every existing car.
  fn history(
    &self,
    car_id: i64,
  ) -> impl Future<Output = Result<Vec<StatusHistoryEntry>, Self::Error>> + Send + '_;

  /// Normalized plates of every car in storage; consumed by the batch
  /// deduplicator before an import commits anything.
  fn existing_plates(
    &self,
  ) -> impl Future<Output = Result<HashSet<String>, Self::Error>> + Send + '_;

  // ── Aggregates ────────────────────────────────────────────────────────

  fn car_count(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  fn count_by_status(
    &self,
  ) -> impl Future<Output = Result<Vec<(CarStatus, u64)>, Self::Error>> + Send + '_;

  fn count_by_make(
    &self,
  ) -> impl Future<Output = Result<Vec<(String, u64)>, Self::Error>> + Send + '_;

  // ── Destructive ───────────────────────────────────────────────────────

  /// Delete all history entries, then all cars (referential order).
  /// Irreversible; used only by the import pipeline's `clear` option.
  fn clear_all(
    &self,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
