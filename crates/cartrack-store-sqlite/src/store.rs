//! [`SqliteStore`] — the SQLite implementation of [`CarStore`].

use std::{collections::HashSet, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use cartrack_core::{
  car::{Car, NewCar},
  dedup::normalize_plate,
  history::StatusHistoryEntry,
  status::{self, CarStatus},
  store::CarStore,
};

use crate::{
  encode::{decode_status, encode_dt, RawCar, RawEntry},
  schema::SCHEMA,
  Error, Result,
};

/// Outcome of the transition transaction, carried out of the database thread.
/// Domain rejections roll the transaction back without becoming SQLite errors.
enum TxOutcome {
  Committed { entry_id: i64 },
  CarNotFound,
  Rejected(cartrack_core::Error),
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A car-tracker store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// funnel through one connection, so transitions for the same car serialize
/// naturally; each write additionally runs in its own transaction.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CarStore impl ───────────────────────────────────────────────────────────

impl CarStore for SqliteStore {
  type Error = Error;

  // ── Creation ──────────────────────────────────────────────────────────────

  async fn create_cars(&self, batch: &[NewCar]) -> Result<()> {
    let cars = batch.to_vec();
    let now_str = encode_dt(Utc::now());
    let initial = CarStatus::PreArrival.as_str();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        // Car rows first, then one initial ledger entry per car; a failure
        // anywhere rolls back the whole batch, so no car ever exists with
        // an empty history.
        for car in &cars {
          tx.execute(
            "INSERT INTO cars
               (id, make, model, color, license_plate, plate_norm,
                current_status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
              car.id,
              car.make,
              car.model,
              car.color,
              car.license_plate,
              normalize_plate(&car.license_plate),
              initial,
              now_str,
            ],
          )?;
        }

        for car in &cars {
          tx.execute(
            "INSERT INTO status_history_entries (car_id, status, recorded_at)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![car.id, initial, now_str],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Transitions ───────────────────────────────────────────────────────────

  async fn transition(
    &self,
    car_id: i64,
    requested: CarStatus,
    reason: Option<String>,
  ) -> Result<StatusHistoryEntry> {
    let now = Utc::now();
    let now_str = encode_dt(now);

    // A reason belongs to the reset edge only; a stray reason on a forward
    // step is dropped rather than persisted.
    let reason = if requested == CarStatus::PreArrival { reason } else { None };
    let reason_for_tx = reason.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let current_str: Option<String> = tx
          .query_row(
            "SELECT current_status FROM cars WHERE id = ?1",
            rusqlite::params![car_id],
            |row| row.get(0),
          )
          .optional()?;

        let Some(current_str) = current_str else {
          return Ok(TxOutcome::CarNotFound);
        };

        let current = match CarStatus::parse(&current_str) {
          Ok(s) => s,
          Err(e) => return Ok(TxOutcome::Rejected(e)),
        };

        if let Err(e) =
          status::check_transition(current, requested, reason_for_tx.as_deref())
        {
          return Ok(TxOutcome::Rejected(e));
        }

        // Ledger append and cache update commit together (or not at all).
        tx.execute(
          "INSERT INTO status_history_entries (car_id, status, reason, recorded_at)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![car_id, requested.as_str(), reason_for_tx, now_str],
        )?;
        let entry_id = tx.last_insert_rowid();

        tx.execute(
          "UPDATE cars SET current_status = ?1 WHERE id = ?2",
          rusqlite::params![requested.as_str(), car_id],
        )?;

        tx.commit()?;
        Ok(TxOutcome::Committed { entry_id })
      })
      .await?;

    match outcome {
      TxOutcome::Committed { entry_id } => Ok(StatusHistoryEntry {
        entry_id,
        car_id,
        status: requested,
        reason,
        recorded_at: now,
      }),
      TxOutcome::CarNotFound => Err(Error::CarNotFound(car_id)),
      TxOutcome::Rejected(e) => Err(Error::Core(e)),
    }
  }

  // ── Reads ─────────────────────────────────────────────────────────────────

  async fn get_car(&self, id: i64) -> Result<Option<Car>> {
    let raw: Option<RawCar> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, make, model, color, license_plate, current_status,
                      created_at
               FROM cars WHERE id = ?1",
              rusqlite::params![id],
              map_car_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCar::into_car).transpose()
  }

  async fn find_car_by_plate(&self, plate: &str) -> Result<Option<Car>> {
    let norm = normalize_plate(plate);

    let raw: Option<RawCar> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT id, make, model, color, license_plate, current_status,
                      created_at
               FROM cars WHERE plate_norm = ?1",
              rusqlite::params![norm],
              map_car_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCar::into_car).transpose()
  }

  async fn list_cars(&self) -> Result<Vec<Car>> {
    let raws: Vec<RawCar> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, make, model, color, license_plate, current_status,
                  created_at
           FROM cars ORDER BY id",
        )?;
        let rows = stmt
          .query_map([], map_car_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCar::into_car).collect()
  }

  async fn history(&self, car_id: i64) -> Result<Vec<StatusHistoryEntry>> {
    let raws: Vec<RawEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT entry_id, car_id, status, reason, recorded_at
           FROM status_history_entries
           WHERE car_id = ?1
           ORDER BY recorded_at, entry_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![car_id], |row| {
            Ok(RawEntry {
              entry_id:    row.get(0)?,
              car_id:      row.get(1)?,
              status:      row.get(2)?,
              reason:      row.get(3)?,
              recorded_at: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntry::into_entry).collect()
  }

  async fn existing_plates(&self) -> Result<HashSet<String>> {
    let plates: Vec<String> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT plate_norm FROM cars")?;
        let rows = stmt
          .query_map([], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(plates.into_iter().collect())
  }

  // ── Aggregates ────────────────────────────────────────────────────────────

  async fn car_count(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM cars", [], |row| row.get(0))?)
      })
      .await?;
    Ok(count as u64)
  }

  async fn count_by_status(&self) -> Result<Vec<(CarStatus, u64)>> {
    let raws: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT current_status, COUNT(*) FROM cars GROUP BY current_status",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(s, n)| Ok((decode_status(&s)?, n as u64)))
      .collect()
  }

  async fn count_by_make(&self) -> Result<Vec<(String, u64)>> {
    let raws: Vec<(String, i64)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT make, COUNT(*) AS n FROM cars
           GROUP BY make ORDER BY n DESC, make",
        )?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(raws.into_iter().map(|(m, n)| (m, n as u64)).collect())
  }

  // ── Destructive ───────────────────────────────────────────────────────────

  async fn clear_all(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        let tx = conn.transaction()?;
        // History before cars, for the foreign key.
        tx.execute("DELETE FROM status_history_entries", [])?;
        tx.execute("DELETE FROM cars", [])?;
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn map_car_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawCar> {
  Ok(RawCar {
    id:             row.get(0)?,
    make:           row.get(1)?,
    model:          row.get(2)?,
    color:          row.get(3)?,
    license_plate:  row.get(4)?,
    current_status: row.get(5)?,
    created_at:     row.get(6)?,
  })
}
