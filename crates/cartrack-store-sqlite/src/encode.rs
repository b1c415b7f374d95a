//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings; statuses as their
//! SCREAMING_SNAKE_CASE names.

use cartrack_core::{
  car::Car,
  history::StatusHistoryEntry,
  status::CarStatus,
};
use chrono::{DateTime, Utc};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CarStatus ───────────────────────────────────────────────────────────────

pub fn decode_status(s: &str) -> Result<CarStatus> {
  Ok(CarStatus::parse(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `cars` row.
pub struct RawCar {
  pub id:             i64,
  pub make:           String,
  pub model:          String,
  pub color:          String,
  pub license_plate:  String,
  pub current_status: String,
  pub created_at:     String,
}

impl RawCar {
  pub fn into_car(self) -> Result<Car> {
    Ok(Car {
      id:             self.id,
      make:           self.make,
      model:          self.model,
      color:          self.color,
      license_plate:  self.license_plate,
      current_status: decode_status(&self.current_status)?,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `status_history_entries` row.
pub struct RawEntry {
  pub entry_id:    i64,
  pub car_id:      i64,
  pub status:      String,
  pub reason:      Option<String>,
  pub recorded_at: String,
}

impl RawEntry {
  pub fn into_entry(self) -> Result<StatusHistoryEntry> {
    Ok(StatusHistoryEntry {
      entry_id:    self.entry_id,
      car_id:      self.car_id,
      status:      decode_status(&self.status)?,
      reason:      self.reason,
      recorded_at: decode_dt(&self.recorded_at)?,
    })
  }
}
