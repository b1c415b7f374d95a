//! Error type for `cartrack-store-sqlite`.
//!
//! Database failures are classified on the way in: uniqueness rejections and
//! busy/locked conditions get their own variants so the import pipeline can
//! distinguish a duplicate plate from a transient outage.

use cartrack_core::store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] cartrack_core::Error),

  #[error("database error: {0}")]
  Database(tokio_rusqlite::Error),

  /// Duplicate plate or id, or a foreign-key rejection.
  #[error("constraint violation: {0}")]
  ConstraintViolation(String),

  /// The database was busy or locked; safe to retry.
  #[error("database busy: {0}")]
  Busy(String),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("car not found: {0}")]
  CarNotFound(i64),
}

impl From<tokio_rusqlite::Error> for Error {
  fn from(err: tokio_rusqlite::Error) -> Self {
    if let tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(
      code,
      ref message,
    )) = err
    {
      let detail = message.clone().unwrap_or_else(|| code.to_string());
      match code.code {
        rusqlite::ErrorCode::ConstraintViolation => {
          return Self::ConstraintViolation(detail);
        }
        rusqlite::ErrorCode::DatabaseBusy
        | rusqlite::ErrorCode::DatabaseLocked => {
          return Self::Busy(detail);
        }
        _ => {}
      }
    }
    Self::Database(err)
  }
}

impl StoreError for Error {
  fn is_constraint_violation(&self) -> bool {
    matches!(self, Self::ConstraintViolation(_))
  }

  fn is_retryable(&self) -> bool { matches!(self, Self::Busy(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
