//! Error types for `cartrack-core`.

use thiserror::Error;

use crate::status::CarStatus;

fn fmt_allowed(allowed: &[CarStatus]) -> String {
  if allowed.is_empty() {
    return "none (terminal status)".to_owned();
  }
  allowed
    .iter()
    .map(|s| s.as_str())
    .collect::<Vec<_>>()
    .join(", ")
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(
    "illegal transition {from} -> {requested}; allowed next: {}",
    fmt_allowed(allowed)
  )]
  IllegalTransition {
    from:      CarStatus,
    requested: CarStatus,
    allowed:   Vec<CarStatus>,
  },

  #[error("reset from {from} to PRE_ARRIVAL requires a non-empty reason")]
  ResetReasonRequired { from: CarStatus },

  #[error("unknown status: {0:?}")]
  UnknownStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
