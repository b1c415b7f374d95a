//! The car status state machine.
//!
//! Statuses form a linear progression from arrival to pickup, with a single
//! backward edge: any non-terminal status may be reset to `PRE_ARRIVAL` with
//! a stated reason. The transition check is a pure function; appending the
//! resulting ledger entry is the storage layer's job.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// One of the six stations a car moves through during the event day.
///
/// Stored as its SCREAMING_SNAKE_CASE name; adding or removing a variant is a
/// compile-time-visible change for every consumer.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarStatus {
  PreArrival,
  CheckedIn,
  InService,
  ServiceComplete,
  ReadyForPickup,
  PickedUp,
}

impl CarStatus {
  /// Every status, in lifecycle order.
  pub const ALL: [CarStatus; 6] = [
    Self::PreArrival,
    Self::CheckedIn,
    Self::InService,
    Self::ServiceComplete,
    Self::ReadyForPickup,
    Self::PickedUp,
  ];

  /// The name stored in the `status` column and printed in reports.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::PreArrival => "PRE_ARRIVAL",
      Self::CheckedIn => "CHECKED_IN",
      Self::InService => "IN_SERVICE",
      Self::ServiceComplete => "SERVICE_COMPLETE",
      Self::ReadyForPickup => "READY_FOR_PICKUP",
      Self::PickedUp => "PICKED_UP",
    }
  }

  /// Inverse of [`as_str`](Self::as_str).
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "PRE_ARRIVAL" => Ok(Self::PreArrival),
      "CHECKED_IN" => Ok(Self::CheckedIn),
      "IN_SERVICE" => Ok(Self::InService),
      "SERVICE_COMPLETE" => Ok(Self::ServiceComplete),
      "READY_FOR_PICKUP" => Ok(Self::ReadyForPickup),
      "PICKED_UP" => Ok(Self::PickedUp),
      other => Err(Error::UnknownStatus(other.to_owned())),
    }
  }

  /// The single legal forward step, or `None` from the terminal status.
  pub fn next(self) -> Option<Self> {
    match self {
      Self::PreArrival => Some(Self::CheckedIn),
      Self::CheckedIn => Some(Self::InService),
      Self::InService => Some(Self::ServiceComplete),
      Self::ServiceComplete => Some(Self::ReadyForPickup),
      Self::ReadyForPickup => Some(Self::PickedUp),
      Self::PickedUp => None,
    }
  }

  /// `PICKED_UP` has no outgoing edges.
  pub fn is_terminal(self) -> bool { matches!(self, Self::PickedUp) }

  /// All statuses legally reachable from `self` in one transition: the
  /// forward step plus the reset edge back to `PRE_ARRIVAL`.
  pub fn allowed_next(self) -> Vec<Self> {
    let mut out = Vec::with_capacity(2);
    if let Some(n) = self.next() {
      out.push(n);
    }
    if !self.is_terminal() {
      out.push(Self::PreArrival);
    }
    out
  }
}

impl std::fmt::Display for CarStatus {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Check whether `current → requested` is on the transition table.
///
/// The reset edge (any non-terminal status back to `PRE_ARRIVAL`) requires a
/// non-empty `reason`; forward steps ignore it. Illegal transitions are never
/// coerced: the error names the allowed next statuses so callers can show
/// them.
pub fn check_transition(
  current: CarStatus,
  requested: CarStatus,
  reason: Option<&str>,
) -> Result<()> {
  let is_forward = current.next() == Some(requested);
  let is_reset = requested == CarStatus::PreArrival && !current.is_terminal();

  if is_forward {
    return Ok(());
  }

  if is_reset {
    match reason {
      Some(r) if !r.trim().is_empty() => return Ok(()),
      _ => return Err(Error::ResetReasonRequired { from: current }),
    }
  }

  Err(Error::IllegalTransition {
    from: current,
    requested,
    allowed: current.allowed_next(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn forward_edges_are_legal() {
    let chain = CarStatus::ALL;
    for pair in chain.windows(2) {
      check_transition(pair[0], pair[1], None).unwrap();
    }
  }

  #[test]
  fn reset_requires_reason() {
    for from in CarStatus::ALL {
      if from.is_terminal() {
        continue;
      }
      let err = check_transition(from, CarStatus::PreArrival, None).unwrap_err();
      assert!(matches!(err, Error::ResetReasonRequired { .. }));
      check_transition(from, CarStatus::PreArrival, Some("lost paperwork")).unwrap();
    }
  }

  #[test]
  fn blank_reason_does_not_count() {
    let err =
      check_transition(CarStatus::InService, CarStatus::PreArrival, Some("  "))
        .unwrap_err();
    assert!(matches!(err, Error::ResetReasonRequired { .. }));
  }

  #[test]
  fn terminal_status_has_no_outgoing_edges() {
    for to in CarStatus::ALL {
      let err = check_transition(CarStatus::PickedUp, to, Some("reason"))
        .unwrap_err();
      assert!(matches!(
        err,
        Error::IllegalTransition { from: CarStatus::PickedUp, .. }
      ));
    }
    assert!(CarStatus::PickedUp.allowed_next().is_empty());
  }

  // Every (from, to) pair off the table must fail and name the allowed set.
  #[test]
  fn transition_table_is_exhaustive() {
    for from in CarStatus::ALL {
      for to in CarStatus::ALL {
        let legal =
          from.next() == Some(to) || (to == CarStatus::PreArrival && !from.is_terminal());
        let result = check_transition(from, to, Some("ops reset"));
        if legal {
          result.unwrap();
        } else {
          match result.unwrap_err() {
            Error::IllegalTransition { from: f, requested, allowed } => {
              assert_eq!(f, from);
              assert_eq!(requested, to);
              assert_eq!(allowed, from.allowed_next());
            }
            other => panic!("expected IllegalTransition, got {other}"),
          }
        }
      }
    }
  }

  #[test]
  fn status_names_round_trip() {
    for status in CarStatus::ALL {
      assert_eq!(CarStatus::parse(status.as_str()).unwrap(), status);
    }
    assert!(CarStatus::parse("VALET_PARKED").is_err());
  }
}
