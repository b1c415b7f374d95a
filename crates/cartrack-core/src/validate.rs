//! Row validation — raw roster strings into a well-typed [`NewCar`].
//!
//! The validator is pure and reports every problem with a row at once, so a
//! user fixing a roster sees the full list in a single pass rather than one
//! error per attempt.

use serde::Deserialize;
use thiserror::Error;

use crate::car::NewCar;

/// One record as read from the roster CSV, before any checking.
/// Field names match the CSV header: `id,make,model,color,licensePlate`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRow {
  #[serde(default)]
  pub id:    String,
  #[serde(default)]
  pub make:  String,
  #[serde(default)]
  pub model: String,
  #[serde(default)]
  pub color: String,
  #[serde(default, rename = "licensePlate")]
  pub license_plate: String,
}

/// The roster column a [`FieldError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Id,
  Make,
  Model,
  Color,
  LicensePlate,
}

impl Field {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Id => "id",
      Self::Make => "make",
      Self::Model => "model",
      Self::Color => "color",
      Self::LicensePlate => "licensePlate",
    }
  }
}

impl std::fmt::Display for Field {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A recoverable per-row, per-field problem. Collected, never fatal on its
/// own; the import pipeline aggregates these across the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("row {row}: {kind} ({field})")]
pub struct FieldError {
  /// 1-based data row number (header not counted).
  pub row:   usize,
  pub field: Field,
  pub kind:  FieldErrorKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldErrorKind {
  #[error("field is required")]
  Required,
  #[error("must be an integer, got {0:?}")]
  NotAnInteger(String),
}

/// Validate one raw row into a [`NewCar`], or every field error at once.
pub fn validate(row: &RawRow, row_number: usize) -> Result<NewCar, Vec<FieldError>> {
  let mut errors = Vec::new();

  let err = |field, kind| FieldError { row: row_number, field, kind };

  let id_raw = row.id.trim();
  let id = if id_raw.is_empty() {
    errors.push(err(Field::Id, FieldErrorKind::Required));
    None
  } else {
    match id_raw.parse::<i64>() {
      Ok(id) => Some(id),
      Err(_) => {
        errors.push(err(Field::Id, FieldErrorKind::NotAnInteger(id_raw.to_owned())));
        None
      }
    }
  };

  let required = |value: &str, field, errors: &mut Vec<FieldError>| {
    let trimmed = value.trim();
    if trimmed.is_empty() {
      errors.push(err(field, FieldErrorKind::Required));
      None
    } else {
      Some(trimmed.to_owned())
    }
  };

  let make = required(&row.make, Field::Make, &mut errors);
  let model = required(&row.model, Field::Model, &mut errors);
  let color = required(&row.color, Field::Color, &mut errors);
  let license_plate = required(&row.license_plate, Field::LicensePlate, &mut errors);

  if !errors.is_empty() {
    return Err(errors);
  }

  // All `unwrap`s guarded by the empty error list.
  Ok(NewCar {
    id:            id.unwrap(),
    make:          make.unwrap(),
    model:         model.unwrap(),
    color:         color.unwrap(),
    license_plate: license_plate.unwrap(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  fn good_row() -> RawRow {
    RawRow {
      id:    "7".into(),
      make:  " Toyota ".into(),
      model: "Camry".into(),
      color: "Blue".into(),
      license_plate: "ABC-1234".into(),
    }
  }

  #[test]
  fn valid_row_is_trimmed() {
    let car = validate(&good_row(), 1).unwrap();
    assert_eq!(car.id, 7);
    assert_eq!(car.make, "Toyota");
    assert_eq!(car.license_plate, "ABC-1234");
  }

  #[test]
  fn missing_color_is_a_single_field_error() {
    let mut row = good_row();
    row.color = "   ".into();
    let errors = validate(&row, 3).unwrap_err();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].row, 3);
    assert_eq!(errors[0].field, Field::Color);
    assert_eq!(errors[0].kind, FieldErrorKind::Required);
  }

  #[test]
  fn all_errors_reported_at_once() {
    let row = RawRow { id: "not-a-number".into(), ..RawRow::default() };
    let errors = validate(&row, 1).unwrap_err();
    // bad id + four empty required fields
    assert_eq!(errors.len(), 5);
    assert!(
      errors
        .iter()
        .any(|e| matches!(e.kind, FieldErrorKind::NotAnInteger(_)))
    );
  }
}
