//! CSV roster reading.
//!
//! The roster format is `id,make,model,color,licensePlate` with a header row;
//! cell-level problems (empty fields, bad ids) are the validator's job and
//! are not judged here, but structural problems (missing file, ragged rows)
//! are.

use std::path::Path;

use cartrack_core::validate::RawRow;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReadError {
  #[error("cannot open roster file {path:?}: {source}")]
  Open {
    path:   String,
    source: std::io::Error,
  },

  #[error("malformed CSV at line {line}: {source}")]
  Malformed { line: u64, source: csv::Error },
}

/// Read every record of the roster file into raw rows, in file order.
pub fn read_rows(path: impl AsRef<Path>) -> Result<Vec<RawRow>, ReadError> {
  let path = path.as_ref();
  let file = std::fs::File::open(path).map_err(|source| ReadError::Open {
    path: path.display().to_string(),
    source,
  })?;

  let mut reader = csv::ReaderBuilder::new()
    .trim(csv::Trim::All)
    .flexible(false)
    .from_reader(file);

  let mut rows = Vec::new();
  for result in reader.deserialize::<RawRow>() {
    match result {
      Ok(row) => rows.push(row),
      Err(e) => {
        let line = e.position().map_or(0, csv::Position::line);
        return Err(ReadError::Malformed { line, source: e });
      }
    }
  }
  Ok(rows)
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use super::*;

  fn write_temp(contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
      "cartrack-reader-{}-{}.csv",
      std::process::id(),
      contents.len(),
    ));
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    path
  }

  #[test]
  fn reads_rows_in_order_with_trimming() {
    let path = write_temp(
      "id,make,model,color,licensePlate\n\
       1, Toyota ,Camry,Blue,ABC-1234\n\
       2,Honda,Civic,Red,XYZ-5678\n",
    );
    let rows = read_rows(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].make, "Toyota");
    assert_eq!(rows[1].license_plate, "XYZ-5678");
  }

  #[test]
  fn missing_file_reports_the_path() {
    let err = read_rows("does/not/exist.csv").unwrap_err();
    assert!(matches!(err, ReadError::Open { .. }));
  }

  #[test]
  fn ragged_row_reports_the_line() {
    let path = write_temp(
      "id,make,model,color,licensePlate\n\
       1,Toyota,Camry,Blue,ABC-1234\n\
       2,Honda,Civic\n",
    );
    let err = read_rows(&path).unwrap_err();
    std::fs::remove_file(&path).ok();

    assert!(matches!(err, ReadError::Malformed { line: 3, .. }));
  }
}
