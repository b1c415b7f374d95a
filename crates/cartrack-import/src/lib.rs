//! Roster import for the car tracker.
//!
//! [`reader`] turns a CSV file into raw rows; [`pipeline`] validates,
//! deduplicates, and commits them through any [`cartrack_core::store::CarStore`]
//! backend in fixed-size atomic batches. [`mock`] generates sample rosters in
//! the same format.

pub mod mock;
pub mod pipeline;
pub mod reader;

pub use mock::{generate_cars, write_roster};
pub use pipeline::{import_batch, ImportError, ImportOptions, ImportReport};
pub use reader::{read_rows, ReadError};

#[cfg(test)]
mod tests;
