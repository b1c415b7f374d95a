//! Core types and trait definitions for the car-tracker lifecycle engine.
//!
//! This crate is deliberately free of I/O and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.

pub mod car;
pub mod dedup;
pub mod error;
pub mod history;
pub mod stats;
pub mod status;
pub mod store;
pub mod validate;

pub use error::{Error, Result};
