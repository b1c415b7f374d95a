//! SQLite backend for the car-tracker store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Every multi-row write and every status
//! transition executes inside a single SQLite transaction, which is what makes
//! the ledger invariants hold under concurrent callers.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
