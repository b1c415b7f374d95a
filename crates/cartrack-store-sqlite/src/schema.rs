//! SQL schema for the SQLite car-tracker store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS cars (
    id             INTEGER PRIMARY KEY,   -- roster-assigned, immutable
    make           TEXT NOT NULL,
    model          TEXT NOT NULL,
    color          TEXT NOT NULL,
    license_plate  TEXT NOT NULL,         -- display form, as supplied
    plate_norm     TEXT NOT NULL UNIQUE,  -- trimmed + uppercased business key
    current_status TEXT NOT NULL,         -- cache of the latest ledger entry
    created_at     TEXT NOT NULL          -- ISO 8601 UTC; server-assigned
);

-- The status ledger is strictly append-only.
-- No UPDATE is ever issued against this table; the only DELETE is the bulk
-- pre-import clear, which removes history before cars.
CREATE TABLE IF NOT EXISTS status_history_entries (
    entry_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    car_id      INTEGER NOT NULL REFERENCES cars(id),
    status      TEXT NOT NULL,
    reason      TEXT,                     -- set exactly for reset entries
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS history_car_idx      ON status_history_entries(car_id);
CREATE INDEX IF NOT EXISTS history_recorded_idx ON status_history_entries(recorded_at);

PRAGMA user_version = 1;
";
