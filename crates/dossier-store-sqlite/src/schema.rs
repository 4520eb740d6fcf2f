//! SQL schema for the Dossier SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
///
/// Each collection is a document table: `body` holds the record as JSON and
/// `case_number` is copied out of it for scoped reads. Reads return rows in
/// `rowid` order, which is insertion order.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS contacts (
    id          TEXT PRIMARY KEY,
    case_number TEXT,
    body        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS passwords (
    id          TEXT PRIMARY KEY,
    case_number TEXT,
    body        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS user_accounts (
    id          TEXT PRIMARY KEY,
    case_number TEXT,
    body        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS suspect_profiles (
    id          TEXT PRIMARY KEY,
    case_number TEXT,
    body        TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS contacts_case_idx         ON contacts(case_number);
CREATE INDEX IF NOT EXISTS passwords_case_idx        ON passwords(case_number);
CREATE INDEX IF NOT EXISTS user_accounts_case_idx    ON user_accounts(case_number);
CREATE INDEX IF NOT EXISTS suspect_profiles_case_idx ON suspect_profiles(case_number);

PRAGMA user_version = 1;
";
