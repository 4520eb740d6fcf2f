//! Error type for `dossier-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A stored document no longer matches its record type.
  #[error("corrupt {table} row {id}: {source}")]
  CorruptRow {
    table:  &'static str,
    id:     String,
    source: serde_json::Error,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
