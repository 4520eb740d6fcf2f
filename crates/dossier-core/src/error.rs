//! Error types for `dossier-core`.
//!
//! The view functions (search, facets, filters, aggregation) never fail;
//! only parsing user input and rendering exports can.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown filter field: {0:?}")]
  UnknownFacet(String),

  #[error("malformed filter {0:?}, expected FIELD=VALUE")]
  MalformedFilter(String),

  #[error("unknown data type: {0:?}")]
  UnknownDataType(String),

  #[error("unknown export type: {0:?}")]
  UnknownExportType(String),

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
