//! Error type for `psm-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] psm_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  /// The DDL script could not be applied.
  #[error("schema error: {0}")]
  Schema(#[source] rusqlite::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// The manager's connection has already been released.
  #[error("database connection is closed")]
  Closed,

  #[error("statement is not read-only: {0}")]
  NotReadOnly(String),

  #[error("unknown table: {0}")]
  UnknownTable(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
