//! Error type for `psm-sync`.

use thiserror::Error;

use psm_core::EntityType;

#[derive(Debug, Error)]
pub enum Error {
  #[error("mapping error: {0}")]
  Core(#[from] psm_core::Error),

  #[error("store error: {0}")]
  Store(#[from] psm_store_sqlite::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  #[error("zip error: {0}")]
  Zip(#[from] zip::result::ZipError),

  /// A page from the API did not have the expected `{ "items": [...] }`
  /// shape.
  #[error("unexpected page shape for {entity} at offset {offset}")]
  MalformedPage { entity: EntityType, offset: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
