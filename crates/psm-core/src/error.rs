//! Error types for `psm-core`.

use thiserror::Error;

use crate::EntityType;

#[derive(Debug, Error)]
pub enum Error {
  /// The upstream feed handed us something other than a JSON object.
  #[error("{entity} record is not a JSON object (found {found})")]
  NotAnObject {
    entity: EntityType,
    found:  &'static str,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
