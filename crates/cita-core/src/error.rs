//! Error types for `cita-core`.

use thiserror::Error;

use crate::appointment::AppointmentId;

#[derive(Debug, Error)]
pub enum Error {
  /// An edit targeted an id that is no longer in the list.
  #[error("appointment not found: {0}")]
  NotFound(AppointmentId),

  #[error("storage error: {0}")]
  Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
    Error::Storage(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
