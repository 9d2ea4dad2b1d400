//! Error types for `recon-core`.
//!
//! Only configuration errors live here. Absent data is never an error; it is
//! expressed as `None` or an empty value by the function that detects it.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("unknown role: {0:?}")]
  UnknownRole(String),

  #[error("unknown dashboard metric: {0:?}")]
  UnknownMetric(String),

  #[error("invalid ceiling {0}: must be finite and greater than zero")]
  InvalidCeiling(f64),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
