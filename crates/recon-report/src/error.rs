//! Error type for `recon-report`.

use recon_core::event::{MatchId, SteamId};
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("cache error: {0}")]
  Cache(#[source] BoxError),

  #[error("access check failed: {0}")]
  Access(#[source] BoxError),

  #[error("{viewer} may not view match {match_id}")]
  AccessDenied { viewer: SteamId, match_id: MatchId },

  #[error(transparent)]
  Core(#[from] recon_core::Error),

  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),
}

impl Error {
  pub(crate) fn store<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Store(Box::new(e))
  }

  pub(crate) fn cache<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Cache(Box::new(e))
  }

  pub(crate) fn access<E: std::error::Error + Send + Sync + 'static>(e: E) -> Self {
    Self::Access(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
