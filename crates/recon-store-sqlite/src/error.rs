//! Error type for `recon-store-sqlite`.

use recon_core::event::{MatchId, SteamId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// An event row was submitted for a player missing from the participant
  /// list of the same match.
  #[error("event for {steam_id} has no matching participant in match {match_id}")]
  OrphanEvent { match_id: MatchId, steam_id: SteamId },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
