//! The `MatchStore` and `CacheStore` traits.
//!
//! Both are implemented by storage backends (e.g. `recon-store-sqlite`).
//! Higher layers (`recon-cache`, `recon-report`) depend on these
//! abstractions, not on any concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::{
  Result,
  event::{MatchId, MatchSummary, Participant, PlayerMatchEvent, SteamId},
};

// ─── MatchStore ──────────────────────────────────────────────────────────────

/// Read access to finalized match data, plus the single write used by the
/// ingestion pipeline.
///
/// Absent rows are reported as `None` or an empty `Vec`, never as errors.
pub trait MatchStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Retrieve a match header. Returns `None` if not found.
  fn get_match(
    &self,
    match_id: MatchId,
  ) -> impl Future<Output = Result<Option<MatchSummary>, Self::Error>> + Send + '_;

  /// Participants in stable input order. Empty for an unknown match.
  fn participants(
    &self,
    match_id: MatchId,
  ) -> impl Future<Output = Result<Vec<Participant>, Self::Error>> + Send + '_;

  /// The event row for one player in one match.
  fn player_event<'a>(
    &'a self,
    match_id: MatchId,
    steam_id: &'a SteamId,
  ) -> impl Future<Output = Result<Option<PlayerMatchEvent>, Self::Error>> + Send + 'a;

  /// All event rows for a match, in one query.
  fn match_events(
    &self,
    match_id: MatchId,
  ) -> impl Future<Output = Result<Vec<PlayerMatchEvent>, Self::Error>> + Send + '_;

  /// Up to `limit` of a player's event rows, most recent match first.
  fn player_history<'a>(
    &'a self,
    steam_id: &'a SteamId,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<PlayerMatchEvent>, Self::Error>> + Send + 'a;

  /// Atomically replace everything stored for `summary.match_id`.
  ///
  /// Used when a demo is (re)processed. Callers must invalidate cached
  /// aggregates for the match afterwards.
  fn record_match(
    &self,
    summary: MatchSummary,
    participants: Vec<Participant>,
    events: Vec<PlayerMatchEvent>,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── CacheStore ──────────────────────────────────────────────────────────────

/// One memoized aggregate, unique per `(match_id, key)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
  pub key:        String,
  pub match_id:   MatchId,
  pub payload:    serde_json::Value,
  pub created_at: DateTime<Utc>,
}

impl CacheEntry {
  /// Serialise `value` into a new entry stamped now.
  pub fn new<T: Serialize>(
    match_id: MatchId,
    key: impl Into<String>,
    value: &T,
  ) -> Result<Self> {
    Ok(Self {
      key: key.into(),
      match_id,
      payload: serde_json::to_value(value)?,
      created_at: Utc::now(),
    })
  }

  pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
    Ok(serde_json::from_value(self.payload.clone())?)
  }
}

/// Backend for memoized aggregates.
///
/// Writers may race; `put` is last-writer-wins, which is safe because every
/// writer for a given scope computes the same value from the same inputs.
pub trait CacheStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get<'a>(
    &'a self,
    match_id: MatchId,
    key: &'a str,
  ) -> impl Future<Output = Result<Option<CacheEntry>, Self::Error>> + Send + 'a;

  /// Insert or overwrite the entry for `(entry.match_id, entry.key)`.
  fn put(
    &self,
    entry: CacheEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Remove every entry for a match; returns how many were removed.
  fn forget_match(
    &self,
    match_id: MatchId,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Remove every entry; returns how many were removed.
  fn flush(&self) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
