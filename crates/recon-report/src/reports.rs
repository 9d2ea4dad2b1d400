//! [`Reports`]: cached, access-checked match reports.

use std::sync::Arc;

use recon_cache::{CacheKey, CacheStats, MatchScopedCache};
use recon_core::{
  access::MatchAccess,
  dashboard::{Dashboard, DashboardMetric, dashboard},
  event::{MatchId, MatchSummary, Participant, PlayerMatchEvent, SteamId},
  role::{Role, RoleScores},
  store::{CacheStore, MatchStore},
  top_role::{TopRoles, pair_participants, select_top},
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const COMPLEXION: &str = "complexion";
const MATCH_COMPLEXION: &str = "match_complexion";
const TOP_ROLES: &str = "top_roles";

/// One row of a match's complexion table. `scores` is `None` for a
/// participant with no event row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerComplexion {
  pub steam_id: SteamId,
  pub name:     String,
  pub scores:   Option<RoleScores>,
}

pub struct Reports<S, C, A> {
  store:        Arc<S>,
  cache:        MatchScopedCache<C>,
  access:       A,
  trend_window: usize,
}

impl<S, C, A> Reports<S, C, A>
where
  S: MatchStore,
  C: CacheStore,
  A: MatchAccess,
{
  pub fn new(store: Arc<S>, cache: MatchScopedCache<C>, access: A) -> Self {
    Self { store, cache, access, trend_window: 5 }
  }

  /// Set the default dashboard window.
  pub fn with_trend_window(mut self, window: usize) -> Self {
    self.trend_window = window;
    self
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  pub fn cache_stats(&self) -> CacheStats { self.cache.stats() }

  /// Fail with [`Error::AccessDenied`] unless `viewer` may see `match_id`.
  pub async fn ensure_access(&self, viewer: &SteamId, match_id: MatchId) -> Result<()> {
    let allowed = self
      .access
      .can_view(viewer, match_id)
      .await
      .map_err(Error::access)?;

    if allowed {
      Ok(())
    } else {
      Err(Error::AccessDenied { viewer: viewer.clone(), match_id })
    }
  }

  // ── Complexion ────────────────────────────────────────────────────────────

  /// All four role scores for one player. `None` when the player has no
  /// event row in the match.
  pub async fn player_complexion(
    &self,
    match_id: MatchId,
    steam_id: &SteamId,
  ) -> Result<Option<RoleScores>> {
    let key = CacheKey::build(COMPLEXION, [("steam_id", steam_id.as_str())]);

    self
      .cache
      .remember(&key, match_id, || async {
        let event = self
          .store
          .player_event(match_id, steam_id)
          .await
          .map_err(Error::store)?;
        Ok::<_, Error>(event.as_ref().map(RoleScores::from_event))
      })
      .await
  }

  /// One role score by name, e.g. `"fragger"`.
  pub async fn role_score(
    &self,
    match_id: MatchId,
    steam_id: &SteamId,
    role: &str,
  ) -> Result<Option<u8>> {
    let role = Role::parse(role)?;
    let scores = self.player_complexion(match_id, steam_id).await?;
    Ok(scores.map(|s| s.get(role)))
  }

  /// Complexion for every participant, in participant order.
  pub async fn match_complexion(&self, match_id: MatchId) -> Result<Vec<PlayerComplexion>> {
    let key = CacheKey::unfiltered(MATCH_COMPLEXION);

    self
      .cache
      .remember(&key, match_id, || async {
        let (participants, events) = self.load_match(match_id).await?;
        let rows: Vec<PlayerComplexion> = pair_participants(&participants, &events)
          .into_iter()
          .map(|(p, event)| PlayerComplexion {
            steam_id: p.steam_id.clone(),
            name:     p.name.clone(),
            scores:   event.map(RoleScores::from_event),
          })
          .collect();
        Ok::<_, Error>(rows)
      })
      .await
  }

  // ── Top roles ─────────────────────────────────────────────────────────────

  /// The best participant per role. Every slot is empty for an unknown
  /// match or one without event rows.
  pub async fn top_roles(&self, match_id: MatchId) -> Result<TopRoles> {
    let key = CacheKey::unfiltered(TOP_ROLES);

    self
      .cache
      .remember(&key, match_id, || async {
        let (participants, events) = self.load_match(match_id).await?;
        Ok::<_, Error>(select_top(pair_participants(&participants, &events)))
      })
      .await
  }

  async fn load_match(
    &self,
    match_id: MatchId,
  ) -> Result<(Vec<Participant>, Vec<PlayerMatchEvent>)> {
    let participants = self
      .store
      .participants(match_id)
      .await
      .map_err(Error::store)?;
    if participants.is_empty() {
      return Ok((participants, Vec::new()));
    }
    let events = self
      .store
      .match_events(match_id)
      .await
      .map_err(Error::store)?;
    Ok((participants, events))
  }

  // ── Trends ────────────────────────────────────────────────────────────────

  /// Dashboard comparing the player's last `window` matches with the
  /// `window` before them. Spans matches, so it is not cached.
  pub async fn player_dashboard(
    &self,
    steam_id: &SteamId,
    window: Option<usize>,
  ) -> Result<Dashboard> {
    let window = window.unwrap_or(self.trend_window).max(1);
    let history = self
      .store
      .player_history(steam_id, window.saturating_mul(2))
      .await
      .map_err(Error::store)?;
    Ok(dashboard(&history, window))
  }

  /// [`Self::player_dashboard`] narrowed to the named metrics, e.g.
  /// `["kd_ratio", "time_to_contact"]`. No names means every metric.
  pub async fn player_trends(
    &self,
    steam_id: &SteamId,
    window: Option<usize>,
    metrics: &[&str],
  ) -> Result<Dashboard> {
    let metrics = metrics
      .iter()
      .map(|name| DashboardMetric::parse(name))
      .collect::<recon_core::Result<Vec<_>>>()?;
    Ok(self.player_dashboard(steam_id, window).await?.select(&metrics))
  }

  // ── Ingestion and invalidation ────────────────────────────────────────────

  /// Store a processed match, replacing any previous version, and drop its
  /// cached aggregates. Returns the number of entries dropped.
  pub async fn ingest_match(
    &self,
    summary: MatchSummary,
    participants: Vec<Participant>,
    events: Vec<PlayerMatchEvent>,
  ) -> Result<u64> {
    let match_id = summary.match_id;
    let players = participants.len();

    self
      .store
      .record_match(summary, participants, events)
      .await
      .map_err(Error::store)?;
    let dropped = self.invalidate_match(match_id).await?;

    tracing::info!(%match_id, players, dropped, "ingested match");
    Ok(dropped)
  }

  pub async fn invalidate_match(&self, match_id: MatchId) -> Result<u64> {
    let dropped = self
      .cache
      .invalidate_match(match_id)
      .await
      .map_err(Error::cache)?;
    tracing::info!(%match_id, dropped, "invalidated cached reports");
    Ok(dropped)
  }

  pub async fn flush_cache(&self) -> Result<u64> {
    let dropped = self.cache.flush().await.map_err(Error::cache)?;
    tracing::info!(dropped, "flushed report cache");
    Ok(dropped)
  }
}
