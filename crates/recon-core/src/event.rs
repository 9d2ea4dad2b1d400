//! Match, participant and per-player event types.
//!
//! A [`PlayerMatchEvent`] is one row per (match, player) produced by the
//! external ingestion pipeline. Rows are immutable once a match is finalized;
//! reprocessing a demo replaces them wholesale.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalise::ratio;

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Database identifier of a finalized match.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default,
  Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MatchId(pub i64);

impl fmt::Display for MatchId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// A 64-bit Steam identifier, kept as text so it survives JSON untouched.
#[derive(
  Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize,
  Deserialize,
)]
#[serde(transparent)]
pub struct SteamId(pub String);

impl SteamId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SteamId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Match ───────────────────────────────────────────────────────────────────

/// Header row for a finalized match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
  pub match_id:  MatchId,
  pub map_name:  String,
  /// When the match was played; orders a player's history.
  pub played_at: DateTime<Utc>,
}

/// A player listed on a match. The order of the participant list is the
/// stable input order used for tie-breaks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
  pub steam_id: SteamId,
  pub name:     String,
}

// ─── PlayerMatchEvent ────────────────────────────────────────────────────────

/// Number of clutch size classes, 1v1 through 1v5.
pub const CLUTCH_SIZES: usize = 5;

/// Counting statistics for one player in one match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchEvent {
  pub match_id: MatchId,
  pub steam_id: SteamId,

  pub kills:   u32,
  pub deaths:  u32,
  pub assists: u32,
  pub damage:  u32,
  /// Average damage per round, as reported by the parser.
  pub adr:     f64,

  pub first_kills:  u32,
  pub first_deaths: u32,

  /// Clutch attempts indexed by size class: `[1v1, 1v2, 1v3, 1v4, 1v5]`.
  pub clutch_attempts: [u32; CLUTCH_SIZES],
  /// Clutch wins indexed like `clutch_attempts`.
  pub clutch_wins:     [u32; CLUTCH_SIZES],

  pub total_successful_trades:        u32,
  pub total_possible_trades:          u32,
  pub total_successful_traded_deaths: u32,
  pub total_possible_traded_deaths:   u32,

  pub grenades_thrown:          u32,
  pub grenade_damage_dealt:     u32,
  /// Seconds of blindness inflicted on enemies.
  pub enemy_flash_duration:     f64,
  /// Seconds of blindness inflicted on teammates.
  pub friendly_flash_duration:  f64,
  pub flashes_leading_to_kills: u32,
  /// 0–100; `None` when the player threw nothing measurable.
  pub average_grenade_effectiveness: Option<f64>,

  /// Seconds into the round, averaged over rounds the player died in.
  pub average_round_time_of_death: Option<f64>,
  /// Seconds into the round until first contact with an enemy.
  pub average_time_to_contact:     Option<f64>,

  pub total_rounds_played: u32,
}

impl PlayerMatchEvent {
  pub fn clutch_attempts_total(&self) -> u32 {
    self.clutch_attempts.iter().sum()
  }

  pub fn clutch_wins_total(&self) -> u32 { self.clutch_wins.iter().sum() }

  /// Clutch wins while outnumbered (1v2 and up).
  pub fn outnumbered_clutch_wins(&self) -> u32 {
    self.clutch_wins[1..].iter().sum()
  }

  /// Rounds in which this player took part in the opening duel.
  pub fn first_kill_attempts(&self) -> u32 {
    self.first_kills + self.first_deaths
  }

  pub fn first_kill_differential(&self) -> i64 {
    i64::from(self.first_kills) - i64::from(self.first_deaths)
  }

  /// Kill/death ratio. A deathless player's ratio is their kill count.
  pub fn kd_ratio(&self) -> f64 {
    if self.deaths == 0 {
      f64::from(self.kills)
    } else {
      f64::from(self.kills) / f64::from(self.deaths)
    }
  }

  /// `value / total_rounds_played`, or 0 when no rounds were played.
  pub fn per_round(&self, value: f64) -> f64 {
    ratio(value, f64::from(self.total_rounds_played))
  }

  /// ADR, forced to 0 for a player with no rounds.
  pub fn damage_per_round(&self) -> f64 {
    if self.total_rounds_played == 0 { 0.0 } else { self.adr }
  }
}
