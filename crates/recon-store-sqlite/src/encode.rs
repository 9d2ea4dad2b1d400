//! Encoding and decoding helpers between Recon domain types and SQLite
//! columns.
//!
//! Timestamps are stored as RFC 3339 strings and cache payloads as compact
//! JSON. Event rows are plain integers and reals and map column-for-field.

use chrono::{DateTime, SecondsFormat, Utc};
use recon_core::{
  event::{CLUTCH_SIZES, MatchId, MatchSummary, PlayerMatchEvent, SteamId},
  store::CacheEntry,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// Fixed-width UTC form so that `ORDER BY played_at` is chronological.
pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Event rows ──────────────────────────────────────────────────────────────

/// Column list for `player_match_events` aliased as `e`, in the order
/// [`read_event`] expects.
pub const EVENT_COLUMNS: &str = "
  e.match_id, e.steam_id,
  e.kills, e.deaths, e.assists, e.damage, e.adr,
  e.first_kills, e.first_deaths,
  e.clutch_attempts_1v1, e.clutch_attempts_1v2, e.clutch_attempts_1v3,
  e.clutch_attempts_1v4, e.clutch_attempts_1v5,
  e.clutch_wins_1v1, e.clutch_wins_1v2, e.clutch_wins_1v3,
  e.clutch_wins_1v4, e.clutch_wins_1v5,
  e.total_successful_trades, e.total_possible_trades,
  e.total_successful_traded_deaths, e.total_possible_traded_deaths,
  e.grenades_thrown, e.grenade_damage_dealt,
  e.enemy_flash_duration, e.friendly_flash_duration,
  e.flashes_leading_to_kills, e.average_grenade_effectiveness,
  e.average_round_time_of_death, e.average_time_to_contact,
  e.total_rounds_played";

const CLUTCH_ATTEMPTS_AT: usize = 9;
const CLUTCH_WINS_AT: usize = CLUTCH_ATTEMPTS_AT + CLUTCH_SIZES;

fn read_clutches(
  row: &rusqlite::Row<'_>,
  start: usize,
) -> rusqlite::Result<[u32; CLUTCH_SIZES]> {
  let mut out = [0; CLUTCH_SIZES];
  for (i, slot) in out.iter_mut().enumerate() {
    *slot = row.get(start + i)?;
  }
  Ok(out)
}

/// Map a row selected with [`EVENT_COLUMNS`] onto a [`PlayerMatchEvent`].
pub fn read_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<PlayerMatchEvent> {
  Ok(PlayerMatchEvent {
    match_id:                       MatchId(row.get(0)?),
    steam_id:                       SteamId(row.get(1)?),
    kills:                          row.get(2)?,
    deaths:                         row.get(3)?,
    assists:                        row.get(4)?,
    damage:                         row.get(5)?,
    adr:                            row.get(6)?,
    first_kills:                    row.get(7)?,
    first_deaths:                   row.get(8)?,
    clutch_attempts:                read_clutches(row, CLUTCH_ATTEMPTS_AT)?,
    clutch_wins:                    read_clutches(row, CLUTCH_WINS_AT)?,
    total_successful_trades:        row.get(19)?,
    total_possible_trades:          row.get(20)?,
    total_successful_traded_deaths: row.get(21)?,
    total_possible_traded_deaths:   row.get(22)?,
    grenades_thrown:                row.get(23)?,
    grenade_damage_dealt:           row.get(24)?,
    enemy_flash_duration:           row.get(25)?,
    friendly_flash_duration:        row.get(26)?,
    flashes_leading_to_kills:       row.get(27)?,
    average_grenade_effectiveness:  row.get(28)?,
    average_round_time_of_death:    row.get(29)?,
    average_time_to_contact:        row.get(30)?,
    total_rounds_played:            row.get(31)?,
  })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `matches` row.
pub struct RawMatch {
  pub match_id:  i64,
  pub map_name:  String,
  pub played_at: String,
}

impl RawMatch {
  pub fn into_summary(self) -> Result<MatchSummary> {
    Ok(MatchSummary {
      match_id:  MatchId(self.match_id),
      map_name:  self.map_name,
      played_at: decode_dt(&self.played_at)?,
    })
  }
}

/// Raw strings read directly from a `cache_entries` row.
pub struct RawCacheEntry {
  pub match_id:   i64,
  pub cache_key:  String,
  pub payload:    String,
  pub created_at: String,
}

impl RawCacheEntry {
  pub fn into_entry(self) -> Result<CacheEntry> {
    Ok(CacheEntry {
      key:        self.cache_key,
      match_id:   MatchId(self.match_id),
      payload:    serde_json::from_str(&self.payload)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
