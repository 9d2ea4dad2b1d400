//! [`SqliteStore`]: the SQLite implementation of [`MatchStore`] and
//! [`CacheStore`].

use std::{collections::HashSet, path::Path};

use rusqlite::OptionalExtension as _;

use recon_core::{
  event::{MatchId, MatchSummary, Participant, PlayerMatchEvent, SteamId},
  store::{CacheEntry, CacheStore, MatchStore},
};

use crate::{
  Error, Result,
  encode::{EVENT_COLUMNS, RawCacheEntry, RawMatch, encode_dt, read_event},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Recon store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

/// Every event must belong to the match being written and to one of its
/// participants.
fn check_events(
  match_id: MatchId,
  participants: &[Participant],
  events: &[PlayerMatchEvent],
) -> Result<()> {
  let known: HashSet<&SteamId> = participants.iter().map(|p| &p.steam_id).collect();
  match events
    .iter()
    .find(|e| e.match_id != match_id || !known.contains(&e.steam_id))
  {
    Some(orphan) => Err(Error::OrphanEvent {
      match_id,
      steam_id: orphan.steam_id.clone(),
    }),
    None => Ok(()),
  }
}

fn insert_event(
  tx: &rusqlite::Transaction<'_>,
  e: &PlayerMatchEvent,
) -> rusqlite::Result<()> {
  let [a1, a2, a3, a4, a5] = e.clutch_attempts;
  let [w1, w2, w3, w4, w5] = e.clutch_wins;
  tx.execute(
    &format!(
      "INSERT INTO player_match_events ({}) VALUES (
         ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16,
         ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28, ?29, ?30,
         ?31, ?32
       )",
      EVENT_COLUMNS.replace("e.", "")
    ),
    rusqlite::params![
      e.match_id.0,
      e.steam_id.as_str(),
      e.kills,
      e.deaths,
      e.assists,
      e.damage,
      e.adr,
      e.first_kills,
      e.first_deaths,
      a1, a2, a3, a4, a5,
      w1, w2, w3, w4, w5,
      e.total_successful_trades,
      e.total_possible_trades,
      e.total_successful_traded_deaths,
      e.total_possible_traded_deaths,
      e.grenades_thrown,
      e.grenade_damage_dealt,
      e.enemy_flash_duration,
      e.friendly_flash_duration,
      e.flashes_leading_to_kills,
      e.average_grenade_effectiveness,
      e.average_round_time_of_death,
      e.average_time_to_contact,
      e.total_rounds_played,
    ],
  )?;
  Ok(())
}

// ─── MatchStore impl ─────────────────────────────────────────────────────────

impl MatchStore for SqliteStore {
  type Error = Error;

  async fn get_match(&self, match_id: MatchId) -> Result<Option<MatchSummary>> {
    let raw: Option<RawMatch> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT match_id, map_name, played_at FROM matches WHERE match_id = ?1",
            rusqlite::params![match_id.0],
            |row| {
              Ok(RawMatch {
                match_id:  row.get(0)?,
                map_name:  row.get(1)?,
                played_at: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawMatch::into_summary).transpose()
  }

  async fn participants(&self, match_id: MatchId) -> Result<Vec<Participant>> {
    let rows = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT steam_id, name FROM participants
           WHERE match_id = ?1
           ORDER BY position",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![match_id.0], |row| {
            Ok(Participant {
              steam_id: SteamId(row.get(0)?),
              name:     row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(rows)
  }

  async fn player_event(
    &self,
    match_id: MatchId,
    steam_id: &SteamId,
  ) -> Result<Option<PlayerMatchEvent>> {
    let steam_id = steam_id.as_str().to_owned();

    let event = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {EVENT_COLUMNS} FROM player_match_events e
               WHERE e.match_id = ?1 AND e.steam_id = ?2"
            ),
            rusqlite::params![match_id.0, steam_id],
            read_event,
          )
          .optional()?)
      })
      .await?;
    Ok(event)
  }

  async fn match_events(&self, match_id: MatchId) -> Result<Vec<PlayerMatchEvent>> {
    let events = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS}
           FROM player_match_events e
           JOIN participants p
             ON p.match_id = e.match_id AND p.steam_id = e.steam_id
           WHERE e.match_id = ?1
           ORDER BY p.position"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![match_id.0], read_event)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(events)
  }

  async fn player_history(
    &self,
    steam_id: &SteamId,
    limit: usize,
  ) -> Result<Vec<PlayerMatchEvent>> {
    let steam_id  = steam_id.as_str().to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let events = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {EVENT_COLUMNS}
           FROM player_match_events e
           JOIN matches m ON m.match_id = e.match_id
           WHERE e.steam_id = ?1
           ORDER BY m.played_at DESC, m.match_id DESC
           LIMIT ?2"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![steam_id, limit_val], read_event)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(events)
  }

  async fn record_match(
    &self,
    summary: MatchSummary,
    participants: Vec<Participant>,
    events: Vec<PlayerMatchEvent>,
  ) -> Result<()> {
    check_events(summary.match_id, &participants, &events)?;

    let match_id      = summary.match_id.0;
    let played_at_str = encode_dt(summary.played_at);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "DELETE FROM player_match_events WHERE match_id = ?1",
          rusqlite::params![match_id],
        )?;
        tx.execute(
          "DELETE FROM participants WHERE match_id = ?1",
          rusqlite::params![match_id],
        )?;
        tx.execute(
          "INSERT INTO matches (match_id, map_name, played_at) VALUES (?1, ?2, ?3)
           ON CONFLICT (match_id) DO UPDATE
             SET map_name = excluded.map_name, played_at = excluded.played_at",
          rusqlite::params![match_id, summary.map_name, played_at_str],
        )?;

        for (position, p) in participants.iter().enumerate() {
          tx.execute(
            "INSERT INTO participants (match_id, steam_id, name, position)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![match_id, p.steam_id.as_str(), p.name, position as i64],
          )?;
        }
        for event in &events {
          insert_event(&tx, event)?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── CacheStore impl ─────────────────────────────────────────────────────────

impl CacheStore for SqliteStore {
  type Error = Error;

  async fn get(&self, match_id: MatchId, key: &str) -> Result<Option<CacheEntry>> {
    let key = key.to_owned();

    let raw: Option<RawCacheEntry> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT match_id, cache_key, payload, created_at FROM cache_entries
             WHERE match_id = ?1 AND cache_key = ?2",
            rusqlite::params![match_id.0, key],
            |row| {
              Ok(RawCacheEntry {
                match_id:   row.get(0)?,
                cache_key:  row.get(1)?,
                payload:    row.get(2)?,
                created_at: row.get(3)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCacheEntry::into_entry).transpose()
  }

  async fn put(&self, entry: CacheEntry) -> Result<()> {
    let match_id       = entry.match_id.0;
    let payload_str    = entry.payload.to_string();
    let created_at_str = encode_dt(entry.created_at);
    let key            = entry.key;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO cache_entries (match_id, cache_key, payload, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (match_id, cache_key) DO UPDATE
             SET payload = excluded.payload, created_at = excluded.created_at",
          rusqlite::params![match_id, key, payload_str, created_at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn forget_match(&self, match_id: MatchId) -> Result<u64> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM cache_entries WHERE match_id = ?1",
          rusqlite::params![match_id.0],
        )?)
      })
      .await?;
    Ok(removed as u64)
  }

  async fn flush(&self) -> Result<u64> {
    let removed = self
      .conn
      .call(|conn| Ok(conn.execute("DELETE FROM cache_entries", [])?))
      .await?;
    Ok(removed as u64)
  }
}
