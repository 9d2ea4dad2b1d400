//! SQL schema for the Recon SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS matches (
    match_id   INTEGER PRIMARY KEY,
    map_name   TEXT NOT NULL,
    played_at  TEXT NOT NULL          -- ISO 8601 UTC
);

-- position preserves the participant order delivered by ingestion; it is
-- the tie-break order for top-role selection.
CREATE TABLE IF NOT EXISTS participants (
    match_id  INTEGER NOT NULL REFERENCES matches(match_id) ON DELETE CASCADE,
    steam_id  TEXT    NOT NULL,
    name      TEXT    NOT NULL,
    position  INTEGER NOT NULL,
    PRIMARY KEY (match_id, steam_id)
);

-- One row per (match, player); replaced wholesale when a demo is
-- reprocessed.
CREATE TABLE IF NOT EXISTS player_match_events (
    match_id                       INTEGER NOT NULL,
    steam_id                       TEXT    NOT NULL,
    kills                          INTEGER NOT NULL DEFAULT 0,
    deaths                         INTEGER NOT NULL DEFAULT 0,
    assists                        INTEGER NOT NULL DEFAULT 0,
    damage                         INTEGER NOT NULL DEFAULT 0,
    adr                            REAL    NOT NULL DEFAULT 0,
    first_kills                    INTEGER NOT NULL DEFAULT 0,
    first_deaths                   INTEGER NOT NULL DEFAULT 0,
    clutch_attempts_1v1            INTEGER NOT NULL DEFAULT 0,
    clutch_attempts_1v2            INTEGER NOT NULL DEFAULT 0,
    clutch_attempts_1v3            INTEGER NOT NULL DEFAULT 0,
    clutch_attempts_1v4            INTEGER NOT NULL DEFAULT 0,
    clutch_attempts_1v5            INTEGER NOT NULL DEFAULT 0,
    clutch_wins_1v1                INTEGER NOT NULL DEFAULT 0,
    clutch_wins_1v2                INTEGER NOT NULL DEFAULT 0,
    clutch_wins_1v3                INTEGER NOT NULL DEFAULT 0,
    clutch_wins_1v4                INTEGER NOT NULL DEFAULT 0,
    clutch_wins_1v5                INTEGER NOT NULL DEFAULT 0,
    total_successful_trades        INTEGER NOT NULL DEFAULT 0,
    total_possible_trades          INTEGER NOT NULL DEFAULT 0,
    total_successful_traded_deaths INTEGER NOT NULL DEFAULT 0,
    total_possible_traded_deaths   INTEGER NOT NULL DEFAULT 0,
    grenades_thrown                INTEGER NOT NULL DEFAULT 0,
    grenade_damage_dealt           INTEGER NOT NULL DEFAULT 0,
    enemy_flash_duration           REAL    NOT NULL DEFAULT 0,
    friendly_flash_duration        REAL    NOT NULL DEFAULT 0,
    flashes_leading_to_kills       INTEGER NOT NULL DEFAULT 0,
    average_grenade_effectiveness  REAL,
    average_round_time_of_death    REAL,
    average_time_to_contact        REAL,
    total_rounds_played            INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (match_id, steam_id),
    FOREIGN KEY (match_id, steam_id)
        REFERENCES participants(match_id, steam_id) ON DELETE CASCADE
);

-- Memoized aggregates; unique per (match_id, cache_key).
CREATE TABLE IF NOT EXISTS cache_entries (
    match_id   INTEGER NOT NULL,
    cache_key  TEXT    NOT NULL,
    payload    TEXT    NOT NULL,      -- JSON
    created_at TEXT    NOT NULL,      -- ISO 8601 UTC
    PRIMARY KEY (match_id, cache_key)
);

CREATE INDEX IF NOT EXISTS events_player_idx ON player_match_events(steam_id);
CREATE INDEX IF NOT EXISTS matches_played_idx ON matches(played_at);

PRAGMA user_version = 1;
";
