//! Seed data builders for tests and demos.
//!
//! Plain functions returning value structs; adjust fields with struct update
//! syntax (`PlayerMatchEvent { kills: 30, ..player_event(..) }`).

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::event::{
  MatchId, MatchSummary, Participant, PlayerMatchEvent, SteamId,
};

/// Match id used by single-match tests.
pub const MATCH: MatchId = MatchId(1);

/// Rounds played in every fixture event.
pub const ROUNDS: u32 = 20;

fn epoch() -> DateTime<Utc> {
  Utc.with_ymd_and_hms(2024, 1, 1, 18, 0, 0).single().unwrap_or_default()
}

pub fn participant(steam_id: &str, name: &str) -> Participant {
  Participant { steam_id: SteamId::new(steam_id), name: name.to_owned() }
}

/// A match played `days` days after the fixture epoch.
pub fn match_summary(match_id: MatchId, days: i64) -> MatchSummary {
  MatchSummary {
    match_id,
    map_name: "de_mirage".into(),
    played_at: epoch() + Duration::days(days),
  }
}

/// A row with all counting stats at zero and [`ROUNDS`] rounds played.
pub fn player_event(match_id: MatchId, steam_id: &str) -> PlayerMatchEvent {
  PlayerMatchEvent {
    match_id,
    steam_id: SteamId::new(steam_id),
    total_rounds_played: ROUNDS,
    ..Default::default()
  }
}

/// A dominant entry fragger.
pub fn strong_fragger(match_id: MatchId, steam_id: &str) -> PlayerMatchEvent {
  PlayerMatchEvent {
    kills: 25,
    deaths: 15,
    assists: 4,
    damage: 2400,
    adr: 120.0,
    first_kills: 3,
    first_deaths: 1,
    clutch_attempts: [3, 0, 0, 0, 0],
    clutch_wins: [2, 0, 0, 0, 0],
    average_round_time_of_death: Some(30.0),
    average_time_to_contact: Some(20.0),
    ..player_event(match_id, steam_id)
  }
}

/// A player who is outclassed in every role.
pub fn weak_player(match_id: MatchId, steam_id: &str) -> PlayerMatchEvent {
  PlayerMatchEvent {
    kills: 10,
    deaths: 18,
    assists: 2,
    damage: 1200,
    adr: 60.0,
    first_deaths: 3,
    average_round_time_of_death: Some(35.0),
    average_time_to_contact: Some(25.0),
    ..player_event(match_id, steam_id)
  }
}

/// A full ten-player match with varied, deterministic stats.
///
/// Player `i` (0-based) gets steam id `7656119800000000{i}` and name
/// `player{i}`. Stats vary with `i` so every role has a distinct leader.
pub fn demo_match(
  match_id: MatchId,
  days: i64,
) -> (MatchSummary, Vec<Participant>, Vec<PlayerMatchEvent>) {
  let mut participants = Vec::with_capacity(10);
  let mut events = Vec::with_capacity(10);

  for i in 0..10u32 {
    let steam_id = format!("7656119800000000{i}");
    participants.push(participant(&steam_id, &format!("player{i}")));

    let j = 9 - i;
    let kills = 8 + 2 * i;
    let rounds = ROUNDS + 4;
    events.push(PlayerMatchEvent {
      kills,
      deaths: 10 + j,
      assists: i % 4,
      damage: kills * 95,
      adr: f64::from(kills * 95) / f64::from(rounds),
      first_kills: i / 2,
      first_deaths: j / 3,
      clutch_attempts: [j % 3 + 1, j % 2, 0, 0, 0],
      clutch_wins: [(j % 3 + 1) / 2, (j % 2) * (j / 8), 0, 0, 0],
      total_successful_trades: i / 3,
      total_possible_trades: 2 + i / 2,
      total_successful_traded_deaths: j / 3,
      total_possible_traded_deaths: 1 + j / 2,
      grenades_thrown: 6 + 2 * j,
      grenade_damage_dealt: 12 * j,
      enemy_flash_duration: 4.0 * f64::from(j),
      friendly_flash_duration: f64::from(i % 3),
      flashes_leading_to_kills: j / 2,
      average_grenade_effectiveness: Some(20.0 + 3.0 * f64::from(j)),
      average_round_time_of_death: Some(20.0 + 2.5 * f64::from(j)),
      average_time_to_contact: Some(12.0 + 1.5 * f64::from(j)),
      total_rounds_played: rounds,
      ..player_event(match_id, &steam_id)
    });
  }

  (match_summary(match_id, days), participants, events)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::role::RoleScores;

  #[test]
  fn demo_match_is_consistent() {
    let (summary, participants, events) = demo_match(MatchId(7), 2);
    assert_eq!(summary.match_id, MatchId(7));
    assert_eq!(participants.len(), 10);
    assert!(events.iter().all(|e| e.match_id == MatchId(7)));
    assert!(
      participants
        .iter()
        .zip(&events)
        .all(|(p, e)| p.steam_id == e.steam_id)
    );
  }

  #[test]
  fn strong_fragger_outscores_weak_player() {
    let strong = RoleScores::from_event(&strong_fragger(MATCH, "1"));
    let weak = RoleScores::from_event(&weak_player(MATCH, "2"));
    assert!(strong.fragger > weak.fragger);
    assert!(strong.opener > weak.opener);
  }
}
