//! Role complexion scores: opener, closer, support and fragger.
//!
//! Each role reads exactly five sub-metrics from a [`PlayerMatchEvent`],
//! normalises each against a fixed ceiling, and takes the truncated integer
//! mean.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  Error, Result,
  event::PlayerMatchEvent,
  normalise::{normalise, normalise_opt, percentage},
};

/// Number of sub-metrics feeding every role.
pub const SUB_METRICS: usize = 5;

// ─── Role ────────────────────────────────────────────────────────────────────

/// A tactical role a player can be rated in.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display,
  EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Opener,
  Closer,
  Support,
  Fragger,
}

impl Role {
  /// Parse a role name, rejecting anything outside the four known roles.
  pub fn parse(name: &str) -> Result<Self> {
    Self::from_str(name).map_err(|_| Error::UnknownRole(name.to_owned()))
  }
}

// ─── Ceilings ────────────────────────────────────────────────────────────────

/// Domain reference maxima used to normalise each sub-metric.
pub mod ceilings {
  use crate::normalise::Ceiling;

  pub const OPENER_TIME_OF_DEATH: Ceiling = Ceiling::of(40.0);
  pub const OPENER_TIME_TO_CONTACT: Ceiling = Ceiling::of(30.0);
  pub const FIRST_KILL_DIFFERENTIAL: Ceiling = Ceiling::of(5.0);
  pub const FIRST_KILL_ATTEMPTS: Ceiling = Ceiling::of(8.0);
  pub const TRADED_DEATH_PCT: Ceiling = Ceiling::of(50.0);

  pub const CLOSER_TIME_OF_DEATH: Ceiling = Ceiling::of(40.0);
  pub const CLOSER_TIME_TO_CONTACT: Ceiling = Ceiling::of(30.0);
  pub const CLUTCH_WIN_PCT: Ceiling = Ceiling::of(50.0);
  pub const CLUTCH_ATTEMPTS: Ceiling = Ceiling::of(5.0);
  pub const OUTNUMBERED_CLUTCH_WINS: Ceiling = Ceiling::of(2.0);

  pub const GRENADES_THROWN: Ceiling = Ceiling::of(25.0);
  pub const GRENADE_DAMAGE: Ceiling = Ceiling::of(150.0);
  pub const ENEMY_FLASH_DURATION: Ceiling = Ceiling::of(40.0);
  pub const GRENADE_EFFECTIVENESS: Ceiling = Ceiling::of(50.0);
  pub const FLASHES_LEADING_TO_KILLS: Ceiling = Ceiling::of(4.0);

  pub const KD_RATIO: Ceiling = Ceiling::of(1.5);
  pub const KILLS_PER_ROUND: Ceiling = Ceiling::of(1.0);
  pub const DAMAGE_PER_ROUND: Ceiling = Ceiling::of(100.0);
  pub const TRADE_KILL_PCT: Ceiling = Ceiling::of(50.0);
  pub const TRADE_OPPORTUNITIES_PER_ROUND: Ceiling = Ceiling::of(0.5);
}

// ─── Sub-scores ──────────────────────────────────────────────────────────────

use crate::normalise::Polarity::{HigherIsBetter as Higher, LowerIsBetter as Lower};

fn count(v: u32) -> f64 { f64::from(v) }

/// The five normalised sub-scores behind a role, in a fixed order.
pub fn sub_scores(role: Role, e: &PlayerMatchEvent) -> [u8; SUB_METRICS] {
  use ceilings::*;

  match role {
    Role::Opener => [
      normalise_opt(e.average_round_time_of_death, OPENER_TIME_OF_DEATH, Lower),
      normalise_opt(e.average_time_to_contact, OPENER_TIME_TO_CONTACT, Lower),
      normalise(
        e.first_kill_differential() as f64,
        FIRST_KILL_DIFFERENTIAL,
        Higher,
      ),
      normalise(count(e.first_kill_attempts()), FIRST_KILL_ATTEMPTS, Higher),
      normalise(
        percentage(
          count(e.total_successful_traded_deaths),
          count(e.total_possible_traded_deaths),
        ),
        TRADED_DEATH_PCT,
        Higher,
      ),
    ],
    Role::Closer => [
      normalise_opt(e.average_round_time_of_death, CLOSER_TIME_OF_DEATH, Higher),
      normalise_opt(e.average_time_to_contact, CLOSER_TIME_TO_CONTACT, Higher),
      normalise(
        percentage(count(e.clutch_wins_total()), count(e.clutch_attempts_total())),
        CLUTCH_WIN_PCT,
        Higher,
      ),
      normalise(count(e.clutch_attempts_total()), CLUTCH_ATTEMPTS, Higher),
      normalise(
        count(e.outnumbered_clutch_wins()),
        OUTNUMBERED_CLUTCH_WINS,
        Higher,
      ),
    ],
    Role::Support => [
      normalise(count(e.grenades_thrown), GRENADES_THROWN, Higher),
      normalise(count(e.grenade_damage_dealt), GRENADE_DAMAGE, Higher),
      normalise(e.enemy_flash_duration, ENEMY_FLASH_DURATION, Higher),
      normalise_opt(
        e.average_grenade_effectiveness,
        GRENADE_EFFECTIVENESS,
        Higher,
      ),
      normalise(
        count(e.flashes_leading_to_kills),
        FLASHES_LEADING_TO_KILLS,
        Higher,
      ),
    ],
    Role::Fragger => [
      normalise(e.kd_ratio(), KD_RATIO, Higher),
      normalise(e.per_round(count(e.kills)), KILLS_PER_ROUND, Higher),
      normalise(e.damage_per_round(), DAMAGE_PER_ROUND, Higher),
      normalise(
        percentage(
          count(e.total_successful_trades),
          count(e.total_possible_trades),
        ),
        TRADE_KILL_PCT,
        Higher,
      ),
      normalise(
        e.per_round(count(e.total_possible_trades)),
        TRADE_OPPORTUNITIES_PER_ROUND,
        Higher,
      ),
    ],
  }
}

/// Truncated integer mean of five sub-scores.
fn mean(parts: [u8; SUB_METRICS]) -> u8 {
  let sum: u16 = parts.iter().copied().map(u16::from).sum();
  (sum / SUB_METRICS as u16) as u8
}

/// Score `role` for a player. `None` means there is no event row, which is
/// distinct from a computed score of 0.
pub fn score(role: Role, event: Option<&PlayerMatchEvent>) -> Option<u8> {
  event.map(|e| mean(sub_scores(role, e)))
}

/// [`score`] with the role given by name.
pub fn score_named(
  role: &str,
  event: Option<&PlayerMatchEvent>,
) -> Result<Option<u8>> {
  Ok(score(Role::parse(role)?, event))
}

// ─── RoleScores ──────────────────────────────────────────────────────────────

/// All four role scores for one player in one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleScores {
  pub opener:  u8,
  pub closer:  u8,
  pub support: u8,
  pub fragger: u8,
}

impl RoleScores {
  pub fn from_event(event: &PlayerMatchEvent) -> Self {
    let of = |role| mean(sub_scores(role, event));
    Self {
      opener:  of(Role::Opener),
      closer:  of(Role::Closer),
      support: of(Role::Support),
      fragger: of(Role::Fragger),
    }
  }

  pub fn get(&self, role: Role) -> u8 {
    match role {
      Role::Opener => self.opener,
      Role::Closer => self.closer,
      Role::Support => self.support,
      Role::Fragger => self.fragger,
    }
  }

  /// `(role, score)` pairs in declaration order.
  pub fn iter(&self) -> impl Iterator<Item = (Role, u8)> + '_ {
    Role::iter().map(|role| (role, self.get(role)))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::event::{MatchId, SteamId};

  fn event() -> PlayerMatchEvent {
    PlayerMatchEvent {
      match_id: MatchId(1),
      steam_id: SteamId::new("76561198000000001"),
      total_rounds_played: 20,
      ..Default::default()
    }
  }

  #[test]
  fn role_names_round_trip() {
    for role in Role::iter() {
      assert_eq!(Role::parse(role.as_ref()).unwrap(), role);
    }
    assert_eq!(Role::Fragger.to_string(), "fragger");
  }

  #[test]
  fn unknown_role_is_a_configuration_error() {
    let err = score_named("lurker", Some(&event())).unwrap_err();
    assert!(matches!(err, Error::UnknownRole(ref r) if r == "lurker"));
  }

  #[test]
  fn missing_event_is_no_data_not_zero() {
    assert_eq!(score(Role::Fragger, None), None);
    assert_eq!(score_named("opener", None).unwrap(), None);
  }

  #[test]
  fn empty_event_scores_zero_not_none() {
    let e = PlayerMatchEvent { total_rounds_played: 0, ..event() };
    assert_eq!(score(Role::Support, Some(&e)), Some(0));
  }

  #[test]
  fn fragger_is_truncated_mean() {
    let e = PlayerMatchEvent {
      kills: 25,
      deaths: 15,
      adr: 120.0,
      total_successful_trades: 1,
      total_possible_trades: 4,
      ..event()
    };
    // kd 100, kpr 100, adr 100, trade 25% -> 50, 4/20 per round -> 40
    assert_eq!(sub_scores(Role::Fragger, &e), [100, 100, 100, 50, 40]);
    assert_eq!(score(Role::Fragger, Some(&e)), Some(78));
  }

  #[test]
  fn mean_truncates_instead_of_rounding() {
    assert_eq!(mean([100, 100, 100, 100, 99]), 99);
    assert_eq!(mean([1, 1, 1, 1, 0]), 0);
  }

  #[test]
  fn zero_rounds_zeroes_per_round_metrics() {
    let e = PlayerMatchEvent {
      kills: 10,
      deaths: 10,
      adr: 80.0,
      total_possible_trades: 6,
      total_rounds_played: 0,
      ..event()
    };
    let parts = sub_scores(Role::Fragger, &e);
    assert_eq!(parts[1], 0);
    assert_eq!(parts[2], 0);
    assert_eq!(parts[4], 0);
  }

  #[test]
  fn opener_rewards_early_aggression() {
    let e = PlayerMatchEvent {
      first_kills: 5,
      first_deaths: 1,
      average_round_time_of_death: Some(20.0),
      average_time_to_contact: Some(15.0),
      total_successful_traded_deaths: 3,
      total_possible_traded_deaths: 6,
      ..event()
    };
    // tod 50, ttc 50, diff 4/5 -> 80, attempts 6/8 -> 75, traded 50% -> 100
    assert_eq!(sub_scores(Role::Opener, &e), [50, 50, 80, 75, 100]);
    assert_eq!(score(Role::Opener, Some(&e)), Some(71));
  }

  #[test]
  fn closer_counts_outnumbered_wins() {
    let e = PlayerMatchEvent {
      clutch_attempts: [2, 2, 1, 0, 0],
      clutch_wins: [1, 1, 0, 0, 0],
      average_round_time_of_death: Some(44.0),
      average_time_to_contact: None,
      ..event()
    };
    // tod 100, ttc absent 0, 2/5 = 40% -> 80, attempts 5 -> 100, 1/2 -> 50
    assert_eq!(sub_scores(Role::Closer, &e), [100, 0, 80, 100, 50]);
    assert_eq!(score(Role::Closer, Some(&e)), Some(66));
  }

  #[test]
  fn support_uses_utility_totals() {
    let e = PlayerMatchEvent {
      grenades_thrown: 25,
      grenade_damage_dealt: 75,
      enemy_flash_duration: 10.0,
      average_grenade_effectiveness: Some(50.0),
      flashes_leading_to_kills: 1,
      ..event()
    };
    assert_eq!(sub_scores(Role::Support, &e), [100, 50, 25, 100, 25]);
    assert_eq!(RoleScores::from_event(&e).support, 60);
  }

  #[test]
  fn role_scores_agree_with_single_role_scoring() {
    let e = PlayerMatchEvent {
      kills: 18,
      deaths: 12,
      first_kills: 2,
      grenades_thrown: 9,
      ..event()
    };
    let all = RoleScores::from_event(&e);
    for (role, value) in all.iter() {
      assert_eq!(Some(value), score(role, Some(&e)));
    }
  }

  mod proptests {
    use proptest::prelude::*;

    use super::*;

    proptest! {
      #[test]
      fn role_scores_stay_bounded(
        kills in 0u32..200,
        deaths in 0u32..200,
        rounds in 0u32..60,
        first in 0u32..30,
        clutch in proptest::array::uniform5(0u32..10),
        time in proptest::option::of(-10.0f64..200.0),
        adr in -50.0f64..500.0,
      ) {
        let e = PlayerMatchEvent {
          kills,
          deaths,
          adr,
          first_kills: first,
          first_deaths: first / 2,
          clutch_attempts: clutch,
          clutch_wins: clutch.map(|c| c / 2),
          average_round_time_of_death: time,
          average_time_to_contact: time,
          total_rounds_played: rounds,
          ..event()
        };
        for (_, value) in RoleScores::from_event(&e).iter() {
          prop_assert!(value <= 100);
        }
      }
    }
  }
}
