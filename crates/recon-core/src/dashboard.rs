//! Windowed dashboard statistics with trends.
//!
//! A player's history (most recent first) is split into a current window of
//! `n` matches and the `n` matches immediately before it. Counting stats are
//! pooled per window before ratios are taken, so one short match cannot
//! dominate an average.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::{
  Error, Result,
  event::PlayerMatchEvent,
  normalise::{Polarity, percentage, ratio},
  trend::{StatWithTrend, round_to},
};

/// Decimal places kept in dashboard values.
const VALUE_PRECISION: u32 = 2;

/// A statistic shown on the player dashboard.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize, Display, EnumString, EnumIter, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DashboardMetric {
  KdRatio,
  KillsPerRound,
  AverageDamagePerRound,
  FirstKillDifferential,
  ClutchWinRate,
  TradeSuccessRate,
  EnemyFlashDuration,
  TimeToContact,
}

impl DashboardMetric {
  pub fn parse(name: &str) -> Result<Self> {
    name.parse().map_err(|_| Error::UnknownMetric(name.to_owned()))
  }

  /// Presentation polarity: reaching contact sooner is better, everything
  /// else is better when higher.
  pub fn polarity(self) -> Polarity {
    match self {
      Self::TimeToContact => Polarity::LowerIsBetter,
      _ => Polarity::HigherIsBetter,
    }
  }
}

// ─── Window totals ───────────────────────────────────────────────────────────

/// Counting stats pooled over a window of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowTotals {
  pub matches:              u32,
  pub rounds:               u32,
  pub kills:                u32,
  pub deaths:               u32,
  pub damage:               u64,
  pub first_kills:          u32,
  pub first_deaths:         u32,
  pub clutch_attempts:      u32,
  pub clutch_wins:          u32,
  pub successful_trades:    u32,
  pub possible_trades:      u32,
  pub enemy_flash_duration: f64,
  time_to_contact_sum:      f64,
  time_to_contact_samples:  u32,
}

impl WindowTotals {
  pub fn from_events<'a>(
    events: impl IntoIterator<Item = &'a PlayerMatchEvent>,
  ) -> Self {
    let mut t = Self::default();
    for e in events {
      t.matches += 1;
      t.rounds += e.total_rounds_played;
      t.kills += e.kills;
      t.deaths += e.deaths;
      t.damage += u64::from(e.damage);
      t.first_kills += e.first_kills;
      t.first_deaths += e.first_deaths;
      t.clutch_attempts += e.clutch_attempts_total();
      t.clutch_wins += e.clutch_wins_total();
      t.successful_trades += e.total_successful_trades;
      t.possible_trades += e.total_possible_trades;
      t.enemy_flash_duration += e.enemy_flash_duration;
      if let Some(ttc) = e.average_time_to_contact {
        t.time_to_contact_sum += ttc;
        t.time_to_contact_samples += 1;
      }
    }
    t
  }

  /// The pooled value of `metric` over this window.
  pub fn value(&self, metric: DashboardMetric) -> f64 {
    let f = |v: u32| f64::from(v);
    let raw = match metric {
      DashboardMetric::KdRatio => {
        if self.deaths == 0 {
          f(self.kills)
        } else {
          ratio(f(self.kills), f(self.deaths))
        }
      }
      DashboardMetric::KillsPerRound => ratio(f(self.kills), f(self.rounds)),
      DashboardMetric::AverageDamagePerRound => {
        ratio(self.damage as f64, f(self.rounds))
      }
      DashboardMetric::FirstKillDifferential => ratio(
        f(self.first_kills) - f(self.first_deaths),
        f(self.matches),
      ),
      DashboardMetric::ClutchWinRate => {
        percentage(f(self.clutch_wins), f(self.clutch_attempts))
      }
      DashboardMetric::TradeSuccessRate => {
        percentage(f(self.successful_trades), f(self.possible_trades))
      }
      DashboardMetric::EnemyFlashDuration => {
        ratio(self.enemy_flash_duration, f(self.matches))
      }
      DashboardMetric::TimeToContact => ratio(
        self.time_to_contact_sum,
        f(self.time_to_contact_samples),
      ),
    };
    round_to(raw, VALUE_PRECISION)
  }
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Every dashboard metric for a player, compared against the prior window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
  /// Matches in each of the two compared windows. 0 when the history was too
  /// short to compare; the stats then cover whatever history exists.
  pub window: usize,
  pub stats:  BTreeMap<DashboardMetric, StatWithTrend>,
}

impl Dashboard {
  /// Keep only `metrics`. An empty selection keeps everything.
  pub fn select(mut self, metrics: &[DashboardMetric]) -> Self {
    if !metrics.is_empty() {
      self.stats.retain(|metric, _| metrics.contains(metric));
    }
    self
  }
}

/// Size of each comparison window: at most `window`, and both windows must
/// be full.
pub fn comparable_window(history_len: usize, window: usize) -> usize {
  window.min(history_len / 2)
}

/// Build the dashboard from `history`, ordered most recent first.
pub fn dashboard(history: &[PlayerMatchEvent], window: usize) -> Dashboard {
  let n = comparable_window(history.len(), window);

  if n == 0 {
    let recent = &history[..history.len().min(window.max(1))];
    let totals = WindowTotals::from_events(recent);
    let stats = DashboardMetric::iter()
      .map(|m| (m, StatWithTrend::flat(totals.value(m))))
      .collect();
    return Dashboard { window: 0, stats };
  }

  let current = WindowTotals::from_events(&history[..n]);
  let previous = WindowTotals::from_events(&history[n..2 * n]);
  let stats = DashboardMetric::iter()
    .map(|m| (m, StatWithTrend::new(current.value(m), previous.value(m))))
    .collect();

  Dashboard { window: n, stats }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    event::{MatchId, SteamId},
    trend::Trend,
  };

  fn game(kills: u32, deaths: u32, ttc: Option<f64>) -> PlayerMatchEvent {
    PlayerMatchEvent {
      match_id: MatchId(1),
      steam_id: SteamId::new("1"),
      kills,
      deaths,
      damage: kills * 100,
      total_rounds_played: 20,
      average_time_to_contact: ttc,
      ..Default::default()
    }
  }

  #[test]
  fn select_keeps_requested_metrics() {
    let history = [game(20, 10, Some(15.0)), game(10, 10, Some(18.0))];
    let all = dashboard(&history, 1);

    let picked = all.clone().select(&[DashboardMetric::KdRatio]);
    assert_eq!(picked.stats.keys().copied().collect::<Vec<_>>(), [DashboardMetric::KdRatio]);
    assert_eq!(picked.window, all.window);

    assert_eq!(all.clone().select(&[]), all);
  }

  #[test]
  fn metric_names_parse() {
    assert_eq!(
      DashboardMetric::parse("kd_ratio").unwrap(),
      DashboardMetric::KdRatio
    );
    assert!(matches!(
      DashboardMetric::parse("headshots"),
      Err(Error::UnknownMetric(_))
    ));
  }

  #[test]
  fn windows_must_be_equal_and_full() {
    assert_eq!(comparable_window(10, 5), 5);
    assert_eq!(comparable_window(7, 5), 3);
    assert_eq!(comparable_window(1, 5), 0);
    assert_eq!(comparable_window(8, 0), 0);
  }

  #[test]
  fn totals_are_pooled_not_averaged() {
    let t = WindowTotals::from_events(&[game(30, 10, None), game(0, 10, None)]);
    assert_eq!(t.value(DashboardMetric::KdRatio), 1.5);
    assert_eq!(t.value(DashboardMetric::KillsPerRound), 0.75);
    assert_eq!(t.value(DashboardMetric::AverageDamagePerRound), 75.0);
  }

  #[test]
  fn time_to_contact_ignores_absent_samples() {
    let t = WindowTotals::from_events(&[
      game(1, 1, Some(10.0)),
      game(1, 1, None),
      game(1, 1, Some(20.0)),
    ]);
    assert_eq!(t.value(DashboardMetric::TimeToContact), 15.0);
    assert_eq!(WindowTotals::default().value(DashboardMetric::TimeToContact), 0.0);
  }

  #[test]
  fn compares_recent_window_with_the_one_before() {
    // Most recent first: two strong games, then two weak ones, then noise
    // that falls outside both windows.
    let history = vec![
      game(20, 10, Some(12.0)),
      game(20, 10, Some(12.0)),
      game(10, 10, Some(15.0)),
      game(10, 10, Some(15.0)),
      game(50, 1, Some(1.0)),
    ];
    let board = dashboard(&history, 2);
    assert_eq!(board.window, 2);

    let kd = board.stats[&DashboardMetric::KdRatio];
    assert_eq!(kd.value, 2.0);
    assert_eq!(kd.trend, Trend::Up);
    assert_eq!(kd.change, 100.0);

    let ttc = board.stats[&DashboardMetric::TimeToContact];
    assert_eq!(ttc.trend, Trend::Down);
    assert_eq!(ttc.change, -20.0);
    assert_eq!(
      ttc.is_improvement(DashboardMetric::TimeToContact.polarity()),
      Some(true)
    );
  }

  #[test]
  fn short_history_reports_flat_stats() {
    let board = dashboard(&[game(12, 6, None)], 5);
    assert_eq!(board.window, 0);
    let kd = board.stats[&DashboardMetric::KdRatio];
    assert_eq!(kd.value, 2.0);
    assert_eq!(kd.trend, Trend::Neutral);
    assert_eq!(kd.change, 0.0);
  }

  #[test]
  fn empty_history_is_all_zero() {
    let board = dashboard(&[], 5);
    assert_eq!(board.stats.len(), DashboardMetric::iter().count());
    assert!(board.stats.values().all(|s| s.value == 0.0));
  }
}
