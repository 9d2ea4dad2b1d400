//! Percentage change and direction between two comparable aggregates.
//!
//! The caller supplies a current-window value and a prior-window value of the
//! same statistic over windows of equal size. Direction is always factual;
//! whether "up" is good is decided by [`StatWithTrend::is_improvement`].

use serde::{Deserialize, Serialize};

use crate::normalise::Polarity;

/// Decimal places kept in a percentage change.
pub const DEFAULT_PRECISION: u32 = 1;

/// Direction of movement between two windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
  Up,
  Down,
  Neutral,
}

/// Direction plus percentage change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendChange {
  pub trend:  Trend,
  pub change: f64,
}

/// Round `value` to `precision` decimal places, halves away from zero.
pub fn round_to(value: f64, precision: u32) -> f64 {
  let factor = 10f64.powi(precision as i32);
  (value * factor).round() / factor
}

/// [`trend_with_precision`] at [`DEFAULT_PRECISION`].
pub fn trend(current: f64, previous: f64) -> TrendChange {
  trend_with_precision(current, previous, DEFAULT_PRECISION)
}

/// Compare `current` with `previous`.
///
/// A zero `previous` reports a change of 100 unless `current` is also zero.
pub fn trend_with_precision(
  current: f64,
  previous: f64,
  precision: u32,
) -> TrendChange {
  let change = if previous == 0.0 {
    if current == 0.0 { 0.0 } else { 100.0 }
  } else {
    round_to((current - previous) / previous * 100.0, precision)
  };

  let trend = if current > previous {
    Trend::Up
  } else if current < previous {
    Trend::Down
  } else {
    Trend::Neutral
  };

  TrendChange { trend, change }
}

// ─── StatWithTrend ───────────────────────────────────────────────────────────

/// A dashboard statistic paired with its movement against the prior window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatWithTrend {
  pub value:  f64,
  pub trend:  Trend,
  pub change: f64,
}

impl StatWithTrend {
  pub fn new(current: f64, previous: f64) -> Self {
    let TrendChange { trend, change } = trend(current, previous);
    Self { value: current, trend, change }
  }

  /// A value with no comparison window.
  pub fn flat(value: f64) -> Self {
    Self { value, trend: Trend::Neutral, change: 0.0 }
  }

  /// Whether the movement is good for a metric of the given polarity.
  /// `None` when nothing moved.
  pub fn is_improvement(&self, polarity: Polarity) -> Option<bool> {
    match (self.trend, polarity) {
      (Trend::Neutral, _) => None,
      (Trend::Up, Polarity::HigherIsBetter)
      | (Trend::Down, Polarity::LowerIsBetter) => Some(true),
      _ => Some(false),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn check(current: f64, previous: f64, expected: Trend, change: f64) {
    let got = trend(current, previous);
    assert_eq!(got.trend, expected, "trend({current}, {previous})");
    assert_eq!(got.change, change, "trend({current}, {previous})");
  }

  #[test]
  fn reference_cases() {
    check(10.0, 5.0, Trend::Up, 100.0);
    check(5.0, 10.0, Trend::Down, -50.0);
    check(5.0, 5.0, Trend::Neutral, 0.0);
    check(5.0, 0.0, Trend::Up, 100.0);
    check(0.0, 0.0, Trend::Neutral, 0.0);
  }

  #[test]
  fn falling_to_zero_is_full_decline() {
    check(0.0, 8.0, Trend::Down, -100.0);
  }

  #[test]
  fn change_is_rounded_to_precision() {
    assert_eq!(trend(1.0, 3.0).change, -66.7);
    assert_eq!(trend_with_precision(1.0, 3.0, 2).change, -66.67);
    assert_eq!(trend_with_precision(1.0, 3.0, 0).change, -67.0);
  }

  #[test]
  fn negative_current_against_zero_previous_still_reports_hundred() {
    let got = trend(-2.0, 0.0);
    assert_eq!(got.trend, Trend::Down);
    assert_eq!(got.change, 100.0);
  }

  #[test]
  fn improvement_depends_on_polarity() {
    let faster = StatWithTrend::new(12.0, 15.0);
    assert_eq!(faster.trend, Trend::Down);
    assert_eq!(faster.is_improvement(Polarity::LowerIsBetter), Some(true));
    assert_eq!(faster.is_improvement(Polarity::HigherIsBetter), Some(false));
    assert_eq!(StatWithTrend::flat(3.0).is_improvement(Polarity::HigherIsBetter), None);
  }

  #[test]
  fn trend_serialises_lowercase() {
    let json = serde_json::to_value(StatWithTrend::new(10.0, 5.0)).unwrap();
    assert_eq!(
      json,
      serde_json::json!({ "value": 10.0, "trend": "up", "change": 100.0 })
    );
  }
}
