//! Bounded [0, 100] scoring of raw counting statistics.
//!
//! A raw metric is divided by a fixed per-metric [`Ceiling`], optionally
//! inverted, clamped to [0, 1] and scaled. Every function here is pure.

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Which direction of a raw metric counts as good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
  HigherIsBetter,
  LowerIsBetter,
}

/// A reference maximum for a metric. Always finite and strictly positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ceiling(f64);

impl Ceiling {
  /// Construct a ceiling from a domain constant.
  ///
  /// # Panics
  ///
  /// Panics (at compile time in a `const` context) if `value` is not finite
  /// and positive. A bad ceiling is a code defect, not a data condition.
  pub const fn of(value: f64) -> Self {
    assert!(
      value > 0.0 && value < f64::INFINITY,
      "ceiling must be finite and greater than zero"
    );
    Self(value)
  }

  /// Fallible constructor for ceilings that come from configuration.
  pub fn new(value: f64) -> Result<Self> {
    if value > 0.0 && value.is_finite() {
      Ok(Self(value))
    } else {
      Err(Error::InvalidCeiling(value))
    }
  }

  pub fn get(self) -> f64 { self.0 }
}

/// Map `metric` onto an integer score in [0, 100].
///
/// A non-finite metric is treated as absent and scores 0 whatever the
/// polarity.
pub fn normalise(metric: f64, ceiling: Ceiling, polarity: Polarity) -> u8 {
  if !metric.is_finite() {
    return 0;
  }
  let share = metric / ceiling.get();
  let raw = match polarity {
    Polarity::HigherIsBetter => share,
    Polarity::LowerIsBetter => 1.0 - share,
  };
  (raw.clamp(0.0, 1.0) * 100.0).round() as u8
}

/// Like [`normalise`], but an absent metric scores 0.
pub fn normalise_opt(
  metric: Option<f64>,
  ceiling: Ceiling,
  polarity: Polarity,
) -> u8 {
  metric.map_or(0, |m| normalise(m, ceiling, polarity))
}

/// `numerator / denominator`, or 0 when the denominator is zero or the
/// quotient is not finite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
  if denominator == 0.0 {
    return 0.0;
  }
  let q = numerator / denominator;
  if q.is_finite() { q } else { 0.0 }
}

/// [`ratio`] expressed as a percentage.
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
  ratio(numerator, denominator) * 100.0
}
