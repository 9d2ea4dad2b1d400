//! Cache configuration, threaded into [`crate::MatchScopedCache`] at
//! construction time.

use chrono::TimeDelta;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// When `false`, every `remember` call runs its producer and nothing is
  /// stored. Used for benchmarking and determinism checks.
  pub enabled:     bool,
  /// Entries older than this are recomputed. `None` keeps entries until the
  /// match is invalidated.
  pub ttl_seconds: Option<u64>,
}

impl Default for CacheConfig {
  fn default() -> Self { Self { enabled: true, ttl_seconds: None } }
}

impl CacheConfig {
  pub fn disabled() -> Self { Self { enabled: false, ..Self::default() } }

  pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
    self.ttl_seconds = Some(seconds);
    self
  }

  pub fn ttl(&self) -> Option<TimeDelta> {
    self
      .ttl_seconds
      .map(|s| i64::try_from(s).unwrap_or(i64::MAX).min(i64::MAX / 1000))
      .map(TimeDelta::seconds)
  }
}
