//! Deterministic cache keys.
//!
//! Filters are canonicalised into key order, serialised as compact JSON and
//! hashed with SHA-256. Two filter maps with the same content produce the
//! same key regardless of insertion order.

use std::{collections::BTreeMap, fmt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Suffix used when a computation has no filters, so unfiltered keys stay
/// readable (`"top_roles:default"`).
pub const DEFAULT_FILTER_KEY: &str = "default";

/// A scalar filter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
  Null,
  Bool(bool),
  Int(i64),
  Float(f64),
  Text(String),
}

impl From<bool> for FilterValue {
  fn from(v: bool) -> Self { Self::Bool(v) }
}

impl From<i64> for FilterValue {
  fn from(v: i64) -> Self { Self::Int(v) }
}

impl From<i32> for FilterValue {
  fn from(v: i32) -> Self { Self::Int(v.into()) }
}

impl From<u32> for FilterValue {
  fn from(v: u32) -> Self { Self::Int(v.into()) }
}

impl From<f64> for FilterValue {
  fn from(v: f64) -> Self { Self::Float(v) }
}

impl From<&str> for FilterValue {
  fn from(v: &str) -> Self { Self::Text(v.to_owned()) }
}

impl From<String> for FilterValue {
  fn from(v: String) -> Self { Self::Text(v) }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
  fn from(v: Option<T>) -> Self { v.map_or(Self::Null, Into::into) }
}

/// A cache key: `"{name}:{sha256 of canonical filters}"` or
/// `"{name}:default"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
  /// Build the key for computation `name` under `filters`.
  ///
  /// Later duplicates of a filter name overwrite earlier ones.
  pub fn build<K, V, I>(name: &str, filters: I) -> Self
  where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<FilterValue>,
  {
    let canonical: BTreeMap<String, FilterValue> = filters
      .into_iter()
      .map(|(k, v)| (k.into(), v.into()))
      .collect();

    if canonical.is_empty() {
      return Self(format!("{name}:{DEFAULT_FILTER_KEY}"));
    }

    Self(format!("{name}:{}", digest(&canonical)))
  }

  /// Key for a computation that takes no filters.
  pub fn unfiltered(name: &str) -> Self {
    Self::build(name, std::iter::empty::<(String, FilterValue)>())
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CacheKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

fn digest(canonical: &BTreeMap<String, FilterValue>) -> String {
  let mut hasher = Sha256::new();
  // BTreeMap iterates in key order; scalar values always serialise.
  for (name, value) in canonical {
    hasher.update(name.as_bytes());
    hasher.update([0u8]);
    hasher.update(serde_json::to_string(value).unwrap_or_default().as_bytes());
    hasher.update([0u8]);
  }
  hex::encode(hasher.finalize())
}
