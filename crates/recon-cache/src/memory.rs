//! [`MemoryCacheStore`]: an in-process [`CacheStore`].

use std::{collections::HashMap, convert::Infallible, sync::Arc};

use recon_core::{
  event::MatchId,
  store::{CacheEntry, CacheStore},
};
use tokio::sync::RwLock;

type Entries = HashMap<MatchId, HashMap<String, CacheEntry>>;

/// A cache store held in process memory, grouped by match so a whole match
/// can be dropped in one operation.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone, Default)]
pub struct MemoryCacheStore {
  entries: Arc<RwLock<Entries>>,
}

impl MemoryCacheStore {
  pub fn new() -> Self { Self::default() }

  /// Number of entries across all matches.
  pub async fn len(&self) -> usize {
    self.entries.read().await.values().map(HashMap::len).sum()
  }

  pub async fn is_empty(&self) -> bool { self.len().await == 0 }
}

impl CacheStore for MemoryCacheStore {
  type Error = Infallible;

  async fn get(
    &self,
    match_id: MatchId,
    key: &str,
  ) -> Result<Option<CacheEntry>, Infallible> {
    let entries = self.entries.read().await;
    Ok(entries.get(&match_id).and_then(|m| m.get(key)).cloned())
  }

  async fn put(&self, entry: CacheEntry) -> Result<(), Infallible> {
    let mut entries = self.entries.write().await;
    entries
      .entry(entry.match_id)
      .or_default()
      .insert(entry.key.clone(), entry);
    Ok(())
  }

  async fn forget_match(&self, match_id: MatchId) -> Result<u64, Infallible> {
    let mut entries = self.entries.write().await;
    Ok(entries.remove(&match_id).map_or(0, |m| m.len() as u64))
  }

  async fn flush(&self) -> Result<u64, Infallible> {
    let mut entries = self.entries.write().await;
    let removed = entries.values().map(|m| m.len() as u64).sum();
    entries.clear();
    Ok(removed)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn entry(match_id: i64, key: &str, value: i64) -> CacheEntry {
    CacheEntry::new(MatchId(match_id), key, &value).unwrap()
  }

  #[tokio::test]
  async fn put_then_get() {
    let store = MemoryCacheStore::new();
    store.put(entry(1, "a", 10)).await.unwrap();

    let got = store.get(MatchId(1), "a").await.unwrap().unwrap();
    assert_eq!(got.decode::<i64>().unwrap(), 10);
    assert!(store.get(MatchId(2), "a").await.unwrap().is_none());
  }

  #[tokio::test]
  async fn put_overwrites_existing_entry() {
    let store = MemoryCacheStore::new();
    store.put(entry(1, "a", 10)).await.unwrap();
    store.put(entry(1, "a", 11)).await.unwrap();

    assert_eq!(store.len().await, 1);
    let got = store.get(MatchId(1), "a").await.unwrap().unwrap();
    assert_eq!(got.decode::<i64>().unwrap(), 11);
  }

  #[tokio::test]
  async fn forget_match_only_touches_that_match() {
    let store = MemoryCacheStore::new();
    store.put(entry(1, "a", 1)).await.unwrap();
    store.put(entry(1, "b", 2)).await.unwrap();
    store.put(entry(2, "a", 3)).await.unwrap();

    assert_eq!(store.forget_match(MatchId(1)).await.unwrap(), 2);
    assert_eq!(store.forget_match(MatchId(1)).await.unwrap(), 0);
    assert!(store.get(MatchId(2), "a").await.unwrap().is_some());
  }

  #[tokio::test]
  async fn flush_empties_everything() {
    let store = MemoryCacheStore::new();
    store.put(entry(1, "a", 1)).await.unwrap();
    store.put(entry(2, "a", 2)).await.unwrap();

    assert_eq!(store.flush().await.unwrap(), 2);
    assert!(store.is_empty().await);
  }
}
