//! [`MatchScopedCache`]: compute once per `(match, key)`, serve many.

use std::{
  collections::HashMap,
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
  },
};

use chrono::Utc;
use recon_core::{
  event::MatchId,
  store::{CacheEntry, CacheStore},
};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, RwLock};

use crate::{CacheConfig, CacheKey};

type Scope = (MatchId, CacheKey);

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Hit and miss counters since construction. Calls made while the cache is
/// disabled are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
  pub hits:   u64,
  pub misses: u64,
}

impl CacheStats {
  pub fn hit_rate(&self) -> f64 {
    let total = self.hits + self.misses;
    if total == 0 { 0.0 } else { self.hits as f64 / total as f64 }
  }
}

// ─── Cache ───────────────────────────────────────────────────────────────────

/// A memoization layer keyed by `(match_id, key)` over any [`CacheStore`].
///
/// - Concurrent misses for one scope are coalesced: the first caller runs
///   the producer, later callers wait and read its result.
/// - A producer error is returned unchanged and never stored.
/// - Store failures are logged and treated as misses; the producer's result
///   always wins over a broken backend.
/// - A value whose computation overlapped any invalidation or flush is
///   returned but not stored, so it cannot resurrect purged data.
pub struct MatchScopedCache<S> {
  store:      S,
  config:     CacheConfig,
  in_flight:  Mutex<HashMap<Scope, Arc<Mutex<()>>>>,
  /// Bumped by every invalidation. Writes hold the read side from the
  /// generation check through `put`; purges hold the write side.
  generation: RwLock<u64>,
  hits:       AtomicU64,
  misses:     AtomicU64,
}

impl<S: CacheStore> MatchScopedCache<S> {
  pub fn new(store: S, config: CacheConfig) -> Self {
    Self {
      store,
      config,
      in_flight: Mutex::default(),
      generation: RwLock::new(0),
      hits: AtomicU64::new(0),
      misses: AtomicU64::new(0),
    }
  }

  pub fn config(&self) -> &CacheConfig { &self.config }

  pub fn is_enabled(&self) -> bool { self.config.enabled }

  pub fn store(&self) -> &S { &self.store }

  pub fn stats(&self) -> CacheStats {
    CacheStats {
      hits:   self.hits.load(Ordering::Relaxed),
      misses: self.misses.load(Ordering::Relaxed),
    }
  }

  /// Return the cached value for `(match_id, key)`, or run `producer`,
  /// store its `Ok` value and return it.
  ///
  /// The producer must be idempotent and free of side effects: with the
  /// cache disabled it runs on every call.
  pub async fn remember<T, E, F, Fut>(
    &self,
    key: &CacheKey,
    match_id: MatchId,
    producer: F,
  ) -> Result<T, E>
  where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if !self.config.enabled {
      return producer().await;
    }

    if let Some(value) = self.lookup(match_id, key).await {
      return Ok(value);
    }

    let scope = (match_id, key.clone());
    let flight = self.join_flight(&scope).await;
    let guard = flight.lock().await;

    // Whoever held the flight before us may have stored the value.
    let result = match self.lookup(match_id, key).await {
      Some(value) => Ok(value),
      None => {
        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%match_id, %key, "cache miss");

        let started = *self.generation.read().await;
        let result = producer().await;
        if let Ok(value) = &result {
          let current = self.generation.read().await;
          if *current == started {
            self.save(match_id, key, value).await;
          } else {
            tracing::debug!(%match_id, %key, "cache invalidated mid-computation; not storing");
          }
        }
        result
      }
    };

    drop(guard);
    self.leave_flight(&scope, flight).await;
    result
  }

  /// Drop every entry for `match_id`. Call after the match's events change.
  pub async fn invalidate_match(&self, match_id: MatchId) -> Result<u64, S::Error> {
    let mut generation = self.generation.write().await;
    *generation += 1;
    let removed = self.store.forget_match(match_id).await?;
    drop(generation);
    tracing::debug!(%match_id, removed, "invalidated match cache");
    Ok(removed)
  }

  /// Drop every entry for every match.
  pub async fn flush(&self) -> Result<u64, S::Error> {
    let mut generation = self.generation.write().await;
    *generation += 1;
    let removed = self.store.flush().await?;
    drop(generation);
    tracing::debug!(removed, "flushed cache");
    Ok(removed)
  }

  // ── Internals ─────────────────────────────────────────────────────────────

  async fn lookup<T: DeserializeOwned>(
    &self,
    match_id: MatchId,
    key: &CacheKey,
  ) -> Option<T> {
    let entry = match self.store.get(match_id, key.as_str()).await {
      Ok(Some(entry)) => entry,
      Ok(None) => return None,
      Err(e) => {
        tracing::warn!(%match_id, %key, error = %e, "cache read failed");
        return None;
      }
    };

    if self.is_expired(&entry) {
      tracing::debug!(%match_id, %key, "cache entry expired");
      return None;
    }

    match entry.decode() {
      Ok(value) => {
        self.hits.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%match_id, %key, "cache hit");
        Some(value)
      }
      Err(e) => {
        tracing::warn!(%match_id, %key, error = %e, "discarding undecodable cache entry");
        None
      }
    }
  }

  fn is_expired(&self, entry: &CacheEntry) -> bool {
    self
      .config
      .ttl()
      .is_some_and(|ttl| Utc::now() - entry.created_at > ttl)
  }

  async fn save<T: Serialize>(&self, match_id: MatchId, key: &CacheKey, value: &T) {
    let entry = match CacheEntry::new(match_id, key.as_str(), value) {
      Ok(entry) => entry,
      Err(e) => {
        tracing::warn!(%match_id, %key, error = %e, "cannot serialise value for cache");
        return;
      }
    };
    if let Err(e) = self.store.put(entry).await {
      tracing::warn!(%match_id, %key, error = %e, "cache write failed");
    }
  }

  async fn join_flight(&self, scope: &Scope) -> Arc<Mutex<()>> {
    let mut flights = self.in_flight.lock().await;
    flights.entry(scope.clone()).or_default().clone()
  }

  async fn leave_flight(&self, scope: &Scope, flight: Arc<Mutex<()>>) {
    let mut flights = self.in_flight.lock().await;
    // One reference lives in the map and one is ours; any more belong to
    // callers still waiting on this scope.
    if Arc::strong_count(&flight) <= 2 {
      flights.remove(scope);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::{
    convert::Infallible,
    io,
    sync::atomic::{AtomicUsize, Ordering::SeqCst},
    time::Duration,
  };

  use chrono::TimeDelta;

  use super::*;
  use crate::MemoryCacheStore;

  const M: MatchId = MatchId(1);

  fn cache(config: CacheConfig) -> MatchScopedCache<MemoryCacheStore> {
    MatchScopedCache::new(MemoryCacheStore::new(), config)
  }

  fn key() -> CacheKey { CacheKey::build("complexion", [("steam_id", "1")]) }

  #[tokio::test]
  async fn producer_runs_once_across_repeated_calls() {
    let cache = cache(CacheConfig::default());
    let calls = &AtomicUsize::new(0);

    for _ in 0..5 {
      let value = cache
        .remember(&key(), M, move || async move {
          calls.fetch_add(1, SeqCst);
          Ok::<_, Infallible>(42u32)
        })
        .await
        .unwrap();
      assert_eq!(value, 42);
    }

    assert_eq!(calls.load(SeqCst), 1);
    assert_eq!(cache.stats(), CacheStats { hits: 4, misses: 1 });
    assert_eq!(cache.stats().hit_rate(), 0.8);
  }

  #[tokio::test]
  async fn invalidation_forces_recomputation() {
    let cache = cache(CacheConfig::default());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      Ok::<_, Infallible>(calls.fetch_add(1, SeqCst) as u32)
    };

    assert_eq!(cache.remember(&key(), M, produce).await.unwrap(), 0);
    assert_eq!(cache.remember(&key(), M, produce).await.unwrap(), 0);
    assert_eq!(cache.invalidate_match(M).await.unwrap(), 1);
    assert_eq!(cache.remember(&key(), M, produce).await.unwrap(), 1);
    assert_eq!(calls.load(SeqCst), 2);
  }

  #[tokio::test]
  async fn invalidation_is_scoped_to_one_match() {
    let cache = cache(CacheConfig::default());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      calls.fetch_add(1, SeqCst);
      Ok::<_, Infallible>("scores".to_owned())
    };

    cache.remember(&key(), MatchId(1), produce).await.unwrap();
    cache.remember(&key(), MatchId(2), produce).await.unwrap();
    cache.invalidate_match(MatchId(1)).await.unwrap();
    cache.remember(&key(), MatchId(2), produce).await.unwrap();

    assert_eq!(calls.load(SeqCst), 2);
  }

  #[tokio::test]
  async fn disabled_cache_always_runs_producer() {
    let cache = cache(CacheConfig::disabled());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      calls.fetch_add(1, SeqCst);
      Ok::<_, Infallible>(7u8)
    };

    cache.remember(&key(), M, produce).await.unwrap();
    cache.remember(&key(), M, produce).await.unwrap();

    assert_eq!(calls.load(SeqCst), 2);
    assert!(cache.store().is_empty().await);
    assert_eq!(cache.stats(), CacheStats::default());
  }

  #[tokio::test]
  async fn enabled_cache_runs_producer_once() {
    let cache = cache(CacheConfig::default());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      calls.fetch_add(1, SeqCst);
      Ok::<_, Infallible>(7u8)
    };

    cache.remember(&key(), M, produce).await.unwrap();
    cache.remember(&key(), M, produce).await.unwrap();

    assert_eq!(calls.load(SeqCst), 1);
  }

  #[derive(Debug, PartialEq)]
  struct Boom(&'static str);

  #[tokio::test]
  async fn producer_errors_propagate_and_are_not_cached() {
    let cache = cache(CacheConfig::default());

    let err = cache
      .remember(&key(), M, || async { Err::<u32, _>(Boom("parser offline")) })
      .await
      .unwrap_err();
    assert_eq!(err, Boom("parser offline"));
    assert!(cache.store().is_empty().await);

    let value = cache
      .remember(&key(), M, || async { Ok::<_, Boom>(5u32) })
      .await
      .unwrap();
    assert_eq!(value, 5);
  }

  #[tokio::test]
  async fn concurrent_misses_share_one_computation() {
    let cache = cache(CacheConfig::default());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      calls.fetch_add(1, SeqCst);
      tokio::time::sleep(Duration::from_millis(20)).await;
      Ok::<_, Infallible>(99u32)
    };

    let k = key();
    let (a, b) = tokio::join!(
      cache.remember(&k, M, produce),
      cache.remember(&k, M, produce),
    );

    assert_eq!((a.unwrap(), b.unwrap()), (99, 99));
    assert_eq!(calls.load(SeqCst), 1);
    assert!(cache.in_flight.lock().await.is_empty());
  }

  #[tokio::test]
  async fn expired_entries_are_recomputed() {
    let cache = cache(CacheConfig::default().with_ttl_seconds(60));
    let mut stale = CacheEntry::new(M, key().as_str(), &1u32).unwrap();
    stale.created_at = Utc::now() - TimeDelta::hours(1);
    cache.store().put(stale).await.unwrap();

    let value = cache
      .remember(&key(), M, || async { Ok::<_, Infallible>(2u32) })
      .await
      .unwrap();
    assert_eq!(value, 2);
  }

  #[tokio::test]
  async fn undecodable_entries_are_replaced() {
    let cache = cache(CacheConfig::default());
    let wrong = CacheEntry::new(M, key().as_str(), &"not a number").unwrap();
    cache.store().put(wrong).await.unwrap();

    let value = cache
      .remember(&key(), M, || async { Ok::<_, Infallible>(3u32) })
      .await
      .unwrap();
    assert_eq!(value, 3);

    let stored = cache.store().get(M, key().as_str()).await.unwrap().unwrap();
    assert_eq!(stored.decode::<u32>().unwrap(), 3);
  }

  #[tokio::test]
  async fn value_computed_across_invalidation_is_not_stored() {
    let cache = cache(CacheConfig::default());
    let cache_ref = &cache;

    let value = cache
      .remember(&key(), M, move || async move {
        cache_ref.invalidate_match(M).await.unwrap();
        Ok::<_, Infallible>(10u32)
      })
      .await
      .unwrap();

    assert_eq!(value, 10);
    assert!(cache.store().is_empty().await);
  }

  #[tokio::test]
  async fn invalidating_another_match_mid_computation_skips_the_write() {
    let cache = cache(CacheConfig::default());
    let cache_ref = &cache;

    cache
      .remember(&key(), M, move || async move {
        cache_ref.invalidate_match(MatchId(2)).await.unwrap();
        Ok::<_, Infallible>(10u32)
      })
      .await
      .unwrap();

    assert!(cache.store().is_empty().await);
  }

  /// A memory store whose writes take a while to land.
  struct SlowPut(MemoryCacheStore);

  impl CacheStore for SlowPut {
    type Error = Infallible;

    async fn get(
      &self,
      match_id: MatchId,
      key: &str,
    ) -> Result<Option<CacheEntry>, Infallible> {
      self.0.get(match_id, key).await
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), Infallible> {
      tokio::time::sleep(Duration::from_millis(50)).await;
      self.0.put(entry).await
    }

    async fn forget_match(&self, match_id: MatchId) -> Result<u64, Infallible> {
      self.0.forget_match(match_id).await
    }

    async fn flush(&self) -> Result<u64, Infallible> { self.0.flush().await }
  }

  #[tokio::test]
  async fn invalidation_waits_for_a_pending_write() {
    let cache =
      MatchScopedCache::new(SlowPut(MemoryCacheStore::new()), CacheConfig::default());
    let k = key();

    let (old, removed) = tokio::join!(
      cache.remember(&k, M, || async { Ok::<_, Infallible>("old demo".to_owned()) }),
      async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate_match(M).await
      },
    );
    assert_eq!(old.unwrap(), "old demo");
    assert_eq!(removed.unwrap(), 1);

    let value = cache
      .remember(&k, M, || async { Ok::<_, Infallible>("new demo".to_owned()) })
      .await
      .unwrap();
    assert_eq!(value, "new demo");
  }

  #[tokio::test]
  async fn flush_waits_for_a_pending_write() {
    let cache =
      MatchScopedCache::new(SlowPut(MemoryCacheStore::new()), CacheConfig::default());
    let k = key();

    let (_, removed) = tokio::join!(
      cache.remember(&k, M, || async { Ok::<_, Infallible>(1u32) }),
      async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.flush().await
      },
    );
    assert_eq!(removed.unwrap(), 1);
    assert!(cache.store().0.is_empty().await);
  }

  /// A backend that fails every operation.
  struct BrokenStore;

  impl CacheStore for BrokenStore {
    type Error = io::Error;

    async fn get(&self, _: MatchId, _: &str) -> io::Result<Option<CacheEntry>> {
      Err(io::Error::other("down"))
    }

    async fn put(&self, _: CacheEntry) -> io::Result<()> {
      Err(io::Error::other("down"))
    }

    async fn forget_match(&self, _: MatchId) -> io::Result<u64> {
      Err(io::Error::other("down"))
    }

    async fn flush(&self) -> io::Result<u64> { Err(io::Error::other("down")) }
  }

  #[tokio::test]
  async fn broken_backend_degrades_to_recomputation() {
    let cache = MatchScopedCache::new(BrokenStore, CacheConfig::default());
    let calls = &AtomicUsize::new(0);
    let produce = move || async move {
      calls.fetch_add(1, SeqCst);
      Ok::<_, Infallible>(1u32)
    };

    assert_eq!(cache.remember(&key(), M, produce).await.unwrap(), 1);
    assert_eq!(cache.remember(&key(), M, produce).await.unwrap(), 1);
    assert_eq!(calls.load(SeqCst), 2);
    assert!(cache.invalidate_match(M).await.is_err());
  }
}
