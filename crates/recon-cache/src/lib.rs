//! Match-scoped memoization for Recon aggregates.
//!
//! [`CacheKey`] derives deterministic keys from a computation name and its
//! filters; [`MatchScopedCache`] computes once per `(match, key)` on top of
//! any [`recon_core::store::CacheStore`].
//!
//! ```rust,ignore
//! let key = CacheKey::build("top_roles", [("side", "t")]);
//! let top = cache.remember(&key, match_id, || compute(match_id)).await?;
//! ```

mod cache;
mod config;
mod key;
mod memory;

pub use cache::{CacheStats, MatchScopedCache};
pub use config::CacheConfig;
pub use key::{CacheKey, DEFAULT_FILTER_KEY, FilterValue};
pub use memory::MemoryCacheStore;
