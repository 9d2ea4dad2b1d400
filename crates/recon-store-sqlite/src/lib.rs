//! SQLite backend for Recon.
//!
//! One [`SqliteStore`] serves both finalized match data
//! ([`recon_core::store::MatchStore`]) and persisted cache entries
//! ([`recon_core::store::CacheStore`]). All access goes through
//! [`tokio_rusqlite`] so queries never block the async runtime.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
