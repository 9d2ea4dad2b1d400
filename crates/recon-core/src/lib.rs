//! Core types and scoring for the Recon match-statistics engine.
//!
//! This crate has no database or runtime dependencies.
//! It holds the per-match event model, the normalisation and role-scoring
//! functions, and the store traits that backends implement.

pub mod access;
pub mod dashboard;
pub mod error;
pub mod event;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
pub mod normalise;
pub mod role;
pub mod store;
pub mod top_role;
pub mod trend;

pub use error::{Error, Result};
