//! Reporting service for Recon.
//!
//! [`Reports`] composes a [`recon_core::store::MatchStore`], a
//! [`recon_cache::MatchScopedCache`] and a
//! [`recon_core::access::MatchAccess`] collaborator into the queries the
//! match pages need: role complexions, top-in-role selections and trend
//! dashboards. The `recon` binary drives it from the command line.

pub mod access;
pub mod error;
pub mod settings;

mod reports;

pub use access::ParticipantAccess;
pub use error::{Error, Result};
pub use reports::{PlayerComplexion, Reports};
pub use settings::Settings;
