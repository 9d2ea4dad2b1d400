//! Runtime settings, read from an optional TOML file and `RECON_*`
//! environment variables.
//!
//! ```toml
//! database_path = "~/.local/share/recon/recon.db"
//! trend_window  = 5
//!
//! [cache]
//! enabled     = true
//! ttl_seconds = 3600
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `RECON_CACHE__ENABLED=false`.

use std::path::{Path, PathBuf};

use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use recon_cache::CacheConfig;
use serde::Deserialize;

use crate::Result;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
  pub database_path: PathBuf,
  /// Matches per comparison window on the trends dashboard.
  pub trend_window:  usize,
  pub cache:         CacheConfig,
}

impl Default for Settings {
  fn default() -> Self {
    Self {
      database_path: PathBuf::from("recon.db"),
      trend_window:  5,
      cache:         CacheConfig::default(),
    }
  }
}

impl Settings {
  /// Read `path` if it exists, then apply `RECON_*` overrides.
  pub fn load(path: &Path) -> Result<Self> {
    let builder = Config::builder()
      .add_source(File::from(path).required(false))
      .add_source(
        Environment::with_prefix("RECON")
          .prefix_separator("_")
          .separator("__")
          .try_parsing(true),
      );
    Self::build(builder)
  }

  /// Parse settings from TOML text alone, without the environment.
  pub fn from_toml(toml: &str) -> Result<Self> {
    Self::build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
  }

  fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
    Ok(builder.build()?.try_deserialize()?)
  }

  /// `database_path` with a leading `~` expanded.
  pub fn database_path(&self) -> PathBuf { expand_tilde(&self.database_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
