//! `recon` command-line interface.
//!
//! Reads `recon.toml` (or the path given with `--config`), opens the SQLite
//! store and prints the requested report as JSON.
//!
//! ```
//! recon seed --matches 6
//! recon top-roles 1
//! recon complexion 1 --player 76561198000000003
//! recon trends 76561198000000003 --window 3
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use recon_cache::MatchScopedCache;
use recon_core::{
  event::{MatchId, SteamId},
  fixtures::demo_match,
};
use recon_report::{ParticipantAccess, Reports, Settings};
use recon_store_sqlite::SqliteStore;
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Recon match reports")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "recon.toml")]
  config: PathBuf,

  /// Only show matches this player took part in.
  #[arg(long, global = true)]
  viewer: Option<String>,

  /// Recompute everything, reading and writing no cache entries.
  #[arg(long, global = true)]
  no_cache: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Ingest deterministic demo matches with ids 1..=N.
  Seed {
    #[arg(long, default_value_t = 6)]
    matches: i64,
  },
  /// Role scores for a whole match, or one player with `--player`.
  Complexion {
    match_id: i64,
    #[arg(long)]
    player: Option<String>,
  },
  /// The best player per role in a match.
  TopRoles { match_id: i64 },
  /// A player's dashboard compared against the previous window.
  Trends {
    steam_id: String,
    #[arg(long)]
    window: Option<usize>,
    /// Only show these metrics, e.g. `--metric kd_ratio`. Repeatable.
    #[arg(long = "metric")]
    metrics: Vec<String>,
  },
  /// Drop cached reports for one match.
  Invalidate { match_id: i64 },
  /// Drop every cached report.
  FlushCache,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  let mut settings = Settings::load(&cli.config)
    .with_context(|| format!("failed to load settings from {:?}", cli.config))?;
  if cli.no_cache {
    settings.cache.enabled = false;
  }

  let store_path = settings.database_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let store = Arc::new(store);
  let cache = MatchScopedCache::new((*store).clone(), settings.cache.clone());
  let reports = Reports::new(store.clone(), cache, ParticipantAccess::new(store))
    .with_trend_window(settings.trend_window);

  let viewer = cli.viewer.map(SteamId);

  match cli.command {
    Command::Seed { matches } => {
      for id in 1..=matches {
        let (summary, participants, events) = demo_match(MatchId(id), id);
        reports
          .ingest_match(summary, participants, events)
          .await
          .with_context(|| format!("failed to ingest match {id}"))?;
      }
      print_json(&serde_json::json!({ "seeded": matches }))?;
    }
    Command::Complexion { match_id, player } => {
      let match_id = MatchId(match_id);
      if let Some(viewer) = &viewer {
        reports.ensure_access(viewer, match_id).await?;
      }
      match player {
        Some(player) => {
          let scores = reports
            .player_complexion(match_id, &SteamId(player))
            .await?;
          print_json(&scores)?;
        }
        None => print_json(&reports.match_complexion(match_id).await?)?,
      }
    }
    Command::TopRoles { match_id } => {
      let match_id = MatchId(match_id);
      if let Some(viewer) = &viewer {
        reports.ensure_access(viewer, match_id).await?;
      }
      print_json(&reports.top_roles(match_id).await?)?;
    }
    Command::Trends { steam_id, window, metrics } => {
      let metrics: Vec<&str> = metrics.iter().map(String::as_str).collect();
      let dashboard = reports
        .player_trends(&SteamId(steam_id), window, &metrics)
        .await?;
      print_json(&dashboard)?;
    }
    Command::Invalidate { match_id } => {
      let dropped = reports.invalidate_match(MatchId(match_id)).await?;
      print_json(&serde_json::json!({ "dropped": dropped }))?;
    }
    Command::FlushCache => {
      let dropped = reports.flush_cache().await?;
      print_json(&serde_json::json!({ "dropped": dropped }))?;
    }
  }

  let stats = reports.cache_stats();
  tracing::debug!(hits = stats.hits, misses = stats.misses, "cache stats");

  Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
