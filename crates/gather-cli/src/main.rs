//! `gather` — command-line front end for the Gather community store.
//!
//! Reads `gather.toml` (or the path given with `--config`), opens the SQLite
//! store, resolves the acting profile from `--user` and runs one command.
//! Results are printed to stdout as JSON; logs go to stderr.
//!
//! # Usage
//!
//! ```text
//! gather --user alice team create "Rustaceans" --country <id> --city <id>
//! gather team list --near 39.78,-89.65
//! ```

mod cli;
mod commands;
mod config;
mod geo;

use anyhow::Context as _;
use clap::Parser;
use gather_core::profile::{Caller, Identity};
use gather_service::resolve_profile;
use gather_store_sqlite::SqliteStore;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::{cli::Cli, commands::Session, config::CliConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let config = CliConfig::load(&cli.config)?;

  // Open SQLite store.
  let store_path = config.store_path();
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let caller = match cli.user {
    None => Caller::Anonymous,
    Some(username) => Caller::Authenticated(Identity {
      is_superuser: config.is_superuser(&username),
      given_name: cli.given_name,
      family_name: cli.family_name,
      email: cli.email,
      username,
    }),
  };
  let profile = resolve_profile(&store, &caller)
    .await
    .context("failed to resolve profile")?;
  tracing::debug!(
    profile_id = %profile.profile_id,
    superuser = profile.is_superuser(),
    "acting profile"
  );

  let session = Session { store, profile, config };
  commands::run(&session, cli.command).await
}
