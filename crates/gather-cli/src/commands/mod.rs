//! Subcommand handlers. Each prints its result as pretty JSON.

mod event;
mod location;
mod member;
mod org;
mod profile;
mod taxonomy;
mod team;

use anyhow::Context as _;
use gather_core::{profile::Profile, store::CommunityStore};
use gather_store_sqlite::SqliteStore;
use serde::Serialize;

use crate::{cli::Command, config::CliConfig};

/// Everything a command needs: the store, who is acting, and settings.
pub struct Session {
  pub store:   SqliteStore,
  pub profile: Profile,
  pub config:  CliConfig,
}

impl Session {
  fn require_signed_in(&self) -> anyhow::Result<()> {
    anyhow::ensure!(!self.profile.is_anonymous(), "sign in with --user first");
    Ok(())
  }

  fn require_superuser(&self) -> anyhow::Result<()> {
    anyhow::ensure!(
      self.profile.is_superuser(),
      "only superusers can change reference data"
    );
    Ok(())
  }

  async fn profile_by_username(&self, username: &str) -> anyhow::Result<Profile> {
    self
      .store
      .get_profile_by_username(username.to_owned())
      .await
      .context("failed to look up profile")?
      .with_context(|| format!("no profile for user {username:?}"))
  }
}

pub async fn run(session: &Session, command: Command) -> anyhow::Result<()> {
  match command {
    Command::Profile { profile_cmd } => profile::run(session, profile_cmd).await,
    Command::Location { location_cmd } => location::run(session, location_cmd).await,
    Command::Org { org_cmd } => org::run(session, org_cmd).await,
    Command::Team { team_cmd } => team::run(session, team_cmd).await,
    Command::Member { member_cmd } => member::run(session, member_cmd).await,
    Command::Taxonomy { taxonomy_cmd } => taxonomy::run(session, taxonomy_cmd).await,
    Command::Event { event_cmd } => event::run(session, event_cmd).await,
  }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
