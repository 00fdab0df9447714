use anyhow::Context as _;
use chrono::Utc;
use gather_core::{profile::Profile, store::CommunityStore};
use serde::Serialize;
use tracing::warn;

use super::{Session, print_json};
use crate::cli::ProfileCommand;

/// A profile with its display fields resolved, falling back to visible
/// defaults where a helper fails.
#[derive(Serialize)]
struct ProfileView<'a> {
  profile:      &'a Profile,
  display_name: String,
  avatar_url:   String,
  timezone:     String,
  local_time:   String,
  is_superuser: bool,
}

impl<'a> ProfileView<'a> {
  fn new(profile: &'a Profile, session: &Session) -> Self {
    let media = session.config.media();
    let display_name = profile
      .display_name()
      .unwrap_or_else(|_| "Unknown Profile".to_owned());
    let avatar_url = profile
      .avatar_url(&media)
      .unwrap_or_else(|_| media.placeholder_avatar());
    let timezone = match profile.timezone() {
      Ok(tz) => tz.to_string(),
      Err(e) => {
        warn!(%e, "showing times in UTC");
        "UTC".to_owned()
      }
    };

    Self {
      profile,
      display_name,
      avatar_url,
      timezone,
      local_time: profile.to_local_time(Utc::now()).to_rfc3339(),
      is_superuser: profile.is_superuser(),
    }
  }
}

pub async fn run(session: &Session, cmd: ProfileCommand) -> anyhow::Result<()> {
  match cmd {
    ProfileCommand::Show => print_json(&ProfileView::new(&session.profile, session)),

    ProfileCommand::Set { real_name, tz, city, web_url, notifications } => {
      session.require_signed_in()?;
      let mut profile = session.profile.clone();

      if let Some(name) = real_name {
        profile.real_name = name;
      }
      if let Some(tz) = tz {
        profile.tz = tz;
        profile.timezone().context("refusing to store an unknown timezone")?;
      }
      if let Some(city_id) = city {
        session
          .store
          .get_city(city_id)
          .await?
          .with_context(|| format!("no city with id {city_id}"))?;
        profile.city_id = Some(city_id);
      }
      if let Some(url) = web_url {
        profile.web_url = Some(url);
      }
      if let Some(on) = notifications {
        profile.send_notifications = on;
      }

      let profile = session.store.update_profile(profile).await?;
      print_json(&ProfileView::new(&profile, session))
    }
  }
}
