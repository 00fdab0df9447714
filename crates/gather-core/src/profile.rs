//! Profiles — the application-level record attached to an authenticated
//! identity — and the callers they are resolved from.

use chrono::{DateTime, LocalResult, NaiveDateTime, TimeDelta, TimeZone as _, Utc};
use chrono_tz::{OffsetComponents as _, Tz};
use md5::{Digest as _, Md5};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PresentationError;

pub const DEFAULT_TIMEZONE: &str = "UTC";

// ─── Callers ─────────────────────────────────────────────────────────────────

/// Attributes supplied by the identity provider for a signed-in principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
  /// Unique key of the principal; one profile exists per username.
  pub username:     String,
  pub is_superuser: bool,
  pub given_name:   Option<String>,
  pub family_name:  Option<String>,
  pub email:        Option<String>,
}

impl Identity {
  pub fn new(username: impl Into<String>) -> Self {
    Self {
      username:     username.into(),
      is_superuser: false,
      given_name:   None,
      family_name:  None,
      email:        None,
    }
  }
}

/// Whoever is making the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Caller {
  Anonymous,
  Authenticated(Identity),
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// Link from a persisted profile back to its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
  pub username:     String,
  /// Live flag from the identity provider; never persisted.
  #[serde(skip)]
  pub is_superuser: bool,
}

/// Preferences and identity link for one principal.
///
/// The anonymous profile ([`Profile::anonymous`]) has a nil id and no
/// [`UserRef`]; it is never written to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
  pub profile_id:         Uuid,
  pub user:               Option<UserRef>,
  pub real_name:          String,
  /// IANA zone name.
  pub tz:                 String,
  /// Absolute URL or a path relative to the media root.
  pub avatar:             Option<String>,
  pub city_id:            Option<Uuid>,
  pub web_url:            Option<String>,
  pub twitter:            Option<String>,
  pub facebook:           Option<String>,
  pub send_notifications: bool,
  pub secret_key:         Uuid,
  pub categories:         Vec<Uuid>,
  pub topics:             Vec<Uuid>,
}

impl Profile {
  /// The stateless stand-in for an unauthenticated caller.
  pub fn anonymous() -> Self {
    Self {
      profile_id:         Uuid::nil(),
      user:               None,
      real_name:          String::new(),
      tz:                 DEFAULT_TIMEZONE.to_owned(),
      avatar:             None,
      city_id:            None,
      web_url:            None,
      twitter:            None,
      facebook:           None,
      send_notifications: true,
      secret_key:         Uuid::nil(),
      categories:         Vec::new(),
      topics:             Vec::new(),
    }
  }

  /// A not-yet-persisted profile for `username`, seeded from `defaults`.
  pub fn new(username: impl Into<String>, defaults: ProfileDefaults) -> Self {
    Self {
      profile_id: Uuid::new_v4(),
      user: Some(UserRef { username: username.into(), is_superuser: false }),
      real_name: defaults.real_name,
      tz: defaults.tz,
      avatar: defaults.avatar,
      secret_key: Uuid::new_v4(),
      ..Self::anonymous()
    }
  }

  pub fn is_anonymous(&self) -> bool { self.user.is_none() }

  /// Never fails: an anonymous profile or one without a live identity flag
  /// is simply not a superuser.
  pub fn is_superuser(&self) -> bool {
    self.user.as_ref().is_some_and(|u| u.is_superuser)
  }

  pub fn username(&self) -> Option<&str> {
    self.user.as_ref().map(|u| u.username.as_str())
  }

  // ── Presentation ──────────────────────────────────────────────────────────

  /// Real name when set, otherwise the username.
  pub fn display_name(&self) -> Result<String, PresentationError> {
    if !self.real_name.is_empty() {
      return Ok(self.real_name.clone());
    }
    self
      .username()
      .map(str::to_owned)
      .ok_or(PresentationError::NoIdentity)
  }

  pub fn avatar_url(
    &self,
    media: &MediaSettings,
  ) -> Result<String, PresentationError> {
    match self.avatar.as_deref() {
      None | Some("") => Err(PresentationError::NoAvatar),
      Some(url) if url.starts_with("http") => Ok(url.to_owned()),
      Some(path) => Ok(media.media_file(path)),
    }
  }

  pub fn timezone(&self) -> Result<Tz, PresentationError> {
    self
      .tz
      .parse::<Tz>()
      .map_err(|_| PresentationError::UnknownTimezone(self.tz.clone()))
  }

  /// Convert a UTC instant to the profile's wall clock (UTC if the stored
  /// zone is unknown).
  pub fn to_local_time(&self, at: DateTime<Utc>) -> DateTime<Tz> {
    at.with_timezone(&self.timezone().unwrap_or(Tz::UTC))
  }

  /// Interpret a wall-clock time in the profile's zone, preferring standard
  /// time: an ambiguous time resolves to its standard-offset instant and a
  /// time skipped by a DST jump is read at the standard offset.
  pub fn utc_from_local(&self, local: NaiveDateTime) -> DateTime<Utc> {
    let tz = self.timezone().unwrap_or(Tz::UTC);
    match tz.from_local_datetime(&local) {
      LocalResult::Single(dt) => dt.with_timezone(&Utc),
      LocalResult::Ambiguous(earlier, later) => {
        let standard = if earlier.offset().dst_offset() == TimeDelta::zero() {
          earlier
        } else {
          later
        };
        standard.with_timezone(&Utc)
      }
      LocalResult::None => {
        let base = tz.offset_from_utc_datetime(&local).base_utc_offset();
        Utc.from_utc_datetime(&(local - base))
      }
    }
  }
}

// ─── Creation defaults ───────────────────────────────────────────────────────

/// Values copied from the identity into a profile when it is first created.
/// Never re-applied to an existing profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDefaults {
  pub real_name: String,
  pub tz:        String,
  pub avatar:    Option<String>,
}

impl ProfileDefaults {
  pub fn for_identity(identity: &Identity) -> Self {
    let real_name = match (
      non_empty(&identity.given_name),
      non_empty(&identity.family_name),
    ) {
      (Some(given), Some(family)) => format!("{given} {family}"),
      (Some(given), None) => given.to_owned(),
      _ => String::new(),
    };

    Self {
      real_name,
      tz: lookup_timezone(&identity.username),
      avatar: non_empty(&identity.email).map(gravatar_url),
    }
  }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
  value.as_deref().filter(|s| !s.is_empty())
}

/// Timezone guess for a new user.
// TODO: derive from the caller's geo-IP city once the location service exposes zones.
pub fn lookup_timezone(_username: &str) -> String { DEFAULT_TIMEZONE.to_owned() }

/// Gravatar image URL for `email` with the "mystery man" fallback.
pub fn gravatar_url(email: &str) -> String {
  let digest = Md5::digest(email.as_bytes());
  format!("http://www.gravatar.com/avatar/{}.jpg?d=mm", hex::encode(digest))
}

// ─── Media ───────────────────────────────────────────────────────────────────

/// Where static assets and uploaded media are served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSettings {
  pub static_url: String,
  pub media_url:  String,
}

impl Default for MediaSettings {
  fn default() -> Self {
    Self { static_url: "/static/".to_owned(), media_url: "/media/".to_owned() }
  }
}

impl MediaSettings {
  pub fn placeholder_avatar(&self) -> String {
    format!("{}img/avatar_placeholder.png", self.static_url)
  }

  pub fn media_file(&self, path: &str) -> String {
    format!(
      "{}/{}",
      self.media_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::{NaiveDate, TimeZone as _, Timelike as _};

  use super::*;

  fn alice() -> Identity {
    Identity {
      username:     "alice".into(),
      is_superuser: false,
      given_name:   Some("Alice".into()),
      family_name:  Some("Liddell".into()),
      email:        Some("test@example.com".into()),
    }
  }

  #[test]
  fn anonymous_profile_has_defaults() {
    let anon = Profile::anonymous();
    assert!(anon.is_anonymous());
    assert!(!anon.is_superuser());
    assert_eq!(anon.tz, "UTC");
    assert!(anon.send_notifications);
    assert_eq!(anon.display_name(), Err(PresentationError::NoIdentity));
  }

  #[test]
  fn defaults_combine_given_and_family_name() {
    let defaults = ProfileDefaults::for_identity(&alice());
    assert_eq!(defaults.real_name, "Alice Liddell");
    assert_eq!(defaults.tz, "UTC");
    assert_eq!(
      defaults.avatar.as_deref(),
      Some(
        "http://www.gravatar.com/avatar/55502f40dc8b7c769880b10874abc9d0.jpg?d=mm"
      )
    );
  }

  #[test]
  fn defaults_without_family_name_or_email() {
    let mut id = alice();
    id.family_name = None;
    id.email = Some(String::new());
    let defaults = ProfileDefaults::for_identity(&id);
    assert_eq!(defaults.real_name, "Alice");
    assert_eq!(defaults.avatar, None);

    id.given_name = None;
    id.family_name = Some("Liddell".into());
    assert_eq!(ProfileDefaults::for_identity(&id).real_name, "");
  }

  #[test]
  fn display_name_falls_back_to_username() {
    let mut id = alice();
    id.given_name = None;
    let profile = Profile::new("alice", ProfileDefaults::for_identity(&id));
    assert_eq!(profile.display_name().unwrap(), "alice");
  }

  #[test]
  fn avatar_url_variants() {
    let media = MediaSettings::default();
    let mut profile = Profile::new("alice", ProfileDefaults::for_identity(&alice()));
    assert!(profile.avatar_url(&media).unwrap().starts_with("http://www.gravatar.com/"));

    profile.avatar = Some("avatars/alice.png".into());
    assert_eq!(profile.avatar_url(&media).unwrap(), "/media/avatars/alice.png");

    profile.avatar = None;
    let url = profile
      .avatar_url(&media)
      .unwrap_or_else(|_| media.placeholder_avatar());
    assert_eq!(url, "/static/img/avatar_placeholder.png");
  }

  #[test]
  fn bad_timezone_is_reported_and_local_time_uses_utc() {
    let mut profile = Profile::anonymous();
    profile.tz = "Mars/Olympus_Mons".into();
    assert!(matches!(
      profile.timezone(),
      Err(PresentationError::UnknownTimezone(_))
    ));

    let at = Utc::now();
    assert_eq!(profile.to_local_time(at).naive_utc(), at.naive_utc());
  }

  #[test]
  fn local_time_round_trip_in_named_zone() {
    let mut profile = Profile::anonymous();
    profile.tz = "America/Chicago".into();

    let local = NaiveDate::from_ymd_opt(2024, 1, 15)
      .unwrap()
      .and_hms_opt(9, 0, 0)
      .unwrap();
    let utc = profile.utc_from_local(local);
    assert_eq!(utc.hour(), 15);
    assert_eq!(profile.to_local_time(utc).naive_local(), local);
  }

  #[test]
  fn dst_transitions_resolve_to_standard_time() {
    let mut profile = Profile::anonymous();
    profile.tz = "America/New_York".into();

    // 02:30 does not exist on the spring-forward day; read it as EST.
    let skipped = NaiveDate::from_ymd_opt(2024, 3, 10)
      .unwrap()
      .and_hms_opt(2, 30, 0)
      .unwrap();
    assert_eq!(
      profile.utc_from_local(skipped),
      Utc.with_ymd_and_hms(2024, 3, 10, 7, 30, 0).unwrap()
    );

    // 01:30 happens twice on the fall-back day; EST is the later one.
    let repeated = NaiveDate::from_ymd_opt(2024, 11, 3)
      .unwrap()
      .and_hms_opt(1, 30, 0)
      .unwrap();
    assert_eq!(
      profile.utc_from_local(repeated),
      Utc.with_ymd_and_hms(2024, 11, 3, 6, 30, 0).unwrap()
    );
  }

  #[test]
  fn ambiguous_time_in_southern_zone_picks_standard_offset() {
    let mut profile = Profile::anonymous();
    profile.tz = "Australia/Sydney".into();

    // Clocks go back from AEDT (+11) to AEST (+10) at 03:00 on 2024-04-07.
    let repeated = NaiveDate::from_ymd_opt(2024, 4, 7)
      .unwrap()
      .and_hms_opt(2, 30, 0)
      .unwrap();
    assert_eq!(
      profile.utc_from_local(repeated),
      Utc.with_ymd_and_hms(2024, 4, 6, 16, 30, 0).unwrap()
    );
  }
}
