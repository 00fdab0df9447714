//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that lexical order in SQL matches chronological order. Dates use
//! `YYYY-MM-DD`. Id sets are compact JSON arrays. UUIDs are hyphenated
//! lowercase strings.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use gather_core::{
  event::{CommonEvent, Event, Series},
  location::{City, Country, Region},
  membership::{Membership, Role},
  organization::Organization,
  profile::{Profile, UserRef},
  taxonomy::{Category, Topic},
  team::Team,
};
use rusqlite::Row;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_opt_uuid(id: Option<Uuid>) -> Option<String> { id.map(encode_uuid) }

pub fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

pub fn encode_ids(ids: &[Uuid]) -> Result<String> { Ok(serde_json::to_string(ids)?) }

pub fn decode_ids(s: &str) -> Result<Vec<Uuid>> { Ok(serde_json::from_str(s)?) }

pub fn decode_role(value: i64) -> Result<Role> { Ok(Role::from_value(value)?) }

// ─── Location rows ───────────────────────────────────────────────────────────

pub const COUNTRY_COLUMNS: &str = "country_id, name, code";
pub const REGION_COLUMNS: &str = "region_id, name, country_id";
pub const CITY_COLUMNS: &str = "city_id, name, region_id, latitude, longitude";

pub struct RawCountry {
  pub country_id: String,
  pub name:       String,
  pub code:       String,
}

impl RawCountry {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { country_id: row.get(0)?, name: row.get(1)?, code: row.get(2)? })
  }

  pub fn into_country(self) -> Result<Country> {
    Ok(Country {
      country_id: decode_uuid(&self.country_id)?,
      name:       self.name,
      code:       self.code,
    })
  }
}

pub struct RawRegion {
  pub region_id:  String,
  pub name:       String,
  pub country_id: Option<String>,
}

impl RawRegion {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { region_id: row.get(0)?, name: row.get(1)?, country_id: row.get(2)? })
  }

  pub fn into_region(self) -> Result<Region> {
    Ok(Region {
      region_id:  decode_uuid(&self.region_id)?,
      name:       self.name,
      country_id: decode_opt_uuid(self.country_id)?,
    })
  }
}

pub struct RawCity {
  pub city_id:   String,
  pub name:      String,
  pub region_id: Option<String>,
  pub latitude:  f64,
  pub longitude: f64,
}

impl RawCity {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      city_id:   row.get(0)?,
      name:      row.get(1)?,
      region_id: row.get(2)?,
      latitude:  row.get(3)?,
      longitude: row.get(4)?,
    })
  }

  pub fn into_city(self) -> Result<City> {
    Ok(City {
      city_id:   decode_uuid(&self.city_id)?,
      name:      self.name,
      region_id: decode_opt_uuid(self.region_id)?,
      latitude:  self.latitude,
      longitude: self.longitude,
    })
  }
}

// ─── Profile rows ────────────────────────────────────────────────────────────

pub const PROFILE_COLUMNS: &str = "profile_id, username, real_name, tz, avatar, city_id, \
   web_url, twitter, facebook, send_notifications, secret_key, categories, topics";

/// Raw strings read directly from a `profiles` row.
pub struct RawProfile {
  pub profile_id:         String,
  pub username:           String,
  pub real_name:          String,
  pub tz:                 String,
  pub avatar:             Option<String>,
  pub city_id:            Option<String>,
  pub web_url:            Option<String>,
  pub twitter:            Option<String>,
  pub facebook:           Option<String>,
  pub send_notifications: bool,
  pub secret_key:         String,
  pub categories:         String,
  pub topics:             String,
}

impl RawProfile {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      profile_id:         row.get(0)?,
      username:           row.get(1)?,
      real_name:          row.get(2)?,
      tz:                 row.get(3)?,
      avatar:             row.get(4)?,
      city_id:            row.get(5)?,
      web_url:            row.get(6)?,
      twitter:            row.get(7)?,
      facebook:           row.get(8)?,
      send_notifications: row.get(9)?,
      secret_key:         row.get(10)?,
      categories:         row.get(11)?,
      topics:             row.get(12)?,
    })
  }

  /// The superuser flag is never stored; it is left `false` here.
  pub fn into_profile(self) -> Result<Profile> {
    Ok(Profile {
      profile_id:         decode_uuid(&self.profile_id)?,
      user:               Some(UserRef { username: self.username, is_superuser: false }),
      real_name:          self.real_name,
      tz:                 self.tz,
      avatar:             self.avatar,
      city_id:            decode_opt_uuid(self.city_id)?,
      web_url:            self.web_url,
      twitter:            self.twitter,
      facebook:           self.facebook,
      send_notifications: self.send_notifications,
      secret_key:         decode_uuid(&self.secret_key)?,
      categories:         decode_ids(&self.categories)?,
      topics:             decode_ids(&self.topics)?,
    })
  }
}

/// Column values for an insert or update of `profiles`.
pub struct EncodedProfile {
  pub profile_id:         String,
  pub username:           String,
  pub real_name:          String,
  pub tz:                 String,
  pub avatar:             Option<String>,
  pub city_id:            Option<String>,
  pub web_url:            Option<String>,
  pub twitter:            Option<String>,
  pub facebook:           Option<String>,
  pub send_notifications: bool,
  pub secret_key:         String,
  pub categories:         String,
  pub topics:             String,
}

impl EncodedProfile {
  pub fn new(profile: &Profile, username: String) -> Result<Self> {
    Ok(Self {
      profile_id:         encode_uuid(profile.profile_id),
      username,
      real_name:          profile.real_name.clone(),
      tz:                 profile.tz.clone(),
      avatar:             profile.avatar.clone(),
      city_id:            encode_opt_uuid(profile.city_id),
      web_url:            profile.web_url.clone(),
      twitter:            profile.twitter.clone(),
      facebook:           profile.facebook.clone(),
      send_notifications: profile.send_notifications,
      secret_key:         encode_uuid(profile.secret_key),
      categories:         encode_ids(&profile.categories)?,
      topics:             encode_ids(&profile.topics)?,
    })
  }
}

// ─── Organization rows ───────────────────────────────────────────────────────

pub const ORGANIZATION_COLUMNS: &str = "org_id, name, slug, owner_profile_id";

pub struct RawOrganization {
  pub org_id:           String,
  pub name:             String,
  pub slug:             String,
  pub owner_profile_id: Option<String>,
}

impl RawOrganization {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      org_id:           row.get(0)?,
      name:             row.get(1)?,
      slug:             row.get(2)?,
      owner_profile_id: row.get(3)?,
    })
  }

  pub fn into_organization(self) -> Result<Organization> {
    Ok(Organization {
      org_id:           decode_uuid(&self.org_id)?,
      name:             self.name,
      slug:             self.slug,
      owner_profile_id: decode_opt_uuid(self.owner_profile_id)?,
    })
  }
}

// ─── Team rows ───────────────────────────────────────────────────────────────

pub const TEAM_COLUMNS: &str = "team_id, name, organization_id, description, \
   country_id, region_id, city_id, web_url, email, cover_img, created_date, \
   owner_profile_id, admin_profile_ids, contact_profile_ids, category_id, \
   topic_ids, active, tz, is_premium, premium_by, premium_started, premium_expires";

/// Raw strings read directly from a `teams` row.
pub struct RawTeam {
  pub team_id:             String,
  pub name:                String,
  pub organization_id:     Option<String>,
  pub description:         Option<String>,
  pub country_id:          String,
  pub region_id:           Option<String>,
  pub city_id:             Option<String>,
  pub web_url:             Option<String>,
  pub email:               Option<String>,
  pub cover_img:           Option<String>,
  pub created_date:        String,
  pub owner_profile_id:    String,
  pub admin_profile_ids:   String,
  pub contact_profile_ids: String,
  pub category_id:         Option<String>,
  pub topic_ids:           String,
  pub active:              bool,
  pub tz:                  String,
  pub is_premium:          bool,
  pub premium_by:          Option<String>,
  pub premium_started:     Option<String>,
  pub premium_expires:     Option<String>,
}

impl RawTeam {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      team_id:             row.get(0)?,
      name:                row.get(1)?,
      organization_id:     row.get(2)?,
      description:         row.get(3)?,
      country_id:          row.get(4)?,
      region_id:           row.get(5)?,
      city_id:             row.get(6)?,
      web_url:             row.get(7)?,
      email:               row.get(8)?,
      cover_img:           row.get(9)?,
      created_date:        row.get(10)?,
      owner_profile_id:    row.get(11)?,
      admin_profile_ids:   row.get(12)?,
      contact_profile_ids: row.get(13)?,
      category_id:         row.get(14)?,
      topic_ids:           row.get(15)?,
      active:              row.get(16)?,
      tz:                  row.get(17)?,
      is_premium:          row.get(18)?,
      premium_by:          row.get(19)?,
      premium_started:     row.get(20)?,
      premium_expires:     row.get(21)?,
    })
  }

  pub fn into_team(self) -> Result<Team> {
    Ok(Team {
      team_id:             decode_uuid(&self.team_id)?,
      name:                self.name,
      organization_id:     decode_opt_uuid(self.organization_id)?,
      description:         self.description,
      country_id:          decode_uuid(&self.country_id)?,
      region_id:           decode_opt_uuid(self.region_id)?,
      city_id:             decode_opt_uuid(self.city_id)?,
      web_url:             self.web_url,
      email:               self.email,
      cover_img:           self.cover_img,
      created_date:        decode_date(&self.created_date)?,
      owner_profile_id:    decode_uuid(&self.owner_profile_id)?,
      admin_profile_ids:   decode_ids(&self.admin_profile_ids)?,
      contact_profile_ids: decode_ids(&self.contact_profile_ids)?,
      category_id:         decode_opt_uuid(self.category_id)?,
      topic_ids:           decode_ids(&self.topic_ids)?,
      active:              self.active,
      tz:                  self.tz,
      is_premium:          self.is_premium,
      premium_by:          decode_opt_uuid(self.premium_by)?,
      premium_started:     decode_opt_dt(self.premium_started)?,
      premium_expires:     decode_opt_dt(self.premium_expires)?,
    })
  }
}

impl RawTeam {
  /// Column values for an insert or update of `teams`.
  pub fn from_team(team: &Team) -> Result<Self> {
    Ok(Self {
      team_id:             encode_uuid(team.team_id),
      name:                team.name.clone(),
      organization_id:     encode_opt_uuid(team.organization_id),
      description:         team.description.clone(),
      country_id:          encode_uuid(team.country_id),
      region_id:           encode_opt_uuid(team.region_id),
      city_id:             encode_opt_uuid(team.city_id),
      web_url:             team.web_url.clone(),
      email:               team.email.clone(),
      cover_img:           team.cover_img.clone(),
      created_date:        encode_date(team.created_date),
      owner_profile_id:    encode_uuid(team.owner_profile_id),
      admin_profile_ids:   encode_ids(&team.admin_profile_ids)?,
      contact_profile_ids: encode_ids(&team.contact_profile_ids)?,
      category_id:         encode_opt_uuid(team.category_id),
      topic_ids:           encode_ids(&team.topic_ids)?,
      active:              team.active,
      tz:                  team.tz.clone(),
      is_premium:          team.is_premium,
      premium_by:          encode_opt_uuid(team.premium_by),
      premium_started:     team.premium_started.map(encode_dt),
      premium_expires:     team.premium_expires.map(encode_dt),
    })
  }
}

// ─── Membership rows ─────────────────────────────────────────────────────────

pub const MEMBERSHIP_COLUMNS: &str = "membership_id, team_id, profile_id, role, joined_at";

pub struct RawMembership {
  pub membership_id: String,
  pub team_id:       String,
  pub profile_id:    String,
  pub role:          i64,
  pub joined_at:     String,
}

impl RawMembership {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      membership_id: row.get(0)?,
      team_id:       row.get(1)?,
      profile_id:    row.get(2)?,
      role:          row.get(3)?,
      joined_at:     row.get(4)?,
    })
  }

  pub fn into_membership(self) -> Result<Membership> {
    Ok(Membership {
      membership_id: decode_uuid(&self.membership_id)?,
      team_id:       decode_uuid(&self.team_id)?,
      profile_id:    decode_uuid(&self.profile_id)?,
      role:          decode_role(self.role)?,
      joined_at:     decode_dt(&self.joined_at)?,
    })
  }
}

// ─── Taxonomy rows ───────────────────────────────────────────────────────────

pub const CATEGORY_COLUMNS: &str = "category_id, name, description, slug, img_url";
pub const TOPIC_COLUMNS: &str = "topic_id, category_id, name, slug, description";

pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
  pub description: String,
  pub slug:        String,
  pub img_url:     String,
}

impl RawCategory {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      category_id: row.get(0)?,
      name:        row.get(1)?,
      description: row.get(2)?,
      slug:        row.get(3)?,
      img_url:     row.get(4)?,
    })
  }

  pub fn into_category(self) -> Result<Category> {
    Ok(Category {
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      description: self.description,
      slug:        self.slug,
      img_url:     self.img_url,
    })
  }
}

pub struct RawTopic {
  pub topic_id:    String,
  pub category_id: String,
  pub name:        String,
  pub slug:        String,
  pub description: String,
}

impl RawTopic {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      topic_id:    row.get(0)?,
      category_id: row.get(1)?,
      name:        row.get(2)?,
      slug:        row.get(3)?,
      description: row.get(4)?,
    })
  }

  pub fn into_topic(self) -> Result<Topic> {
    Ok(Topic {
      topic_id:    decode_uuid(&self.topic_id)?,
      category_id: decode_uuid(&self.category_id)?,
      name:        self.name,
      slug:        self.slug,
      description: self.description,
    })
  }
}

// ─── Event rows ──────────────────────────────────────────────────────────────

pub const SERIES_COLUMNS: &str = "series_id, team_id, name, created_by";
pub const EVENT_COLUMNS: &str =
  "event_id, team_id, series_id, name, created_by, start_time, end_time";

pub struct RawSeries {
  pub series_id:  String,
  pub team_id:    String,
  pub name:       String,
  pub created_by: Option<String>,
}

impl RawSeries {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      series_id:  row.get(0)?,
      team_id:    row.get(1)?,
      name:       row.get(2)?,
      created_by: row.get(3)?,
    })
  }

  pub fn into_series(self) -> Result<Series> {
    Ok(Series {
      series_id:  decode_uuid(&self.series_id)?,
      team_id:    decode_uuid(&self.team_id)?,
      name:       self.name,
      created_by: decode_opt_uuid(self.created_by)?,
    })
  }
}

pub struct RawEvent {
  pub event_id:   String,
  pub team_id:    String,
  pub series_id:  Option<String>,
  pub name:       String,
  pub created_by: Option<String>,
  pub start_time: String,
  pub end_time:   String,
}

impl RawEvent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      event_id:   row.get(0)?,
      team_id:    row.get(1)?,
      series_id:  row.get(2)?,
      name:       row.get(3)?,
      created_by: row.get(4)?,
      start_time: row.get(5)?,
      end_time:   row.get(6)?,
    })
  }

  pub fn into_event(self) -> Result<Event> {
    Ok(Event {
      event_id:   decode_uuid(&self.event_id)?,
      team_id:    decode_uuid(&self.team_id)?,
      series_id:  decode_opt_uuid(self.series_id)?,
      name:       self.name,
      created_by: decode_opt_uuid(self.created_by)?,
      start_time: decode_dt(&self.start_time)?,
      end_time:   decode_dt(&self.end_time)?,
    })
  }
}

pub const COMMON_EVENT_COLUMNS: &str =
  "common_event_id, organization_id, name, created_by, start_time, end_time";

pub struct RawCommonEvent {
  pub common_event_id: String,
  pub organization_id: String,
  pub name:            String,
  pub created_by:      Option<String>,
  pub start_time:      String,
  pub end_time:        String,
}

impl RawCommonEvent {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      common_event_id: row.get(0)?,
      organization_id: row.get(1)?,
      name:            row.get(2)?,
      created_by:      row.get(3)?,
      start_time:      row.get(4)?,
      end_time:        row.get(5)?,
    })
  }

  pub fn from_common_event(event: &CommonEvent) -> Self {
    Self {
      common_event_id: encode_uuid(event.common_event_id),
      organization_id: encode_uuid(event.organization_id),
      name:            event.name.clone(),
      created_by:      encode_opt_uuid(event.created_by),
      start_time:      encode_dt(event.start_time),
      end_time:        encode_dt(event.end_time),
    }
  }

  pub fn into_common_event(self) -> Result<CommonEvent> {
    Ok(CommonEvent {
      common_event_id: decode_uuid(&self.common_event_id)?,
      organization_id: decode_uuid(&self.organization_id)?,
      name:            self.name,
      created_by:      decode_opt_uuid(self.created_by)?,
      start_time:      decode_dt(&self.start_time)?,
      end_time:        decode_dt(&self.end_time)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn timestamps_sort_lexically() {
    let early = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let late = early + chrono::Duration::milliseconds(500);
    assert!(encode_dt(early) < encode_dt(late));
    assert_eq!(decode_dt(&encode_dt(late)).unwrap(), late);
  }

  #[test]
  fn unknown_role_is_rejected() {
    assert!(matches!(
      decode_role(9),
      Err(Error::Core(gather_core::Error::UnknownRole(9)))
    ));
  }
}
