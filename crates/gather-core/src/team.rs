//! Teams and the roster view used by the authorization policy.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::membership::{Membership, Role, display_order};

// ─── Team ────────────────────────────────────────────────────────────────────

/// An organizational unit with an owner, members and a location.
///
/// `region_id` and `country_id` are derived from `city_id` whenever a city is
/// set; see [`crate::location::derive_location`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
  pub team_id:             Uuid,
  pub name:                String,
  pub organization_id:     Option<Uuid>,
  pub description:         Option<String>,

  pub country_id:          Uuid,
  pub region_id:           Option<Uuid>,
  pub city_id:             Option<Uuid>,

  pub web_url:             Option<String>,
  pub email:               Option<String>,
  pub cover_img:           Option<String>,
  pub created_date:        NaiveDate,

  pub owner_profile_id:    Uuid,
  pub admin_profile_ids:   Vec<Uuid>,
  pub contact_profile_ids: Vec<Uuid>,

  pub category_id:         Option<Uuid>,
  pub topic_ids:           Vec<Uuid>,
  pub active:              bool,
  /// The most commonly used timezone for this team.
  pub tz:                  String,

  pub is_premium:          bool,
  pub premium_by:          Option<Uuid>,
  pub premium_started:     Option<DateTime<Utc>>,
  pub premium_expires:     Option<DateTime<Utc>>,
}

impl Team {
  /// Build a fresh team owned by `owner_profile_id`. The location chain is not
  /// derived here; the store does that on persist.
  pub fn from_new(input: NewTeam, owner_profile_id: Uuid) -> Self {
    Self {
      team_id: Uuid::new_v4(),
      name: input.name,
      organization_id: input.organization_id,
      description: input.description,
      country_id: input.country_id,
      region_id: input.region_id,
      city_id: input.city_id,
      web_url: input.web_url,
      email: input.email,
      cover_img: input.cover_img,
      created_date: Utc::now().date_naive(),
      owner_profile_id,
      admin_profile_ids: Vec::new(),
      contact_profile_ids: Vec::new(),
      category_id: input.category_id,
      topic_ids: input.topic_ids,
      active: true,
      tz: input.tz,
      is_premium: false,
      premium_by: None,
      premium_started: None,
      premium_expires: None,
    }
  }

  /// Whether the premium subscription covers `now`. An open-ended window
  /// (no expiry) stays active.
  pub fn premium_active_at(&self, now: DateTime<Utc>) -> bool {
    if !self.is_premium {
      return false;
    }
    let started = self.premium_started.is_none_or(|s| s <= now);
    let unexpired = self.premium_expires.is_none_or(|e| now < e);
    started && unexpired
  }
}

// ─── NewTeam ─────────────────────────────────────────────────────────────────

/// Input to team creation. The creator becomes the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTeam {
  pub name:            String,
  pub organization_id: Option<Uuid>,
  pub description:     Option<String>,
  pub country_id:      Uuid,
  pub region_id:       Option<Uuid>,
  pub city_id:         Option<Uuid>,
  pub web_url:         Option<String>,
  pub email:           Option<String>,
  pub cover_img:       Option<String>,
  pub tz:              String,
  pub category_id:     Option<Uuid>,
  pub topic_ids:       Vec<Uuid>,
}

impl NewTeam {
  /// Convenience constructor with all optional fields left empty.
  pub fn new(name: impl Into<String>, country_id: Uuid) -> Self {
    Self {
      name: name.into(),
      organization_id: None,
      description: None,
      country_id,
      region_id: None,
      city_id: None,
      web_url: None,
      email: None,
      cover_img: None,
      tz: "UTC".to_owned(),
      category_id: None,
      topic_ids: Vec::new(),
    }
  }
}

// ─── TeamChanges ─────────────────────────────────────────────────────────────

/// A partial edit of a team. `None` leaves a field as it is; for nullable
/// fields `Some(None)` clears it.
///
/// Clearing `city_id` keeps the region and country the city last derived, so
/// a team can step back to a region-only location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamChanges {
  pub name:            Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub organization_id: Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "present")]
  pub description:     Option<Option<String>>,
  pub country_id:      Option<Uuid>,
  #[serde(default, deserialize_with = "present")]
  pub region_id:       Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "present")]
  pub city_id:         Option<Option<Uuid>>,
  #[serde(default, deserialize_with = "present")]
  pub web_url:         Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub email:           Option<Option<String>>,
  #[serde(default, deserialize_with = "present")]
  pub cover_img:       Option<Option<String>>,
  pub tz:              Option<String>,
  #[serde(default, deserialize_with = "present")]
  pub category_id:     Option<Option<Uuid>>,
  pub active:          Option<bool>,
}

/// A field that is present in the input, even as `null`, is a change.
fn present<'de, D, T>(de: D) -> Result<Option<Option<T>>, D::Error>
where
  D: Deserializer<'de>,
  T: Deserialize<'de>,
{
  Option::<T>::deserialize(de).map(Some)
}

impl TeamChanges {
  pub fn apply(self, team: &mut Team) {
    if let Some(name) = self.name {
      team.name = name;
    }
    if let Some(org) = self.organization_id {
      team.organization_id = org;
    }
    if let Some(description) = self.description {
      team.description = description;
    }
    if let Some(country) = self.country_id {
      team.country_id = country;
    }
    if let Some(region) = self.region_id {
      team.region_id = region;
    }
    if let Some(city) = self.city_id {
      team.city_id = city;
    }
    if let Some(url) = self.web_url {
      team.web_url = url;
    }
    if let Some(email) = self.email {
      team.email = email;
    }
    if let Some(img) = self.cover_img {
      team.cover_img = img;
    }
    if let Some(tz) = self.tz {
      team.tz = tz;
    }
    if let Some(category) = self.category_id {
      team.category_id = category;
    }
    if let Some(active) = self.active {
      team.active = active;
    }
  }
}

// ─── Roster ──────────────────────────────────────────────────────────────────

/// A team together with all of its memberships: everything the policy needs
/// to answer a team-scoped question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRoster {
  pub team:        Team,
  pub memberships: Vec<Membership>,
}

impl TeamRoster {
  pub fn new(team: Team, memberships: Vec<Membership>) -> Self {
    Self { team, memberships }
  }

  /// Profiles holding a Moderator or Admin membership.
  pub fn moderators(&self) -> Vec<Uuid> {
    self.profiles_where(Role::is_moderator)
  }

  /// Profiles holding an Admin membership.
  pub fn administrators(&self) -> Vec<Uuid> {
    self.profiles_where(|r| r == Role::Admin)
  }

  pub fn is_moderator(&self, profile_id: Uuid) -> bool {
    self.moderators().contains(&profile_id)
  }

  pub fn is_member(&self, profile_id: Uuid) -> bool {
    self.memberships.iter().any(|m| m.profile_id == profile_id)
  }

  pub fn membership_of(&self, profile_id: Uuid) -> Option<&Membership> {
    self.memberships.iter().find(|m| m.profile_id == profile_id)
  }

  /// Memberships in default display order: highest role first, then earliest
  /// join.
  pub fn member_list(&self) -> Vec<Membership> {
    let mut list = self.memberships.clone();
    list.sort_by(display_order);
    list
  }

  fn profiles_where(&self, pred: impl Fn(Role) -> bool) -> Vec<Uuid> {
    self
      .memberships
      .iter()
      .filter(|m| m.team_id == self.team.team_id && pred(m.role))
      .map(|m| m.profile_id)
      .collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _};

  use super::*;

  fn team() -> Team {
    let mut input = NewTeam::new("Rustaceans", Uuid::new_v4());
    input.region_id = Some(Uuid::new_v4());
    input.city_id = Some(Uuid::new_v4());
    input.organization_id = Some(Uuid::new_v4());
    input.description = Some("Weekly hack night".into());
    Team::from_new(input, Uuid::new_v4())
  }

  #[test]
  fn premium_window_bounds() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut t = team();
    assert!(!t.premium_active_at(now));

    t.is_premium = true;
    assert!(t.premium_active_at(now), "open-ended window");

    t.premium_started = Some(now + Duration::days(1));
    assert!(!t.premium_active_at(now), "not started yet");

    t.premium_started = Some(now - Duration::days(30));
    t.premium_expires = Some(now);
    assert!(!t.premium_active_at(now), "expiry is exclusive");
    assert!(t.premium_active_at(now - Duration::seconds(1)));
  }

  #[test]
  fn changes_leave_unset_fields_alone() {
    let mut t = team();
    let before = t.clone();
    TeamChanges { name: Some("Crustaceans".into()), ..TeamChanges::default() }.apply(&mut t);

    assert_eq!(t.name, "Crustaceans");
    assert_eq!(t.city_id, before.city_id);
    assert_eq!(t.organization_id, before.organization_id);
    assert_eq!(t.owner_profile_id, before.owner_profile_id);
  }

  #[test]
  fn changes_can_clear_nullable_fields() {
    let mut t = team();
    let region = t.region_id;
    TeamChanges {
      city_id: Some(None),
      organization_id: Some(None),
      description: Some(None),
      ..TeamChanges::default()
    }
    .apply(&mut t);

    assert_eq!(t.city_id, None);
    assert_eq!(t.organization_id, None);
    assert_eq!(t.description, None);
    assert_eq!(t.region_id, region);
  }

  #[test]
  fn null_in_input_clears_and_absence_keeps() {
    let changes: TeamChanges =
      serde_json::from_str(r#"{ "city_id": null, "name": "Crustaceans" }"#).unwrap();
    assert_eq!(changes.city_id, Some(None));
    assert_eq!(changes.organization_id, None);
  }
}
