//! The `CommunityStore` trait.
//!
//! Implemented by storage backends (e.g. `gather-store-sqlite`). The service
//! layer depends on this abstraction, not on a concrete backend.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  event::{CommonEvent, Event, Series},
  location::{City, Country, LocationHierarchy, Region},
  membership::{Membership, Role},
  organization::Organization,
  profile::{Profile, ProfileDefaults},
  taxonomy::{Category, Topic},
  team::{Team, TeamRoster},
};

/// Abstraction over the relational store backing the community model.
///
/// Every method is one unit of work. Writes that touch several tables
/// (team creation, team deletion) are atomic.
///
/// Lookups return `Ok(None)` for a missing row; mutations of a missing row
/// return the backend's not-found error.
pub trait CommunityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Profiles ──────────────────────────────────────────────────────────

  /// Fetch the profile for `username`, inserting one seeded from `defaults`
  /// if none exists. Returns `true` alongside the profile when this call
  /// created it. A concurrent insert for the same username is not an error:
  /// the row written first wins and is returned.
  fn get_or_create_profile(
    &self,
    username: String,
    defaults: ProfileDefaults,
  ) -> impl Future<Output = Result<(Profile, bool), Self::Error>> + Send + '_;

  fn get_profile(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  fn get_profile_by_username(
    &self,
    username: String,
  ) -> impl Future<Output = Result<Option<Profile>, Self::Error>> + Send + '_;

  /// Persist edits to an existing profile's preferences.
  fn update_profile(
    &self,
    profile: Profile,
  ) -> impl Future<Output = Result<Profile, Self::Error>> + Send + '_;

  // ── Locations ─────────────────────────────────────────────────────────

  fn add_country(
    &self,
    country: Country,
  ) -> impl Future<Output = Result<Country, Self::Error>> + Send + '_;

  fn add_region(
    &self,
    region: Region,
  ) -> impl Future<Output = Result<Region, Self::Error>> + Send + '_;

  fn add_city(
    &self,
    city: City,
  ) -> impl Future<Output = Result<City, Self::Error>> + Send + '_;

  fn get_city(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<City>, Self::Error>> + Send + '_;

  /// Load every country, region and city into memory.
  fn load_locations(
    &self,
  ) -> impl Future<Output = Result<LocationHierarchy, Self::Error>> + Send + '_;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Insert a new organization. A taken slug is rejected.
  fn create_organization(
    &self,
    org: Organization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  fn get_organization_by_slug(
    &self,
    slug: String,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  /// Delete an organization. Its teams survive with no organization.
  fn delete_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Teams ─────────────────────────────────────────────────────────────

  /// Insert `team` and an Admin membership for its owner in one
  /// transaction. The location chain is derived before the write.
  fn create_team(
    &self,
    team: Team,
  ) -> impl Future<Output = Result<(Team, Membership), Self::Error>> + Send + '_;

  /// Update an existing team. The location chain is derived before the
  /// write, on every save.
  fn save_team(
    &self,
    team: Team,
  ) -> impl Future<Output = Result<Team, Self::Error>> + Send + '_;

  fn get_team(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Team>, Self::Error>> + Send + '_;

  fn list_teams(
    &self,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  /// Teams of an organization ordered by name.
  fn list_organization_teams(
    &self,
    org_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  /// Delete a team together with its memberships and events.
  fn delete_team(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Memberships ───────────────────────────────────────────────────────

  /// Add `profile_id` to the team. A second membership for the same pair is
  /// an integrity violation.
  fn add_membership(
    &self,
    team_id: Uuid,
    profile_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Membership, Self::Error>> + Send + '_;

  fn set_role(
    &self,
    team_id: Uuid,
    profile_id: Uuid,
    role: Role,
  ) -> impl Future<Output = Result<Membership, Self::Error>> + Send + '_;

  /// Returns `false` when there was no such membership.
  fn remove_membership(
    &self,
    team_id: Uuid,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// The team with all of its memberships, or `None` if the team is missing.
  fn get_roster(
    &self,
    team_id: Uuid,
  ) -> impl Future<Output = Result<Option<TeamRoster>, Self::Error>> + Send + '_;

  /// Distinct teams the profile holds a membership of at least `min_role`
  /// in.
  fn teams_for_profile(
    &self,
    profile_id: Uuid,
    min_role: Role,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_;

  /// Teams where the profile is an Admin.
  fn administering(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_ {
    self.teams_for_profile(profile_id, Role::Admin)
  }

  /// Teams where the profile is a Moderator or Admin.
  fn moderating(
    &self,
    profile_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Team>, Self::Error>> + Send + '_ {
    self.teams_for_profile(profile_id, Role::Moderator)
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────

  /// Insert or update a category; the slug is recomputed from the name.
  fn save_category(
    &self,
    category: Category,
  ) -> impl Future<Output = Result<Category, Self::Error>> + Send + '_;

  /// Insert or update a topic; the slug is recomputed from the name.
  fn save_topic(
    &self,
    topic: Topic,
  ) -> impl Future<Output = Result<Topic, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<Category>, Self::Error>> + Send + '_;

  fn list_topics(
    &self,
    category_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Topic>, Self::Error>> + Send + '_;

  // ── Events ────────────────────────────────────────────────────────────

  fn add_series(
    &self,
    series: Series,
  ) -> impl Future<Output = Result<Series, Self::Error>> + Send + '_;

  fn get_series(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Series>, Self::Error>> + Send + '_;

  fn add_event(
    &self,
    event: Event,
  ) -> impl Future<Output = Result<Event, Self::Error>> + Send + '_;

  fn get_event(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Event>, Self::Error>> + Send + '_;

  /// Events ending after `now`, soonest start first.
  fn upcoming_events(
    &self,
    team_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  /// Events that ended at or before `now`, latest start first.
  fn recent_events(
    &self,
    team_id: Uuid,
    now: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<Event>, Self::Error>> + Send + '_;

  // ── Common events ─────────────────────────────────────────────────────

  fn add_common_event(
    &self,
    event: CommonEvent,
  ) -> impl Future<Output = Result<CommonEvent, Self::Error>> + Send + '_;

  /// Organization events ending after `now`, soonest start first.
  fn upcoming_common_events(
    &self,
    organization_id: Uuid,
    now: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<CommonEvent>, Self::Error>> + Send + '_;

  /// Organization events that ended at or before `now`, latest start first.
  fn recent_common_events(
    &self,
    organization_id: Uuid,
    now: DateTime<Utc>,
    limit: usize,
  ) -> impl Future<Output = Result<Vec<CommonEvent>, Self::Error>> + Send + '_;
}
