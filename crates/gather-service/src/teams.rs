//! Team listing, the team page, and team create/edit/delete.

use chrono::{DateTime, Utc};
use gather_core::{
  event::Event,
  membership::{Membership, Role},
  policy,
  profile::Profile,
  store::CommunityStore,
  team::{NewTeam, Team, TeamChanges, TeamRoster},
};
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Result, ServiceError,
  proximity::{TeamDistance, sort_by_proximity},
};

/// How many past events the team page shows.
pub const RECENT_EVENT_LIMIT: usize = 5;

// ─── Listing ─────────────────────────────────────────────────────────────────

/// Teams `profile` belongs to (any role), nearest first.
///
/// An anonymous profile has no teams of its own and gets
/// [`list_all_teams`] instead.
pub async fn list_my_teams<S, D>(
  store: &S,
  profile: &Profile,
  distance: &D,
) -> Result<Vec<Team>>
where
  S: CommunityStore,
  D: TeamDistance + ?Sized,
{
  if profile.is_anonymous() {
    return list_all_teams(store, distance).await;
  }
  let teams = store
    .teams_for_profile(profile.profile_id, Role::Normal)
    .await
    .map_err(ServiceError::store)?;
  debug!(profile_id = %profile.profile_id, count = teams.len(), "listed member teams");
  Ok(sort_by_proximity(teams, distance))
}

/// Every team, nearest first.
pub async fn list_all_teams<S, D>(store: &S, distance: &D) -> Result<Vec<Team>>
where
  S: CommunityStore,
  D: TeamDistance + ?Sized,
{
  let teams = store.list_teams().await.map_err(ServiceError::store)?;
  Ok(sort_by_proximity(teams, distance))
}

// ─── Team page ───────────────────────────────────────────────────────────────

/// Everything needed to render one team for one viewer.
#[derive(Debug, Clone, Serialize)]
pub struct TeamPage {
  pub team:             Team,
  /// Whether the team's premium window covers the time the page was built.
  pub is_premium:       bool,
  /// Events that have not ended yet, soonest first.
  pub upcoming_events:  Vec<Event>,
  /// At most [`RECENT_EVENT_LIMIT`] finished events, latest first.
  pub recent_events:    Vec<Event>,
  pub is_member:        bool,
  /// Highest role first, then earliest join.
  pub member_list:      Vec<Membership>,
  pub can_create_event: bool,
  pub can_edit_team:    bool,
}

pub async fn show_team<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  now: DateTime<Utc>,
) -> Result<TeamPage>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;

  let upcoming_events = store
    .upcoming_events(team_id, now)
    .await
    .map_err(ServiceError::store)?;
  let recent_events = store
    .recent_events(team_id, now, RECENT_EVENT_LIMIT)
    .await
    .map_err(ServiceError::store)?;

  let is_member = !profile.is_anonymous() && roster.is_member(profile.profile_id);
  let can_create_event = policy::can_create_event(profile, &roster);
  let can_edit_team = policy::can_edit_team(profile, &roster);
  let member_list = roster.member_list();

  Ok(TeamPage {
    is_premium: roster.team.premium_active_at(now),
    team: roster.team,
    upcoming_events,
    recent_events,
    is_member,
    member_list,
    can_create_event,
    can_edit_team,
  })
}

// ─── Mutations ───────────────────────────────────────────────────────────────

/// Create a team owned by `profile`, who also becomes its first Admin.
pub async fn create_team<S>(
  store: &S,
  profile: &Profile,
  input: NewTeam,
) -> Result<(Team, Membership)>
where
  S: CommunityStore,
{
  if profile.is_anonymous() {
    warn!("anonymous caller tried to create a team");
    return Err(ServiceError::PermissionDenied(
      "You must be signed in to create a team.".to_owned(),
    ));
  }

  let team = Team::from_new(input, profile.profile_id);
  let (team, admin) = store.create_team(team).await.map_err(ServiceError::store)?;
  info!(team_id = %team.team_id, name = %team.name, owner = %profile.profile_id, "created team");
  Ok((team, admin))
}

/// Apply `changes` to the team. The owner is never reassigned here.
pub async fn edit_team<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  changes: TeamChanges,
) -> Result<Team>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  require_edit(profile, &roster)?;

  let mut team = roster.team;
  changes.apply(&mut team);
  let team = store.save_team(team).await.map_err(ServiceError::store)?;
  info!(%team_id, editor = %profile.profile_id, "edited team");
  Ok(team)
}

/// Delete the team along with its memberships and events.
pub async fn delete_team<S>(store: &S, profile: &Profile, team_id: Uuid) -> Result<()>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  require_edit(profile, &roster)?;

  store.delete_team(team_id).await.map_err(ServiceError::store)?;
  info!(%team_id, by = %profile.profile_id, "deleted team");
  Ok(())
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

pub(crate) async fn load_roster<S>(store: &S, team_id: Uuid) -> Result<TeamRoster>
where
  S: CommunityStore,
{
  store
    .get_roster(team_id)
    .await
    .map_err(ServiceError::store)?
    .ok_or_else(|| ServiceError::NotFound(format!("team {team_id}")))
}

pub(crate) fn require_edit(profile: &Profile, roster: &TeamRoster) -> Result<()> {
  if policy::can_edit_team(profile, roster) {
    return Ok(());
  }
  warn!(
    team_id = %roster.team.team_id,
    profile_id = %profile.profile_id,
    "team change denied"
  );
  Err(ServiceError::edit_denied())
}
