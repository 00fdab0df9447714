//! Adding, promoting and removing team members.
//!
//! Any signed-in profile may join a team as a Normal member. Everything else
//! needs [`policy::can_edit_team`](gather_core::policy::can_edit_team).

use gather_core::{
  membership::{Membership, Role},
  profile::Profile,
  store::CommunityStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Result, ServiceError,
  teams::{load_roster, require_edit},
};

/// Add `member_id` to the team with `role`.
///
/// A profile adding itself with [`Role::Normal`] is a self-join and needs no
/// further permission. A second membership for the same profile is an
/// integrity violation reported by the store.
pub async fn add_member<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  member_id: Uuid,
  role: Role,
) -> Result<Membership>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;

  let self_join =
    !profile.is_anonymous() && member_id == profile.profile_id && role == Role::Normal;
  if !self_join {
    require_edit(profile, &roster)?;
  }

  store
    .get_profile(member_id)
    .await
    .map_err(ServiceError::store)?
    .ok_or_else(|| ServiceError::NotFound(format!("profile {member_id}")))?;

  let membership = store
    .add_membership(team_id, member_id, role)
    .await
    .map_err(ServiceError::store)?;
  info!(%team_id, %member_id, %role, self_join, "added member");
  Ok(membership)
}

/// Change an existing member's role. Re-applying the current role writes
/// nothing.
pub async fn set_role<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  member_id: Uuid,
  role: Role,
) -> Result<Membership>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  require_edit(profile, &roster)?;

  let current = roster.membership_of(member_id).ok_or_else(|| {
    ServiceError::NotFound(format!("membership of {member_id} in team {team_id}"))
  })?;
  if current.role == role {
    return Ok(current.clone());
  }

  let membership = store
    .set_role(team_id, member_id, role)
    .await
    .map_err(ServiceError::store)?;
  info!(%team_id, %member_id, %role, "changed member role");
  Ok(membership)
}

/// Remove a member from the team.
pub async fn remove_member<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  member_id: Uuid,
) -> Result<()>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  require_edit(profile, &roster)?;

  if member_id == roster.team.owner_profile_id {
    warn!(%team_id, "refused to remove the team owner");
    return Err(ServiceError::PermissionDenied(
      "The team owner can not be removed.".to_owned(),
    ));
  }

  let removed = store
    .remove_membership(team_id, member_id)
    .await
    .map_err(ServiceError::store)?;
  if !removed {
    return Err(ServiceError::NotFound(format!(
      "membership of {member_id} in team {team_id}"
    )));
  }
  info!(%team_id, %member_id, "removed member");
  Ok(())
}
