//! Scheduling events and series for a team.

use gather_core::{
  event::{Event, NewEvent, Series},
  policy,
  profile::Profile,
  store::CommunityStore,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Result, ServiceError, teams::load_roster};

/// Schedule an event for the team. The caller is recorded as its creator.
pub async fn create_event<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  input: NewEvent,
) -> Result<Event>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  if !policy::can_create_event(profile, &roster) {
    warn!(%team_id, profile_id = %profile.profile_id, "event creation denied");
    return Err(ServiceError::PermissionDenied(
      "You can not create events for this team.".to_owned(),
    ));
  }

  if let Some(series_id) = input.series_id {
    let series = store
      .get_series(series_id)
      .await
      .map_err(ServiceError::store)?
      .filter(|s| s.team_id == team_id)
      .ok_or_else(|| ServiceError::NotFound(format!("series {series_id} in team {team_id}")))?;
    if !policy::can_edit_series(profile, &series, &roster) {
      warn!(%series_id, profile_id = %profile.profile_id, "series change denied");
      return Err(ServiceError::PermissionDenied(
        "You can not add events to this series.".to_owned(),
      ));
    }
  }

  let event = input.into_event(team_id, Some(profile.profile_id));
  let event = store.add_event(event).await.map_err(ServiceError::store)?;
  info!(event_id = %event.event_id, %team_id, "created event");
  Ok(event)
}

/// Start a new series for the team. Same permission as creating an event.
pub async fn create_series<S>(
  store: &S,
  profile: &Profile,
  team_id: Uuid,
  name: String,
) -> Result<Series>
where
  S: CommunityStore,
{
  let roster = load_roster(store, team_id).await?;
  if !policy::can_create_event(profile, &roster) {
    warn!(%team_id, profile_id = %profile.profile_id, "series creation denied");
    return Err(ServiceError::PermissionDenied(
      "You can not create events for this team.".to_owned(),
    ));
  }

  let series = Series {
    series_id: Uuid::new_v4(),
    team_id,
    name,
    created_by: Some(profile.profile_id),
  };
  let series = store.add_series(series).await.map_err(ServiceError::store)?;
  info!(series_id = %series.series_id, %team_id, "created series");
  Ok(series)
}

/// Whether `profile` may change the event.
pub async fn can_edit_event<S>(store: &S, profile: &Profile, event_id: Uuid) -> Result<bool>
where
  S: CommunityStore,
{
  let event = store
    .get_event(event_id)
    .await
    .map_err(ServiceError::store)?
    .ok_or_else(|| ServiceError::NotFound(format!("event {event_id}")))?;
  let roster = load_roster(store, event.team_id).await?;
  Ok(policy::can_edit_event(profile, &event, &roster))
}
