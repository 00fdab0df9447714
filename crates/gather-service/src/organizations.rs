//! Organization pages, creation, and organization-wide events.

use chrono::{DateTime, Utc};
use gather_core::{
  event::{CommonEvent, NewCommonEvent},
  organization::{NewOrganization, Organization},
  policy,
  profile::Profile,
  store::CommunityStore,
  team::Team,
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Result, ServiceError, teams::RECENT_EVENT_LIMIT};

#[derive(Debug, Clone, Serialize)]
pub struct OrgPage {
  pub org:              Organization,
  /// Common events that have not ended yet, soonest first.
  pub upcoming_events:  Vec<CommonEvent>,
  /// At most [`RECENT_EVENT_LIMIT`] finished common events, latest first.
  pub recent_events:    Vec<CommonEvent>,
  /// Ordered by name.
  pub teams:            Vec<Team>,
  /// Whether the viewer may create an organization-wide event.
  pub can_create_event: bool,
}

pub async fn show_org<S>(
  store: &S,
  profile: &Profile,
  slug: &str,
  now: DateTime<Utc>,
) -> Result<OrgPage>
where
  S: CommunityStore,
{
  let org = store
    .get_organization_by_slug(slug.to_owned())
    .await
    .map_err(ServiceError::store)?
    .ok_or_else(|| ServiceError::NotFound(format!("organization {slug:?}")))?;

  let upcoming_events = store
    .upcoming_common_events(org.org_id, now)
    .await
    .map_err(ServiceError::store)?;
  let recent_events = store
    .recent_common_events(org.org_id, now, RECENT_EVENT_LIMIT)
    .await
    .map_err(ServiceError::store)?;
  let teams = store
    .list_organization_teams(org.org_id)
    .await
    .map_err(ServiceError::store)?;
  let can_create_event = policy::can_create_common_event(profile, &org);

  Ok(OrgPage {
    org,
    upcoming_events,
    recent_events,
    teams,
    can_create_event,
  })
}

/// Create an organization owned by `profile`.
pub async fn create_organization<S>(
  store: &S,
  profile: &Profile,
  input: NewOrganization,
) -> Result<Organization>
where
  S: CommunityStore,
{
  if profile.is_anonymous() {
    warn!("anonymous caller tried to create an organization");
    return Err(ServiceError::PermissionDenied(
      "You must be signed in to create an organization.".to_owned(),
    ));
  }

  let org = input.into_organization(profile.profile_id);
  let org = store
    .create_organization(org)
    .await
    .map_err(ServiceError::store)?;
  info!(org_id = %org.org_id, slug = %org.slug, "created organization");
  Ok(org)
}

/// Schedule an event for the whole organization. The caller is recorded as
/// its creator.
pub async fn create_common_event<S>(
  store: &S,
  profile: &Profile,
  org_id: Uuid,
  input: NewCommonEvent,
) -> Result<CommonEvent>
where
  S: CommunityStore,
{
  let org = store
    .get_organization(org_id)
    .await
    .map_err(ServiceError::store)?
    .ok_or_else(|| ServiceError::NotFound(format!("organization {org_id}")))?;

  if !policy::can_create_common_event(profile, &org) {
    warn!(%org_id, profile_id = %profile.profile_id, "common event creation denied");
    return Err(ServiceError::PermissionDenied(
      "You can not create events for this organization.".to_owned(),
    ));
  }

  let event = input.into_common_event(org_id, Some(profile.profile_id));
  let event = store
    .add_common_event(event)
    .await
    .map_err(ServiceError::store)?;
  info!(common_event_id = %event.common_event_id, %org_id, "created common event");
  Ok(event)
}
