//! Authorization policy.
//!
//! Every check is a pure function of the acting profile and the target. None
//! of them fail: a question that cannot be answered is answered "no".
//!
//! Precedence is fixed and short-circuits in this order:
//!
//! 1. superuser → allow
//! 2. anonymous → deny
//! 3. creator of the series/event (where applicable) → allow
//! 4. owner of the team/organization → allow
//! 5. moderator or admin of the team (team scope only) → allow
//! 6. deny

use uuid::Uuid;

use crate::{
  event::{Event, Series},
  organization::Organization,
  profile::Profile,
  team::TeamRoster,
};

/// May `profile` schedule events for the team?
pub fn can_create_event(profile: &Profile, roster: &TeamRoster) -> bool {
  team_scoped(profile, None, roster.team.team_id, roster)
}

/// May `profile` change or delete the team?
pub fn can_edit_team(profile: &Profile, roster: &TeamRoster) -> bool {
  team_scoped(profile, None, roster.team.team_id, roster)
}

/// `roster` must be the series' team for the owner and moderator rules to
/// apply; the creator rule holds regardless.
pub fn can_edit_series(
  profile: &Profile,
  series: &Series,
  roster: &TeamRoster,
) -> bool {
  team_scoped(profile, series.created_by, series.team_id, roster)
}

/// `roster` must be the event's team for the owner and moderator rules to
/// apply; the creator rule holds regardless.
pub fn can_edit_event(
  profile: &Profile,
  event: &Event,
  roster: &TeamRoster,
) -> bool {
  team_scoped(profile, event.created_by, event.team_id, roster)
}

/// May `profile` create an organization-wide event? Only the organization's
/// owner (or a superuser) may; team moderators are not consulted.
pub fn can_create_common_event(profile: &Profile, org: &Organization) -> bool {
  if profile.is_superuser() {
    return true;
  }
  if profile.is_anonymous() {
    return false;
  }
  org.owner_profile_id == Some(profile.profile_id)
}

fn team_scoped(
  profile: &Profile,
  created_by: Option<Uuid>,
  team_id: Uuid,
  roster: &TeamRoster,
) -> bool {
  if profile.is_superuser() {
    return true;
  }
  if profile.is_anonymous() {
    return false;
  }
  if created_by == Some(profile.profile_id) {
    return true;
  }
  if roster.team.team_id != team_id {
    return false;
  }
  if roster.team.owner_profile_id == profile.profile_id {
    return true;
  }
  roster.is_moderator(profile.profile_id)
}
