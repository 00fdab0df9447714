use chrono::Utc;
use gather_core::{
  location::{LocationHierarchy, LocationSource as _},
  store::CommunityStore,
  team::{NewTeam, Team, TeamChanges},
};
use gather_service::{
  TeamDistance,
  proximity::Unlocated,
  teams::{self, TeamPage},
};
use serde::Serialize;
use uuid::Uuid;

use super::{Session, print_json};
use crate::{
  cli::TeamCommand,
  geo::{FromPoint, Point},
};

/// One line of a team listing.
#[derive(Serialize)]
struct TeamSummary {
  team_id:     Uuid,
  name:        String,
  location:    String,
  distance_km: Option<f64>,
}

#[derive(Serialize)]
struct MemberLine {
  profile_id: Uuid,
  role:       &'static str,
}

#[derive(Serialize)]
struct TeamView<'a> {
  #[serde(flatten)]
  page:    &'a TeamPage,
  /// Display order with human-readable role labels.
  members: Vec<MemberLine>,
}

pub async fn run(session: &Session, cmd: TeamCommand) -> anyhow::Result<()> {
  let store = &session.store;
  let profile = &session.profile;

  match cmd {
    TeamCommand::List { mine, near } => {
      let places = store.load_locations().await?;
      let origin = near.or_else(|| home_point(session, &places));
      let distance: Box<dyn TeamDistance + '_> = match origin {
        Some(origin) => Box::new(FromPoint { origin, places: &places }),
        None => Box::new(Unlocated),
      };

      let found = if mine {
        teams::list_my_teams(store, profile, &*distance).await?
      } else {
        teams::list_all_teams(store, &*distance).await?
      };
      print_json(&summarise(found, &places, &*distance))
    }

    TeamCommand::Show { team } => {
      let page = teams::show_team(store, profile, team, Utc::now()).await?;
      let members = page
        .member_list
        .iter()
        .map(|m| MemberLine { profile_id: m.profile_id, role: m.role_name() })
        .collect();
      print_json(&TeamView { page: &page, members })
    }

    TeamCommand::Create { name, country, city, org, description, tz } => {
      let mut input = NewTeam::new(name, country);
      input.city_id = city;
      input.organization_id = org;
      input.description = description;
      if let Some(tz) = tz {
        input.tz = tz;
      }
      let (team, admin) = teams::create_team(store, profile, input).await?;
      print_json(&serde_json::json!({ "team": team, "membership": admin }))
    }

    TeamCommand::Edit {
      team,
      name,
      city,
      clear_city,
      region,
      clear_region,
      org,
      clear_org,
      description,
      clear_description,
      tz,
      active,
    } => {
      let changes = TeamChanges {
        name,
        city_id: nullable(city, clear_city),
        region_id: nullable(region, clear_region),
        organization_id: nullable(org, clear_org),
        description: nullable(description, clear_description),
        tz,
        active,
        ..TeamChanges::default()
      };
      let team = teams::edit_team(store, profile, team, changes).await?;
      print_json(&team)
    }

    TeamCommand::Delete { team } => {
      teams::delete_team(store, profile, team).await?;
      print_json(&serde_json::json!({ "deleted": team }))
    }

    TeamCommand::Moderating { username, admin } => {
      let whose = match username {
        Some(name) => session.profile_by_username(&name).await?,
        None => {
          session.require_signed_in()?;
          profile.clone()
        }
      };
      let found = if admin {
        store.administering(whose.profile_id).await?
      } else {
        store.moderating(whose.profile_id).await?
      };
      let places = store.load_locations().await?;
      print_json(&summarise(found, &places, &Unlocated))
    }
  }
}

/// The caller's home city, when they have one.
fn home_point(session: &Session, places: &LocationHierarchy) -> Option<Point> {
  let city = places.city(session.profile.city_id?)?;
  Some(Point::of_city(city))
}

/// A new value, a request to clear, or no change.
fn nullable<T>(value: Option<T>, clear: bool) -> Option<Option<T>> {
  if clear { Some(None) } else { value.map(Some) }
}

fn summarise(
  teams: Vec<Team>,
  places: &LocationHierarchy,
  distance: &(impl TeamDistance + ?Sized),
) -> Vec<TeamSummary> {
  teams
    .into_iter()
    .map(|t| TeamSummary {
      team_id:     t.team_id,
      location:    places.location_name(&t),
      distance_km: distance.distance_from(&t),
      name:        t.name,
    })
    .collect()
}
