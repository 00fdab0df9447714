//! Service operations against an in-memory SQLite store.

use chrono::{Duration, Utc};
use gather_core::{
  event::{NewCommonEvent, NewEvent},
  location::{City, Country, Region},
  membership::Role,
  organization::NewOrganization,
  profile::{Caller, Identity, Profile},
  store::CommunityStore,
  team::{NewTeam, Team, TeamChanges},
};
use gather_store_sqlite::SqliteStore;
use uuid::Uuid;

use crate::{
  EDIT_DENIED, ServiceError, events, members, organizations, proximity::Unlocated,
  resolve_profile, teams,
};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn signed_in(username: &str) -> Caller {
  Caller::Authenticated(Identity::new(username))
}

async fn profile(s: &SqliteStore, username: &str) -> Profile {
  resolve_profile(s, &signed_in(username)).await.unwrap()
}

async fn superuser(s: &SqliteStore, username: &str) -> Profile {
  let mut identity = Identity::new(username);
  identity.is_superuser = true;
  resolve_profile(s, &Caller::Authenticated(identity)).await.unwrap()
}

async fn country(s: &SqliteStore) -> Uuid {
  s.add_country(Country {
    country_id: Uuid::new_v4(),
    name:       "USA".into(),
    code:       "US".into(),
  })
  .await
  .unwrap()
  .country_id
}

async fn team(s: &SqliteStore, owner: &Profile, name: &str) -> Team {
  let usa = country(s).await;
  teams::create_team(s, owner, NewTeam::new(name, usa))
    .await
    .unwrap()
    .0
}

fn meetup(hours_from_now: i64) -> NewEvent {
  let start = Utc::now() + Duration::hours(hours_from_now);
  NewEvent {
    name:       format!("meetup {hours_from_now:+}h"),
    series_id:  None,
    start_time: start,
    end_time:   start + Duration::hours(2),
  }
}

fn is_denied(err: &ServiceError) -> bool { matches!(err, ServiceError::PermissionDenied(_)) }

// ─── Profile resolution ──────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_caller_is_not_persisted() {
  let s = store().await;
  let anon = resolve_profile(&s, &Caller::Anonymous).await.unwrap();

  assert!(anon.is_anonymous());
  assert!(!anon.is_superuser());
  assert!(s.get_profile(anon.profile_id).await.unwrap().is_none());
}

#[tokio::test]
async fn resolving_twice_returns_the_same_record() {
  let s = store().await;
  let mut identity = Identity::new("alice");
  identity.given_name = Some("Alice".into());
  identity.family_name = Some("Liddell".into());
  identity.email = Some("test@example.com".into());
  let caller = Caller::Authenticated(identity);

  let first = resolve_profile(&s, &caller).await.unwrap();
  let second = resolve_profile(&s, &caller).await.unwrap();

  assert_eq!(first, second);
  assert_eq!(first.real_name, "Alice Liddell");
  assert_eq!(first.tz, "UTC");
  assert!(first.avatar.as_deref().is_some_and(|a| a.contains("gravatar.com")));
}

#[tokio::test]
async fn concurrent_first_access_creates_one_profile() {
  let s = store().await;
  let caller = signed_in("racer");

  let (a, b) = tokio::join!(resolve_profile(&s, &caller), resolve_profile(&s, &caller));
  let (a, b) = (a.unwrap(), b.unwrap());

  assert_eq!(a.profile_id, b.profile_id);
  let stored = s
    .get_profile_by_username("racer".into())
    .await
    .unwrap()
    .expect("profile row");
  assert_eq!(stored.profile_id, a.profile_id);
}

#[tokio::test]
async fn superuser_flag_comes_from_the_identity() {
  let s = store().await;
  let root = superuser(&s, "root").await;
  assert!(root.is_superuser());

  let plain = profile(&s, "root").await;
  assert_eq!(plain.profile_id, root.profile_id);
  assert!(!plain.is_superuser());
}

// ─── Teams ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn springfield_team_gets_region_and_country() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let usa = country(&s).await;
  let illinois = s
    .add_region(Region { region_id: Uuid::new_v4(), name: "Illinois".into(), country_id: Some(usa) })
    .await
    .unwrap();
  let springfield = s
    .add_city(City {
      city_id:   Uuid::new_v4(),
      name:      "Springfield".into(),
      region_id: Some(illinois.region_id),
      latitude:  39.78,
      longitude: -89.65,
    })
    .await
    .unwrap();

  let mut input = NewTeam::new("Springfield Rust", usa);
  input.city_id = Some(springfield.city_id);
  let (created, admin) = teams::create_team(&s, &owner, input).await.unwrap();

  assert_eq!(created.region_id, Some(illinois.region_id));
  assert_eq!(created.country_id, usa);
  assert_eq!(created.owner_profile_id, owner.profile_id);
  assert_eq!(admin.role, Role::Admin);

  let roster = s.get_roster(created.team_id).await.unwrap().unwrap();
  assert_eq!(roster.memberships.len(), 1);
  assert_eq!(roster.administrators(), vec![owner.profile_id]);
}

#[tokio::test]
async fn clearing_the_city_keeps_the_derived_region() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let usa = country(&s).await;
  let illinois = s
    .add_region(Region { region_id: Uuid::new_v4(), name: "Illinois".into(), country_id: Some(usa) })
    .await
    .unwrap();
  let springfield = s
    .add_city(City {
      city_id:   Uuid::new_v4(),
      name:      "Springfield".into(),
      region_id: Some(illinois.region_id),
      latitude:  39.78,
      longitude: -89.65,
    })
    .await
    .unwrap();

  let mut input = NewTeam::new("Springfield Rust", usa);
  input.city_id = Some(springfield.city_id);
  input.description = Some("Downtown".into());
  let (t, _) = teams::create_team(&s, &owner, input).await.unwrap();

  let edited = teams::edit_team(&s, &owner, t.team_id, TeamChanges {
    city_id: Some(None),
    description: Some(None),
    ..TeamChanges::default()
  })
  .await
  .unwrap();
  assert_eq!(edited.city_id, None);
  assert_eq!(edited.description, None);
  assert_eq!(edited.region_id, Some(illinois.region_id));

  let stored = s.get_team(t.team_id).await.unwrap().unwrap();
  assert_eq!(stored.city_id, None);
  assert_eq!(stored.region_id, Some(illinois.region_id));
}

#[tokio::test]
async fn anonymous_cannot_create() {
  let s = store().await;
  let anon = Profile::anonymous();
  let usa = country(&s).await;

  let err = teams::create_team(&s, &anon, NewTeam::new("Ghosts", usa))
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  let err = organizations::create_organization(&s, &anon, NewOrganization::new("Ghosts"))
    .await
    .unwrap_err();
  assert!(is_denied(&err));
}

#[tokio::test]
async fn only_permitted_profiles_edit_and_owner_stays() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let stranger = profile(&s, "stranger").await;
  let root = superuser(&s, "root").await;
  let t = team(&s, &owner, "Rustaceans").await;

  let rename = |name: &str| TeamChanges { name: Some(name.into()), ..TeamChanges::default() };

  let err = teams::edit_team(&s, &stranger, t.team_id, rename("Hijacked"))
    .await
    .unwrap_err();
  assert_eq!(err.warning(), Some(EDIT_DENIED));
  assert_eq!(s.get_team(t.team_id).await.unwrap().unwrap().name, "Rustaceans");

  let edited = teams::edit_team(&s, &owner, t.team_id, rename("Crustaceans"))
    .await
    .unwrap();
  assert_eq!(edited.name, "Crustaceans");

  let edited = teams::edit_team(&s, &root, t.team_id, rename("Ferris Fans"))
    .await
    .unwrap();
  assert_eq!(edited.name, "Ferris Fans");
  assert_eq!(edited.owner_profile_id, owner.profile_id);
}

#[tokio::test]
async fn delete_requires_edit_permission() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let stranger = profile(&s, "stranger").await;
  let t = team(&s, &owner, "Rustaceans").await;

  let err = teams::delete_team(&s, &stranger, t.team_id).await.unwrap_err();
  assert!(is_denied(&err));

  teams::delete_team(&s, &owner, t.team_id).await.unwrap();
  let err = teams::show_team(&s, &owner, t.team_id, Utc::now())
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn team_page_splits_events() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let t = team(&s, &owner, "Rustaceans").await;

  for hours in [-200, -100, -80, -60, -40, -20, 5, 48] {
    events::create_event(&s, &owner, t.team_id, meetup(hours)).await.unwrap();
  }

  let page = teams::show_team(&s, &owner, t.team_id, Utc::now()).await.unwrap();
  let upcoming: Vec<&str> = page.upcoming_events.iter().map(|e| e.name.as_str()).collect();
  let recent: Vec<&str> = page.recent_events.iter().map(|e| e.name.as_str()).collect();

  assert_eq!(upcoming, vec!["meetup +5h", "meetup +48h"]);
  assert_eq!(recent, vec![
    "meetup -20h",
    "meetup -40h",
    "meetup -60h",
    "meetup -80h",
    "meetup -100h",
  ]);
  assert!(page.is_member);
  assert!(page.can_edit_team);
  assert!(!page.is_premium);

  let anon_page = teams::show_team(&s, &Profile::anonymous(), t.team_id, Utc::now())
    .await
    .unwrap();
  assert!(!anon_page.is_member);
  assert!(!anon_page.can_create_event);
}

#[tokio::test]
async fn team_page_reports_premium_window() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let mut t = team(&s, &owner, "Rustaceans").await;

  let now = Utc::now();
  t.is_premium = true;
  t.premium_by = Some(owner.profile_id);
  t.premium_started = Some(now - Duration::days(1));
  t.premium_expires = Some(now + Duration::days(30));
  s.save_team(t.clone()).await.unwrap();

  let page = teams::show_team(&s, &owner, t.team_id, now).await.unwrap();
  assert!(page.is_premium);

  let later = teams::show_team(&s, &owner, t.team_id, now + Duration::days(31))
    .await
    .unwrap();
  assert!(!later.is_premium);
}

#[tokio::test]
async fn my_teams_for_members_and_everything_for_anonymous() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let joe = profile(&s, "joe").await;
  let a = team(&s, &owner, "Alpha").await;
  team(&s, &owner, "Beta").await;

  members::add_member(&s, &joe, a.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap();

  let mine = teams::list_my_teams(&s, &joe, &Unlocated).await.unwrap();
  assert_eq!(mine.len(), 1);
  assert_eq!(mine[0].team_id, a.team_id);

  let everything = teams::list_my_teams(&s, &Profile::anonymous(), &Unlocated)
    .await
    .unwrap();
  assert_eq!(everything.len(), 2);

  let beta_first = |t: &Team| Some(if t.name == "Beta" { 1.0 } else { 2.0 });
  let nearest: Vec<String> = teams::list_all_teams(&s, &beta_first)
    .await
    .unwrap()
    .into_iter()
    .map(|t| t.name)
    .collect();
  assert_eq!(nearest, vec!["Beta", "Alpha"]);
}

// ─── Membership ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn moderator_grant_unlocks_event_creation() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let q = profile(&s, "q").await;
  let t = team(&s, &owner, "Rustaceans").await;

  members::add_member(&s, &q, t.team_id, q.profile_id, Role::Normal)
    .await
    .unwrap();
  let err = events::create_event(&s, &q, t.team_id, meetup(24))
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  members::set_role(&s, &owner, t.team_id, q.profile_id, Role::Moderator)
    .await
    .unwrap();
  let event = events::create_event(&s, &q, t.team_id, meetup(24)).await.unwrap();
  assert_eq!(event.created_by, Some(q.profile_id));

  let page = teams::show_team(&s, &q, t.team_id, Utc::now()).await.unwrap();
  assert!(page.can_create_event);
  let roles: Vec<Role> = page.member_list.iter().map(|m| m.role).collect();
  assert_eq!(roles, vec![Role::Admin, Role::Moderator]);
  assert!(s.moderating(q.profile_id).await.unwrap().iter().any(|m| m.team_id == t.team_id));
}

#[tokio::test]
async fn only_editors_add_others_or_change_roles() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let joe = profile(&s, "joe").await;
  let eve = profile(&s, "eve").await;
  let t = team(&s, &owner, "Rustaceans").await;

  let err = members::add_member(&s, &eve, t.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  let err = members::add_member(&s, &eve, t.team_id, eve.profile_id, Role::Admin)
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  members::add_member(&s, &owner, t.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap();
  let err = members::set_role(&s, &joe, t.team_id, joe.profile_id, Role::Admin)
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  let err = members::set_role(&s, &owner, t.team_id, eve.profile_id, Role::Moderator)
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));

  let promoted = members::set_role(&s, &owner, t.team_id, joe.profile_id, Role::Moderator)
    .await
    .unwrap();
  let again = members::set_role(&s, &owner, t.team_id, joe.profile_id, Role::Moderator)
    .await
    .unwrap();
  assert_eq!(again, promoted);
}

#[tokio::test]
async fn joining_twice_is_an_integrity_violation() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let joe = profile(&s, "joe").await;
  let t = team(&s, &owner, "Rustaceans").await;

  members::add_member(&s, &joe, t.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap();
  let err = members::add_member(&s, &joe, t.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap_err();

  let inner = match err {
    ServiceError::Store(inner) => inner,
    other => panic!("expected a store error, got {other:?}"),
  };
  let store_err = inner
    .downcast_ref::<gather_store_sqlite::Error>()
    .expect("sqlite error");
  assert!(store_err.is_integrity_violation());
}

#[tokio::test]
async fn removing_members() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let joe = profile(&s, "joe").await;
  let t = team(&s, &owner, "Rustaceans").await;
  members::add_member(&s, &joe, t.team_id, joe.profile_id, Role::Normal)
    .await
    .unwrap();

  let err = members::remove_member(&s, &owner, t.team_id, owner.profile_id)
    .await
    .unwrap_err();
  assert!(is_denied(&err));

  members::remove_member(&s, &owner, t.team_id, joe.profile_id)
    .await
    .unwrap();
  let err = members::remove_member(&s, &owner, t.team_id, joe.profile_id)
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));
}

// ─── Events ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn event_creator_keeps_edit_rights_without_a_role() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let q = profile(&s, "q").await;
  let t = team(&s, &owner, "Rustaceans").await;

  members::add_member(&s, &owner, t.team_id, q.profile_id, Role::Moderator)
    .await
    .unwrap();
  let series = events::create_series(&s, &q, t.team_id, "Monthly".into())
    .await
    .unwrap();
  let mut input = meetup(24);
  input.series_id = Some(series.series_id);
  let event = events::create_event(&s, &q, t.team_id, input).await.unwrap();

  members::set_role(&s, &owner, t.team_id, q.profile_id, Role::Normal)
    .await
    .unwrap();
  assert!(events::can_edit_event(&s, &q, event.event_id).await.unwrap());
  assert!(events::can_edit_event(&s, &owner, event.event_id).await.unwrap());
  assert!(!events::can_edit_event(&s, &profile(&s, "eve").await, event.event_id).await.unwrap());
}

#[tokio::test]
async fn foreign_series_is_not_found() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let home = team(&s, &owner, "Home").await;
  let away = team(&s, &owner, "Away").await;
  let series = events::create_series(&s, &owner, away.team_id, "Away games".into())
    .await
    .unwrap();

  let mut input = meetup(24);
  input.series_id = Some(series.series_id);
  let err = events::create_event(&s, &owner, home.team_id, input)
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));
}

// ─── Organizations ───────────────────────────────────────────────────────────

#[tokio::test]
async fn org_page_lists_teams_and_common_event_right() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let moderator = profile(&s, "mod").await;
  let org = organizations::create_organization(&s, &owner, NewOrganization::new("Rust Guild"))
    .await
    .unwrap();
  assert_eq!(org.slug, "rust-guild");

  for name in ["Zeta", "Eta"] {
    let t = team(&s, &owner, name).await;
    teams::edit_team(&s, &owner, t.team_id, TeamChanges {
      organization_id: Some(Some(org.org_id)),
      ..TeamChanges::default()
    })
    .await
    .unwrap();
    members::add_member(&s, &owner, t.team_id, moderator.profile_id, Role::Admin)
      .await
      .unwrap();
  }

  let page = organizations::show_org(&s, &owner, "rust-guild", Utc::now()).await.unwrap();
  let names: Vec<&str> = page.teams.iter().map(|t| t.name.as_str()).collect();
  assert_eq!(names, vec!["Eta", "Zeta"]);
  assert!(page.can_create_event);

  let page = organizations::show_org(&s, &moderator, "rust-guild", Utc::now()).await.unwrap();
  assert!(!page.can_create_event);

  let err = organizations::show_org(&s, &owner, "missing", Utc::now()).await.unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));
}

fn gathering(hours_from_now: i64) -> NewCommonEvent {
  let start = Utc::now() + Duration::hours(hours_from_now);
  NewCommonEvent {
    name:       format!("gathering {hours_from_now:+}h"),
    start_time: start,
    end_time:   start + Duration::hours(3),
  }
}

#[tokio::test]
async fn org_page_splits_common_events() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let org = organizations::create_organization(&s, &owner, NewOrganization::new("Rust Guild"))
    .await
    .unwrap();

  for hours in [-300, -200, -100, -80, -60, -40, 10, 72] {
    organizations::create_common_event(&s, &owner, org.org_id, gathering(hours))
      .await
      .unwrap();
  }

  let page = organizations::show_org(&s, &owner, "rust-guild", Utc::now())
    .await
    .unwrap();
  let upcoming: Vec<&str> = page.upcoming_events.iter().map(|e| e.name.as_str()).collect();
  let recent: Vec<&str> = page.recent_events.iter().map(|e| e.name.as_str()).collect();

  assert_eq!(upcoming, vec!["gathering +10h", "gathering +72h"]);
  assert_eq!(recent, vec![
    "gathering -40h",
    "gathering -60h",
    "gathering -80h",
    "gathering -100h",
    "gathering -200h",
  ]);
  assert!(page.upcoming_events.iter().all(|e| e.created_by == Some(owner.profile_id)));
}

#[tokio::test]
async fn only_owner_or_superuser_creates_common_events() {
  let s = store().await;
  let owner = profile(&s, "owner").await;
  let moderator = profile(&s, "mod").await;
  let root = superuser(&s, "root").await;
  let org = organizations::create_organization(&s, &owner, NewOrganization::new("Rust Guild"))
    .await
    .unwrap();

  let t = team(&s, &owner, "Guild Team").await;
  teams::edit_team(&s, &owner, t.team_id, TeamChanges {
    organization_id: Some(Some(org.org_id)),
    ..TeamChanges::default()
  })
  .await
  .unwrap();
  members::add_member(&s, &owner, t.team_id, moderator.profile_id, Role::Moderator)
    .await
    .unwrap();

  for denied in [&moderator, &Profile::anonymous()] {
    let err = organizations::create_common_event(&s, denied, org.org_id, gathering(24))
      .await
      .unwrap_err();
    assert!(is_denied(&err));
  }

  let event = organizations::create_common_event(&s, &root, org.org_id, gathering(24))
    .await
    .unwrap();
  assert_eq!(event.organization_id, org.org_id);

  let err = organizations::create_common_event(&s, &owner, Uuid::new_v4(), gathering(24))
    .await
    .unwrap_err();
  assert!(matches!(err, ServiceError::NotFound(_)));

  let page = organizations::show_org(&s, &moderator, "rust-guild", Utc::now())
    .await
    .unwrap();
  assert_eq!(page.upcoming_events.len(), 1);
}
