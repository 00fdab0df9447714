//! [`SqliteStore`]: the SQLite implementation of [`CommunityStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, Row};
use uuid::Uuid;

use gather_core::{
  event::{CommonEvent, Event, Series},
  location::{City, Country, LocationHierarchy, Region, derive_location},
  membership::{Membership, Role},
  organization::Organization,
  profile::{Profile, ProfileDefaults},
  store::CommunityStore,
  taxonomy::{Category, Topic},
  team::{Team, TeamRoster},
};

use crate::{
  Error, Result,
  encode::{
    CATEGORY_COLUMNS, CITY_COLUMNS, COMMON_EVENT_COLUMNS, COUNTRY_COLUMNS, EVENT_COLUMNS,
    EncodedProfile, MEMBERSHIP_COLUMNS, ORGANIZATION_COLUMNS, PROFILE_COLUMNS,
    REGION_COLUMNS, RawCategory, RawCity, RawCommonEvent, RawCountry, RawEvent, RawMembership,
    RawOrganization, RawProfile, RawRegion, RawSeries, RawTeam, RawTopic,
    SERIES_COLUMNS, TEAM_COLUMNS, TOPIC_COLUMNS, encode_dt, encode_opt_uuid,
    encode_uuid,
  },
  schema::SCHEMA,
};

const INSERT_TEAM: &str = "INSERT INTO teams (
     team_id, name, organization_id, description, country_id, region_id, city_id,
     web_url, email, cover_img, created_date, owner_profile_id, admin_profile_ids,
     contact_profile_ids, category_id, topic_ids, active, tz, is_premium,
     premium_by, premium_started, premium_expires
   ) VALUES (
     :team_id, :name, :organization_id, :description, :country_id, :region_id, :city_id,
     :web_url, :email, :cover_img, :created_date, :owner_profile_id, :admin_profile_ids,
     :contact_profile_ids, :category_id, :topic_ids, :active, :tz, :is_premium,
     :premium_by, :premium_started, :premium_expires
   )";

const UPDATE_TEAM: &str = "UPDATE teams SET
     name = :name, organization_id = :organization_id, description = :description,
     country_id = :country_id, region_id = :region_id, city_id = :city_id,
     web_url = :web_url, email = :email, cover_img = :cover_img,
     created_date = :created_date, owner_profile_id = :owner_profile_id,
     admin_profile_ids = :admin_profile_ids, contact_profile_ids = :contact_profile_ids,
     category_id = :category_id, topic_ids = :topic_ids, active = :active, tz = :tz,
     is_premium = :is_premium, premium_by = :premium_by,
     premium_started = :premium_started, premium_expires = :premium_expires
   WHERE team_id = :team_id";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gather community store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Rewrite the team's region and country from its city, reading only the
  /// two rows the chain needs.
  async fn derive_team_location(&self, team: &mut Team) -> Result<()> {
    let Some(city_id) = team.city_id else {
      return Ok(());
    };
    let city_str = encode_uuid(city_id);

    let (city, region): (Option<RawCity>, Option<RawRegion>) = self
      .conn
      .call(move |conn| {
        let city = conn
          .query_row(
            &format!("SELECT {CITY_COLUMNS} FROM cities WHERE city_id = ?1"),
            [city_str],
            RawCity::from_row,
          )
          .optional()?;
        let region = match city.as_ref().and_then(|c| c.region_id.clone()) {
          Some(region_id) => conn
            .query_row(
              &format!("SELECT {REGION_COLUMNS} FROM regions WHERE region_id = ?1"),
              [region_id],
              RawRegion::from_row,
            )
            .optional()?,
          None => None,
        };
        Ok((city, region))
      })
      .await?;

    let mut places = LocationHierarchy::new();
    if let Some(city) = city {
      places.insert_city(city.into_city()?);
    }
    if let Some(region) = region {
      places.insert_region(region.into_region()?);
    }
    derive_location(team, &places)?;
    Ok(())
  }

  async fn query_teams(
    &self,
    sql: String,
    params: Vec<String>,
  ) -> Result<Vec<Team>> {
    let raws: Vec<RawTeam> = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &sql,
          rusqlite::params_from_iter(params),
          RawTeam::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawTeam::into_team).collect()
  }

  /// Run an event listing whose parameters are `(owner id, now, limit)`.
  async fn query_timeline<R, T>(
    &self,
    sql: String,
    owner_id: Uuid,
    now: DateTime<Utc>,
    limit: i64,
    from_row: fn(&Row<'_>) -> rusqlite::Result<R>,
    decode: fn(R) -> Result<T>,
  ) -> Result<Vec<T>>
  where
    R: Send + 'static,
  {
    let owner_str = encode_uuid(owner_id);
    let now_str = encode_dt(now);

    let raws: Vec<R> = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &sql,
          rusqlite::params![owner_str, now_str, limit],
          from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(decode).collect()
  }
}

/// Run `sql` and collect every row through `map`.
fn query_all<T>(
  conn: &Connection,
  sql: &str,
  params: impl rusqlite::Params,
  map: fn(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt.query_map(params, map)?.collect();
  rows
}

fn write_team(conn: &Connection, sql: &str, t: &RawTeam) -> rusqlite::Result<usize> {
  conn.execute(sql, rusqlite::named_params! {
    ":team_id":             t.team_id,
    ":name":                t.name,
    ":organization_id":     t.organization_id,
    ":description":         t.description,
    ":country_id":          t.country_id,
    ":region_id":           t.region_id,
    ":city_id":             t.city_id,
    ":web_url":             t.web_url,
    ":email":               t.email,
    ":cover_img":           t.cover_img,
    ":created_date":        t.created_date,
    ":owner_profile_id":    t.owner_profile_id,
    ":admin_profile_ids":   t.admin_profile_ids,
    ":contact_profile_ids": t.contact_profile_ids,
    ":category_id":         t.category_id,
    ":topic_ids":           t.topic_ids,
    ":active":              t.active,
    ":tz":                  t.tz,
    ":is_premium":          t.is_premium,
    ":premium_by":          t.premium_by,
    ":premium_started":     t.premium_started,
    ":premium_expires":     t.premium_expires,
  })
}

fn insert_membership(conn: &Connection, m: &RawMembership) -> rusqlite::Result<()> {
  conn.execute(
    &format!("INSERT INTO memberships ({MEMBERSHIP_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
    rusqlite::params![m.membership_id, m.team_id, m.profile_id, m.role, m.joined_at],
  )?;
  Ok(())
}

fn encode_membership(m: &Membership) -> RawMembership {
  RawMembership {
    membership_id: encode_uuid(m.membership_id),
    team_id:       encode_uuid(m.team_id),
    profile_id:    encode_uuid(m.profile_id),
    role:          m.role.value(),
    joined_at:     encode_dt(m.joined_at),
  }
}

/// Whether `err` is a UNIQUE constraint failure.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── CommunityStore impl ─────────────────────────────────────────────────────

impl CommunityStore for SqliteStore {
  type Error = Error;

  // ── Profiles ──────────────────────────────────────────────────────────────

  async fn get_or_create_profile(
    &self,
    username: String,
    defaults: ProfileDefaults,
  ) -> Result<(Profile, bool)> {
    let candidate = Profile::new(username.clone(), defaults);
    let p = EncodedProfile::new(&candidate, username)?;

    let (raw, created): (RawProfile, bool) = self
      .conn
      .call(move |conn| {
        let inserted = conn.execute(
          &format!(
            "INSERT INTO profiles ({PROFILE_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
             ON CONFLICT (username) DO NOTHING"
          ),
          rusqlite::params![
            p.profile_id,
            p.username,
            p.real_name,
            p.tz,
            p.avatar,
            p.city_id,
            p.web_url,
            p.twitter,
            p.facebook,
            p.send_notifications,
            p.secret_key,
            p.categories,
            p.topics,
          ],
        )?;
        let raw = conn.query_row(
          &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ?1"),
          [&p.username],
          RawProfile::from_row,
        )?;
        Ok((raw, inserted == 1))
      })
      .await?;

    Ok((raw.into_profile()?, created))
  }

  async fn get_profile(&self, id: Uuid) -> Result<Option<Profile>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE profile_id = ?1"),
            [id_str],
            RawProfile::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn get_profile_by_username(&self, username: String) -> Result<Option<Profile>> {
    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = ?1"),
            [username],
            RawProfile::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn update_profile(&self, profile: Profile) -> Result<Profile> {
    let username = profile
      .username()
      .map(str::to_owned)
      .ok_or(Error::ProfileNotFound(profile.profile_id))?;
    let p = EncodedProfile::new(&profile, username)?;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE profiles SET
             real_name = ?2, tz = ?3, avatar = ?4, city_id = ?5, web_url = ?6,
             twitter = ?7, facebook = ?8, send_notifications = ?9,
             categories = ?10, topics = ?11
           WHERE profile_id = ?1",
          rusqlite::params![
            p.profile_id,
            p.real_name,
            p.tz,
            p.avatar,
            p.city_id,
            p.web_url,
            p.twitter,
            p.facebook,
            p.send_notifications,
            p.categories,
            p.topics,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::ProfileNotFound(profile.profile_id));
    }
    Ok(profile)
  }

  // ── Locations ─────────────────────────────────────────────────────────────

  async fn add_country(&self, country: Country) -> Result<Country> {
    let id_str = encode_uuid(country.country_id);
    let name = country.name.clone();
    let code = country.code.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO countries ({COUNTRY_COLUMNS}) VALUES (?1, ?2, ?3)"),
          rusqlite::params![id_str, name, code],
        )?;
        Ok(())
      })
      .await?;

    Ok(country)
  }

  async fn add_region(&self, region: Region) -> Result<Region> {
    let id_str = encode_uuid(region.region_id);
    let name = region.name.clone();
    let country_str = encode_opt_uuid(region.country_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO regions ({REGION_COLUMNS}) VALUES (?1, ?2, ?3)"),
          rusqlite::params![id_str, name, country_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(region)
  }

  async fn add_city(&self, city: City) -> Result<City> {
    let id_str = encode_uuid(city.city_id);
    let name = city.name.clone();
    let region_str = encode_opt_uuid(city.region_id);
    let (latitude, longitude) = (city.latitude, city.longitude);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO cities ({CITY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          rusqlite::params![id_str, name, region_str, latitude, longitude],
        )?;
        Ok(())
      })
      .await?;

    Ok(city)
  }

  async fn get_city(&self, id: Uuid) -> Result<Option<City>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawCity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {CITY_COLUMNS} FROM cities WHERE city_id = ?1"),
            [id_str],
            RawCity::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawCity::into_city).transpose()
  }

  async fn load_locations(&self) -> Result<LocationHierarchy> {
    let (countries, regions, cities) = self
      .conn
      .call(|conn| {
        let countries = query_all(
          conn,
          &format!("SELECT {COUNTRY_COLUMNS} FROM countries"),
          [],
          RawCountry::from_row,
        )?;
        let regions = query_all(
          conn,
          &format!("SELECT {REGION_COLUMNS} FROM regions"),
          [],
          RawRegion::from_row,
        )?;
        let cities = query_all(
          conn,
          &format!("SELECT {CITY_COLUMNS} FROM cities"),
          [],
          RawCity::from_row,
        )?;
        Ok((countries, regions, cities))
      })
      .await?;

    let mut places = LocationHierarchy::new();
    for raw in countries {
      places.insert_country(raw.into_country()?);
    }
    for raw in regions {
      places.insert_region(raw.into_region()?);
    }
    for raw in cities {
      places.insert_city(raw.into_city()?);
    }
    Ok(places)
  }

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn create_organization(&self, org: Organization) -> Result<Organization> {
    let id_str = encode_uuid(org.org_id);
    let name = org.name.clone();
    let slug = org.slug.clone();
    let owner_str = encode_opt_uuid(org.owner_profile_id);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO organizations ({ORGANIZATION_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"
          ),
          rusqlite::params![id_str, name, slug, owner_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::DuplicateSlug(org.slug.clone())
        } else {
          Error::Database(e)
        }
      })?;

    Ok(org)
  }

  async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE org_id = ?1"),
            [id_str],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn get_organization_by_slug(&self, slug: String) -> Result<Option<Organization>> {
    let raw: Option<RawOrganization> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ORGANIZATION_COLUMNS} FROM organizations WHERE slug = ?1"),
            [slug],
            RawOrganization::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawOrganization::into_organization).transpose()
  }

  async fn delete_organization(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM organizations WHERE org_id = ?1", [id_str])?)
      })
      .await?;

    if removed == 0 {
      return Err(Error::OrganizationNotFound(id));
    }
    Ok(())
  }

  // ── Teams ─────────────────────────────────────────────────────────────────

  async fn create_team(&self, mut team: Team) -> Result<(Team, Membership)> {
    self.derive_team_location(&mut team).await?;

    let admin = Membership::new(team.team_id, team.owner_profile_id, Role::Admin);
    let raw_team = RawTeam::from_team(&team)?;
    let raw_admin = encode_membership(&admin);

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        write_team(&tx, INSERT_TEAM, &raw_team)?;
        insert_membership(&tx, &raw_admin)?;
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok((team, admin))
  }

  async fn save_team(&self, mut team: Team) -> Result<Team> {
    self.derive_team_location(&mut team).await?;

    let raw_team = RawTeam::from_team(&team)?;
    let changed = self
      .conn
      .call(move |conn| Ok(write_team(conn, UPDATE_TEAM, &raw_team)?))
      .await?;

    if changed == 0 {
      return Err(Error::TeamNotFound(team.team_id));
    }
    Ok(team)
  }

  async fn get_team(&self, id: Uuid) -> Result<Option<Team>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawTeam> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?1"),
            [id_str],
            RawTeam::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTeam::into_team).transpose()
  }

  async fn list_teams(&self) -> Result<Vec<Team>> {
    self
      .query_teams(format!("SELECT {TEAM_COLUMNS} FROM teams ORDER BY name"), vec![])
      .await
  }

  async fn list_organization_teams(&self, org_id: Uuid) -> Result<Vec<Team>> {
    self
      .query_teams(
        format!(
          "SELECT {TEAM_COLUMNS} FROM teams WHERE organization_id = ?1 ORDER BY name"
        ),
        vec![encode_uuid(org_id)],
      )
      .await
  }

  async fn delete_team(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    // Memberships, series and events go with it via ON DELETE CASCADE.
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM teams WHERE team_id = ?1", [id_str])?))
      .await?;

    if removed == 0 {
      return Err(Error::TeamNotFound(id));
    }
    Ok(())
  }

  // ── Memberships ───────────────────────────────────────────────────────────

  async fn add_membership(
    &self,
    team_id: Uuid,
    profile_id: Uuid,
    role: Role,
  ) -> Result<Membership> {
    let membership = Membership::new(team_id, profile_id, role);
    let raw = encode_membership(&membership);

    self
      .conn
      .call(move |conn| Ok(insert_membership(conn, &raw)?))
      .await
      .map_err(|e| {
        if is_unique_violation(&e) {
          Error::Core(gather_core::Error::DuplicateMembership { team_id, profile_id })
        } else {
          Error::Database(e)
        }
      })?;

    Ok(membership)
  }

  async fn set_role(
    &self,
    team_id: Uuid,
    profile_id: Uuid,
    role: Role,
  ) -> Result<Membership> {
    let team_str = encode_uuid(team_id);
    let profile_str = encode_uuid(profile_id);
    let role_value = role.value();

    let raw: Option<RawMembership> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE memberships SET role = ?3 WHERE team_id = ?1 AND profile_id = ?2",
          rusqlite::params![team_str, profile_str, role_value],
        )?;
        Ok(conn
          .query_row(
            &format!(
              "SELECT {MEMBERSHIP_COLUMNS} FROM memberships
               WHERE team_id = ?1 AND profile_id = ?2"
            ),
            [team_str, profile_str],
            RawMembership::from_row,
          )
          .optional()?)
      })
      .await?;

    raw
      .ok_or(Error::MembershipNotFound { team_id, profile_id })?
      .into_membership()
  }

  async fn remove_membership(&self, team_id: Uuid, profile_id: Uuid) -> Result<bool> {
    let team_str = encode_uuid(team_id);
    let profile_str = encode_uuid(profile_id);

    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM memberships WHERE team_id = ?1 AND profile_id = ?2",
          [team_str, profile_str],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }

  async fn get_roster(&self, team_id: Uuid) -> Result<Option<TeamRoster>> {
    let team_str = encode_uuid(team_id);

    let found: Option<(RawTeam, Vec<RawMembership>)> = self
      .conn
      .call(move |conn| {
        let Some(team) = conn
          .query_row(
            &format!("SELECT {TEAM_COLUMNS} FROM teams WHERE team_id = ?1"),
            [&team_str],
            RawTeam::from_row,
          )
          .optional()?
        else {
          return Ok(None);
        };
        let members = query_all(
          conn,
          &format!(
            "SELECT {MEMBERSHIP_COLUMNS} FROM memberships
             WHERE team_id = ?1
             ORDER BY role DESC, joined_at ASC"
          ),
          [&team_str],
          RawMembership::from_row,
        )?;
        Ok(Some((team, members)))
      })
      .await?;

    let Some((raw_team, raw_members)) = found else {
      return Ok(None);
    };
    let memberships = raw_members
      .into_iter()
      .map(RawMembership::into_membership)
      .collect::<Result<Vec<_>>>()?;
    Ok(Some(TeamRoster::new(raw_team.into_team()?, memberships)))
  }

  async fn teams_for_profile(&self, profile_id: Uuid, min_role: Role) -> Result<Vec<Team>> {
    let min = min_role.value();
    self
      .query_teams(
        format!(
          "SELECT {TEAM_COLUMNS} FROM teams
           WHERE team_id IN (
             SELECT team_id FROM memberships WHERE profile_id = ?1 AND role >= {min}
           )
           ORDER BY name"
        ),
        vec![encode_uuid(profile_id)],
      )
      .await
  }

  // ── Taxonomy ──────────────────────────────────────────────────────────────

  async fn save_category(&self, mut category: Category) -> Result<Category> {
    category.refresh_slug();
    let raw = RawCategory {
      category_id: encode_uuid(category.category_id),
      name:        category.name.clone(),
      description: category.description.clone(),
      slug:        category.slug.clone(),
      img_url:     category.img_url.clone(),
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (category_id) DO UPDATE SET
               name = excluded.name, description = excluded.description,
               slug = excluded.slug, img_url = excluded.img_url"
          ),
          rusqlite::params![raw.category_id, raw.name, raw.description, raw.slug, raw.img_url],
        )?;
        Ok(())
      })
      .await?;

    Ok(category)
  }

  async fn save_topic(&self, mut topic: Topic) -> Result<Topic> {
    topic.refresh_slug();
    let raw = RawTopic {
      topic_id:    encode_uuid(topic.topic_id),
      category_id: encode_uuid(topic.category_id),
      name:        topic.name.clone(),
      slug:        topic.slug.clone(),
      description: topic.description.clone(),
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO topics ({TOPIC_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (topic_id) DO UPDATE SET
               category_id = excluded.category_id, name = excluded.name,
               slug = excluded.slug, description = excluded.description"
          ),
          rusqlite::params![raw.topic_id, raw.category_id, raw.name, raw.slug, raw.description],
        )?;
        Ok(())
      })
      .await?;

    Ok(topic)
  }

  async fn list_categories(&self) -> Result<Vec<Category>> {
    let raws: Vec<RawCategory> = self
      .conn
      .call(|conn| {
        Ok(query_all(
          conn,
          &format!("SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name"),
          [],
          RawCategory::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn list_topics(&self, category_id: Uuid) -> Result<Vec<Topic>> {
    let category_str = encode_uuid(category_id);

    let raws: Vec<RawTopic> = self
      .conn
      .call(move |conn| {
        Ok(query_all(
          conn,
          &format!("SELECT {TOPIC_COLUMNS} FROM topics WHERE category_id = ?1 ORDER BY name"),
          [category_str],
          RawTopic::from_row,
        )?)
      })
      .await?;

    raws.into_iter().map(RawTopic::into_topic).collect()
  }

  // ── Events ────────────────────────────────────────────────────────────────

  async fn add_series(&self, series: Series) -> Result<Series> {
    let raw = RawSeries {
      series_id:  encode_uuid(series.series_id),
      team_id:    encode_uuid(series.team_id),
      name:       series.name.clone(),
      created_by: encode_opt_uuid(series.created_by),
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!("INSERT INTO series ({SERIES_COLUMNS}) VALUES (?1, ?2, ?3, ?4)"),
          rusqlite::params![raw.series_id, raw.team_id, raw.name, raw.created_by],
        )?;
        Ok(())
      })
      .await?;

    Ok(series)
  }

  async fn get_series(&self, id: Uuid) -> Result<Option<Series>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSeries> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SERIES_COLUMNS} FROM series WHERE series_id = ?1"),
            [id_str],
            RawSeries::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSeries::into_series).transpose()
  }

  async fn add_event(&self, event: Event) -> Result<Event> {
    let raw = RawEvent {
      event_id:   encode_uuid(event.event_id),
      team_id:    encode_uuid(event.team_id),
      series_id:  encode_opt_uuid(event.series_id),
      name:       event.name.clone(),
      created_by: encode_opt_uuid(event.created_by),
      start_time: encode_dt(event.start_time),
      end_time:   encode_dt(event.end_time),
    };

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO events ({EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
          ),
          rusqlite::params![
            raw.event_id,
            raw.team_id,
            raw.series_id,
            raw.name,
            raw.created_by,
            raw.start_time,
            raw.end_time,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn get_event(&self, id: Uuid) -> Result<Option<Event>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEvent> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE event_id = ?1"),
            [id_str],
            RawEvent::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEvent::into_event).transpose()
  }

  async fn upcoming_events(&self, team_id: Uuid, now: DateTime<Utc>) -> Result<Vec<Event>> {
    self
      .query_timeline(
        format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE team_id = ?1 AND end_time > ?2
           ORDER BY start_time ASC
           LIMIT ?3"
        ),
        team_id,
        now,
        -1,
        RawEvent::from_row,
        RawEvent::into_event,
      )
      .await
  }

  async fn recent_events(
    &self,
    team_id: Uuid,
    now: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<Event>> {
    self
      .query_timeline(
        format!(
          "SELECT {EVENT_COLUMNS} FROM events
           WHERE team_id = ?1 AND end_time <= ?2
           ORDER BY start_time DESC
           LIMIT ?3"
        ),
        team_id,
        now,
        i64::try_from(limit).unwrap_or(i64::MAX),
        RawEvent::from_row,
        RawEvent::into_event,
      )
      .await
  }

  // ── Common events ───────────────────────────────────────────────────────

  async fn add_common_event(&self, event: CommonEvent) -> Result<CommonEvent> {
    let raw = RawCommonEvent::from_common_event(&event);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO common_events ({COMMON_EVENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"
          ),
          rusqlite::params![
            raw.common_event_id,
            raw.organization_id,
            raw.name,
            raw.created_by,
            raw.start_time,
            raw.end_time,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn upcoming_common_events(
    &self,
    organization_id: Uuid,
    now: DateTime<Utc>,
  ) -> Result<Vec<CommonEvent>> {
    self
      .query_timeline(
        format!(
          "SELECT {COMMON_EVENT_COLUMNS} FROM common_events
           WHERE organization_id = ?1 AND end_time > ?2
           ORDER BY start_time ASC
           LIMIT ?3"
        ),
        organization_id,
        now,
        -1,
        RawCommonEvent::from_row,
        RawCommonEvent::into_common_event,
      )
      .await
  }

  async fn recent_common_events(
    &self,
    organization_id: Uuid,
    now: DateTime<Utc>,
    limit: usize,
  ) -> Result<Vec<CommonEvent>> {
    self
      .query_timeline(
        format!(
          "SELECT {COMMON_EVENT_COLUMNS} FROM common_events
           WHERE organization_id = ?1 AND end_time <= ?2
           ORDER BY start_time DESC
           LIMIT ?3"
        ),
        organization_id,
        now,
        i64::try_from(limit).unwrap_or(i64::MAX),
        RawCommonEvent::from_row,
        RawCommonEvent::into_common_event,
      )
      .await
  }
}
