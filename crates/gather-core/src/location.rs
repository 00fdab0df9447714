//! Location hierarchy (Country ⊇ Region ⊇ City) and team location derivation.
//!
//! Locations are static reference data. A team stores ids for all three
//! levels, but only the city is authoritative: [`derive_location`] rewrites
//! the region and country from it before every save.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, team::Team};

// ─── Reference data ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
  pub country_id: Uuid,
  pub name:       String,
  /// ISO 3166-1 alpha-2 code.
  pub code:       String,
}

/// A state, province or region (an "SPR").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
  pub region_id:  Uuid,
  pub name:       String,
  pub country_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct City {
  pub city_id:   Uuid,
  pub name:      String,
  pub region_id: Option<Uuid>,
  pub latitude:  f64,
  pub longitude: f64,
}

// ─── Lookup ──────────────────────────────────────────────────────────────────

/// Read access to cities and regions by id.
pub trait LocationSource {
  fn city(&self, id: Uuid) -> Option<&City>;
  fn region(&self, id: Uuid) -> Option<&Region>;
}

/// Re-derive `team.region_id` and `team.country_id` from `team.city_id`.
///
/// Runs before every persist of a team, not only on creation. When the team
/// has no city the caller-supplied region and country are left untouched.
/// A city whose chain is incomplete is an integrity violation.
pub fn derive_location<L>(team: &mut Team, locations: &L) -> Result<()>
where
  L: LocationSource + ?Sized,
{
  let Some(city_id) = team.city_id else {
    return Ok(());
  };

  let city = locations.city(city_id).ok_or(Error::CityNotFound(city_id))?;
  let region_id = city.region_id.ok_or(Error::CityWithoutRegion(city_id))?;
  let region = locations
    .region(region_id)
    .ok_or(Error::RegionNotFound(region_id))?;
  let country_id = region
    .country_id
    .ok_or(Error::RegionWithoutCountry(region_id))?;

  team.region_id = Some(region_id);
  team.country_id = country_id;
  Ok(())
}

// ─── In-memory hierarchy ─────────────────────────────────────────────────────

/// An in-memory index over the location reference tables.
#[derive(Debug, Clone, Default)]
pub struct LocationHierarchy {
  countries: HashMap<Uuid, Country>,
  regions:   HashMap<Uuid, Region>,
  cities:    HashMap<Uuid, City>,
}

impl LocationHierarchy {
  pub fn new() -> Self { Self::default() }

  pub fn insert_country(&mut self, country: Country) {
    self.countries.insert(country.country_id, country);
  }

  pub fn insert_region(&mut self, region: Region) {
    self.regions.insert(region.region_id, region);
  }

  pub fn insert_city(&mut self, city: City) {
    self.cities.insert(city.city_id, city);
  }

  pub fn country(&self, id: Uuid) -> Option<&Country> { self.countries.get(&id) }

  pub fn countries(&self) -> impl Iterator<Item = &Country> { self.countries.values() }

  pub fn regions(&self) -> impl Iterator<Item = &Region> { self.regions.values() }

  pub fn cities(&self) -> impl Iterator<Item = &City> { self.cities.values() }

  /// The most specific place name known for `team`: city, then region, then
  /// country. Empty when none of them resolve.
  pub fn location_name(&self, team: &Team) -> String {
    if let Some(city) = team.city_id.and_then(|id| self.cities.get(&id)) {
      return city.name.clone();
    }
    if let Some(region) = team.region_id.and_then(|id| self.regions.get(&id)) {
      return region.name.clone();
    }
    self
      .countries
      .get(&team.country_id)
      .map(|c| c.name.clone())
      .unwrap_or_default()
  }
}

impl LocationSource for LocationHierarchy {
  fn city(&self, id: Uuid) -> Option<&City> { self.cities.get(&id) }

  fn region(&self, id: Uuid) -> Option<&Region> { self.regions.get(&id) }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::team::NewTeam;

  struct Fixture {
    places:      LocationHierarchy,
    usa:         Uuid,
    illinois:    Uuid,
    springfield: Uuid,
  }

  fn fixture() -> Fixture {
    let usa = Uuid::new_v4();
    let illinois = Uuid::new_v4();
    let springfield = Uuid::new_v4();

    let mut places = LocationHierarchy::new();
    places.insert_country(Country {
      country_id: usa,
      name:       "USA".into(),
      code:       "US".into(),
    });
    places.insert_region(Region {
      region_id:  illinois,
      name:       "Illinois".into(),
      country_id: Some(usa),
    });
    places.insert_city(City {
      city_id:   springfield,
      name:      "Springfield".into(),
      region_id: Some(illinois),
      latitude:  39.78,
      longitude: -89.65,
    });

    Fixture { places, usa, illinois, springfield }
  }

  fn team_in(country_id: Uuid) -> Team {
    Team::from_new(NewTeam::new("Rustaceans", country_id), Uuid::new_v4())
  }

  #[test]
  fn city_overwrites_stale_region_and_country() {
    let f = fixture();
    let mut team = team_in(Uuid::new_v4());
    team.region_id = Some(Uuid::new_v4());
    team.city_id = Some(f.springfield);

    derive_location(&mut team, &f.places).unwrap();

    assert_eq!(team.region_id, Some(f.illinois));
    assert_eq!(team.country_id, f.usa);
  }

  #[test]
  fn no_city_keeps_caller_values() {
    let f = fixture();
    let stray_region = Uuid::new_v4();
    let mut team = team_in(f.usa);
    team.region_id = Some(stray_region);

    derive_location(&mut team, &f.places).unwrap();

    assert_eq!(team.region_id, Some(stray_region));
    assert_eq!(team.country_id, f.usa);
  }

  #[test]
  fn derivation_is_repeatable() {
    let f = fixture();
    let mut team = team_in(f.usa);
    team.city_id = Some(f.springfield);

    derive_location(&mut team, &f.places).unwrap();
    let first = (team.region_id, team.country_id);
    derive_location(&mut team, &f.places).unwrap();

    assert_eq!(first, (team.region_id, team.country_id));
  }

  #[test]
  fn city_without_region_is_rejected() {
    let mut f = fixture();
    let orphan = Uuid::new_v4();
    f.places.insert_city(City {
      city_id:   orphan,
      name:      "Nowhere".into(),
      region_id: None,
      latitude:  0.0,
      longitude: 0.0,
    });
    let mut team = team_in(f.usa);
    team.city_id = Some(orphan);

    let err = derive_location(&mut team, &f.places).unwrap_err();
    assert!(matches!(err, Error::CityWithoutRegion(id) if id == orphan));
    assert!(err.is_integrity_violation());
  }

  #[test]
  fn region_without_country_is_rejected() {
    let mut f = fixture();
    let floating = Uuid::new_v4();
    let town = Uuid::new_v4();
    f.places.insert_region(Region {
      region_id:  floating,
      name:       "Atlantis".into(),
      country_id: None,
    });
    f.places.insert_city(City {
      city_id:   town,
      name:      "Poseidonia".into(),
      region_id: Some(floating),
      latitude:  0.0,
      longitude: 0.0,
    });
    let mut team = team_in(f.usa);
    team.city_id = Some(town);

    let err = derive_location(&mut team, &f.places).unwrap_err();
    assert!(matches!(err, Error::RegionWithoutCountry(id) if id == floating));
  }

  #[test]
  fn unknown_city_is_rejected() {
    let f = fixture();
    let mut team = team_in(f.usa);
    team.city_id = Some(Uuid::new_v4());

    assert!(matches!(
      derive_location(&mut team, &f.places),
      Err(Error::CityNotFound(_))
    ));
  }

  #[test]
  fn location_name_prefers_most_specific() {
    let f = fixture();
    let mut team = team_in(f.usa);
    assert_eq!(f.places.location_name(&team), "USA");

    team.region_id = Some(f.illinois);
    assert_eq!(f.places.location_name(&team), "Illinois");

    team.city_id = Some(f.springfield);
    assert_eq!(f.places.location_name(&team), "Springfield");

    let unknown = team_in(Uuid::new_v4());
    assert_eq!(f.places.location_name(&unknown), "");
  }
}
