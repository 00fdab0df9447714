//! Great-circle distances from a point to a team's city.

use std::str::FromStr;

use gather_core::{
  location::{City, LocationHierarchy, LocationSource as _},
  team::Team,
};
use gather_service::TeamDistance;

/// Mean Earth radius in kilometres.
const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
  pub latitude:  f64,
  pub longitude: f64,
}

impl Point {
  pub fn of_city(city: &City) -> Self {
    Self { latitude: city.latitude, longitude: city.longitude }
  }

  /// Haversine distance in kilometres.
  pub fn distance_km(self, other: Point) -> f64 {
    let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
    let dlat = lat2 - lat1;
    let dlng = (other.longitude - self.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
  }
}

/// Parses `"lat,lng"`.
impl FromStr for Point {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let (lat, lng) = s
      .split_once(',')
      .ok_or_else(|| format!("expected \"lat,lng\", got {s:?}"))?;
    let latitude: f64 = lat.trim().parse().map_err(|e| format!("bad latitude: {e}"))?;
    let longitude: f64 = lng.trim().parse().map_err(|e| format!("bad longitude: {e}"))?;
    if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
      return Err(format!("coordinates out of range: {s}"));
    }
    Ok(Self { latitude, longitude })
  }
}

/// Distance from a fixed point to each team's city. Teams without a known
/// city have no distance.
pub struct FromPoint<'a> {
  pub origin: Point,
  pub places: &'a LocationHierarchy,
}

impl TeamDistance for FromPoint<'_> {
  fn distance_from(&self, team: &Team) -> Option<f64> {
    let city = self.places.city(team.city_id?)?;
    Some(self.origin.distance_km(Point::of_city(city)))
  }
}

#[cfg(test)]
mod tests {
  use gather_core::team::NewTeam;
  use uuid::Uuid;

  use super::*;

  const SPRINGFIELD: Point = Point { latitude: 39.78, longitude: -89.65 };
  const CHICAGO: Point = Point { latitude: 41.88, longitude: -87.63 };

  #[test]
  fn springfield_to_chicago() {
    let km = SPRINGFIELD.distance_km(CHICAGO);
    assert!((280.0..300.0).contains(&km), "{km}");
    assert_eq!(SPRINGFIELD.distance_km(SPRINGFIELD), 0.0);
  }

  #[test]
  fn parses_points() {
    assert_eq!("41.88, -87.63".parse::<Point>().unwrap(), CHICAGO);
    assert!("41.88".parse::<Point>().is_err());
    assert!("north,south".parse::<Point>().is_err());
    assert!("91,0".parse::<Point>().is_err());
  }

  #[test]
  fn teams_without_known_city_have_no_distance() {
    let city = City {
      city_id:   Uuid::new_v4(),
      name:      "Chicago".into(),
      region_id: None,
      latitude:  CHICAGO.latitude,
      longitude: CHICAGO.longitude,
    };
    let mut places = LocationHierarchy::new();
    places.insert_city(city.clone());
    let distance = FromPoint { origin: SPRINGFIELD, places: &places };

    let mut team = Team::from_new(NewTeam::new("Rustaceans", Uuid::new_v4()), Uuid::new_v4());
    assert_eq!(distance.distance_from(&team), None);

    team.city_id = Some(Uuid::new_v4());
    assert_eq!(distance.distance_from(&team), None);

    team.city_id = Some(city.city_id);
    assert!(distance.distance_from(&team).is_some_and(|km| km > 250.0));
  }
}
