use gather_core::{
  location::{City, Country, Region},
  store::CommunityStore,
};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::{Session, print_json};
use crate::cli::LocationCommand;

#[derive(Serialize)]
struct Listing<'a> {
  countries: Vec<&'a Country>,
  regions:   Vec<&'a Region>,
  cities:    Vec<&'a City>,
}

pub async fn run(session: &Session, cmd: LocationCommand) -> anyhow::Result<()> {
  let store = &session.store;

  match cmd {
    LocationCommand::AddCountry { name, code } => {
      session.require_superuser()?;
      let country = store
        .add_country(Country { country_id: Uuid::new_v4(), name, code })
        .await?;
      info!(country_id = %country.country_id, "added country");
      print_json(&country)
    }

    LocationCommand::AddRegion { name, country } => {
      session.require_superuser()?;
      let region = store
        .add_region(Region { region_id: Uuid::new_v4(), name, country_id: Some(country) })
        .await?;
      info!(region_id = %region.region_id, "added region");
      print_json(&region)
    }

    LocationCommand::AddCity { name, region, lat, lng } => {
      session.require_superuser()?;
      let city = store
        .add_city(City {
          city_id: Uuid::new_v4(),
          name,
          region_id: region,
          latitude: lat,
          longitude: lng,
        })
        .await?;
      info!(city_id = %city.city_id, "added city");
      print_json(&city)
    }

    LocationCommand::List => {
      let places = store.load_locations().await?;
      let mut listing = Listing {
        countries: places.countries().collect(),
        regions:   places.regions().collect(),
        cities:    places.cities().collect(),
      };
      listing.countries.sort_by(|a, b| a.name.cmp(&b.name));
      listing.regions.sort_by(|a, b| a.name.cmp(&b.name));
      listing.cities.sort_by(|a, b| a.name.cmp(&b.name));
      print_json(&listing)
    }
  }
}
