use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use gather_core::membership::Role;
use uuid::Uuid;

use crate::geo::Point;

#[derive(Parser)]
#[command(name = "gather", author, version, about = "Community teams, organizations and events")]
pub struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "gather.toml")]
  pub config: PathBuf,

  /// Act as this user. Without it every command runs anonymously.
  #[arg(short, long, env = "GATHER_USER")]
  pub user: Option<String>,

  /// Given name, used only when the user's profile is first created.
  #[arg(long)]
  pub given_name: Option<String>,

  /// Family name, used only when the user's profile is first created.
  #[arg(long)]
  pub family_name: Option<String>,

  /// Email address, used only when the user's profile is first created.
  #[arg(long)]
  pub email: Option<String>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
  /// Your profile
  Profile {
    #[command(subcommand)]
    profile_cmd: ProfileCommand,
  },
  /// Countries, regions and cities
  Location {
    #[command(subcommand)]
    location_cmd: LocationCommand,
  },
  /// Organizations
  Org {
    #[command(subcommand)]
    org_cmd: OrgCommand,
  },
  /// Teams
  Team {
    #[command(subcommand)]
    team_cmd: TeamCommand,
  },
  /// Team membership and roles
  Member {
    #[command(subcommand)]
    member_cmd: MemberCommand,
  },
  /// Categories and topics
  Taxonomy {
    #[command(subcommand)]
    taxonomy_cmd: TaxonomyCommand,
  },
  /// Events and series
  Event {
    #[command(subcommand)]
    event_cmd: EventCommand,
  },
}

#[derive(Subcommand)]
pub enum ProfileCommand {
  /// Show the current profile, creating it on first use
  Show,
  /// Update profile preferences
  Set {
    #[arg(long)]
    real_name: Option<String>,
    /// IANA timezone name, e.g. America/Chicago
    #[arg(long)]
    tz: Option<String>,
    /// Home city id
    #[arg(long)]
    city: Option<Uuid>,
    #[arg(long)]
    web_url: Option<String>,
    #[arg(long)]
    notifications: Option<bool>,
  },
}

#[derive(Subcommand)]
pub enum LocationCommand {
  /// Add a country
  AddCountry {
    name: String,
    /// ISO 3166-1 alpha-2 code
    code: String,
  },
  /// Add a region (state or province)
  AddRegion {
    name:    String,
    #[arg(long)]
    country: Uuid,
  },
  /// Add a city
  AddCity {
    name:   String,
    #[arg(long)]
    region: Option<Uuid>,
    #[arg(long, allow_hyphen_values = true)]
    lat:    f64,
    #[arg(long, allow_hyphen_values = true)]
    lng:    f64,
  },
  /// List all locations
  List,
}

#[derive(Subcommand)]
pub enum OrgCommand {
  /// Create an organization you own
  Create {
    name: String,
    /// Defaults to the slugified name
    #[arg(long)]
    slug: Option<String>,
  },
  /// Show an organization and its teams
  Show { slug: String },
}

#[derive(Subcommand)]
pub enum TeamCommand {
  /// List teams, nearest first
  List {
    /// Only teams you are a member of
    #[arg(long)]
    mine: bool,
    /// Sort by distance from this point ("lat,lng"); defaults to your city
    #[arg(long, allow_hyphen_values = true)]
    near: Option<Point>,
  },
  /// Show a team page
  Show { team: Uuid },
  /// Create a team you own
  Create {
    name:        String,
    #[arg(long)]
    country:     Uuid,
    #[arg(long)]
    city:        Option<Uuid>,
    #[arg(long)]
    org:         Option<Uuid>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    tz:          Option<String>,
  },
  /// Edit a team
  Edit {
    team:              Uuid,
    #[arg(long)]
    name:              Option<String>,
    #[arg(long, conflicts_with = "clear_city")]
    city:              Option<Uuid>,
    /// Drop the city; the region and country it derived are kept
    #[arg(long)]
    clear_city:        bool,
    #[arg(long, conflicts_with = "clear_region")]
    region:            Option<Uuid>,
    #[arg(long)]
    clear_region:      bool,
    #[arg(long, conflicts_with = "clear_org")]
    org:               Option<Uuid>,
    #[arg(long)]
    clear_org:         bool,
    #[arg(long, conflicts_with = "clear_description")]
    description:       Option<String>,
    #[arg(long)]
    clear_description: bool,
    #[arg(long)]
    tz:                Option<String>,
    #[arg(long)]
    active:            Option<bool>,
  },
  /// Delete a team with its memberships and events
  Delete { team: Uuid },
  /// Teams where a user is a moderator or admin
  Moderating {
    /// Defaults to you
    username: Option<String>,
    /// Only teams where they are an admin
    #[arg(long)]
    admin:    bool,
  },
}

#[derive(Subcommand)]
pub enum MemberCommand {
  /// Join a team as a normal member
  Join { team: Uuid },
  /// Add another user to a team
  Add {
    team:     Uuid,
    username: String,
    #[arg(long, default_value = "normal")]
    role:     Role,
  },
  /// Change a member's role
  Role {
    team:     Uuid,
    username: String,
    role:     Role,
  },
  /// Remove a member
  Remove { team: Uuid, username: String },
}

#[derive(Subcommand)]
pub enum TaxonomyCommand {
  /// Add or rename a category
  Category {
    name:        String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long, default_value = "")]
    img_url:     String,
    /// Update this existing category instead of adding one
    #[arg(long)]
    id:          Option<Uuid>,
  },
  /// Add a topic to a category
  Topic { category: Uuid, name: String },
  /// List categories with their topics
  List,
}

#[derive(Subcommand)]
pub enum EventCommand {
  /// Schedule an event. Times are wall-clock in your profile's timezone.
  Create {
    team:   Uuid,
    name:   String,
    /// e.g. 2024-05-01T18:30:00
    #[arg(long)]
    start:  NaiveDateTime,
    #[arg(long)]
    end:    NaiveDateTime,
    #[arg(long)]
    series: Option<Uuid>,
  },
  /// Start an event series
  Series { team: Uuid, name: String },
  /// Schedule an organization-wide event
  Common {
    /// Organization id
    org:   Uuid,
    name:  String,
    #[arg(long)]
    start: NaiveDateTime,
    #[arg(long)]
    end:   NaiveDateTime,
  },
}
