//! Error types for `gather-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("city not found: {0}")]
  CityNotFound(Uuid),

  #[error("region not found: {0}")]
  RegionNotFound(Uuid),

  /// A team was assigned a city that has no parent region.
  #[error("city {0} has no region")]
  CityWithoutRegion(Uuid),

  /// A region in the chain has no parent country.
  #[error("region {0} has no country")]
  RegionWithoutCountry(Uuid),

  #[error("profile {profile_id} is already a member of team {team_id}")]
  DuplicateMembership { team_id: Uuid, profile_id: Uuid },

  #[error("unknown role value: {0}")]
  UnknownRole(i64),
}

impl Error {
  /// True for failures that mean the location hierarchy or membership table
  /// would become inconsistent if the write went ahead.
  pub fn is_integrity_violation(&self) -> bool {
    matches!(
      self,
      Self::CityNotFound(_)
        | Self::RegionNotFound(_)
        | Self::CityWithoutRegion(_)
        | Self::RegionWithoutCountry(_)
        | Self::DuplicateMembership { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a best-effort display helper.
///
/// Callers are expected to substitute a visible default (placeholder image,
/// "Unknown Profile", UTC) rather than propagate these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresentationError {
  #[error("profile has no identity")]
  NoIdentity,

  #[error("profile has no avatar")]
  NoAvatar,

  #[error("unknown timezone: {0:?}")]
  UnknownTimezone(String),
}
