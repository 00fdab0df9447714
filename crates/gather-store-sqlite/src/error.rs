//! Error type for `gather-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Location-derivation failures and duplicate memberships surface here.
  #[error("core error: {0}")]
  Core(#[from] gather_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("profile not found: {0}")]
  ProfileNotFound(uuid::Uuid),

  #[error("team not found: {0}")]
  TeamNotFound(uuid::Uuid),

  #[error("organization not found: {0}")]
  OrganizationNotFound(uuid::Uuid),

  #[error("no membership of profile {profile_id} in team {team_id}")]
  MembershipNotFound {
    team_id:    uuid::Uuid,
    profile_id: uuid::Uuid,
  },

  #[error("slug already taken: {0:?}")]
  DuplicateSlug(String),
}

impl Error {
  /// Whether this is a location or membership integrity failure.
  pub fn is_integrity_violation(&self) -> bool {
    matches!(self, Self::Core(e) if e.is_integrity_violation())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
