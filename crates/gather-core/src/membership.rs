//! Team membership and the three-tier role ladder.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

/// A member's tier within a team. Ordered: `Normal < Moderator < Admin`.
///
/// The numeric values are the ones stored in the `role` column.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[repr(u8)]
pub enum Role {
  #[default]
  Normal    = 0,
  Moderator = 1,
  Admin     = 2,
}

impl Role {
  pub fn value(self) -> i64 { self as i64 }

  pub fn from_value(value: i64) -> Result<Self> {
    Self::iter()
      .find(|r| r.value() == value)
      .ok_or(Error::UnknownRole(value))
  }

  /// Moderators and admins both count as moderators for permission checks.
  pub fn is_moderator(self) -> bool { self >= Self::Moderator }

  /// Human-readable label.
  pub fn label(self) -> &'static str {
    match self {
      Self::Normal => "Normal",
      Self::Moderator => "Moderator",
      Self::Admin => "Administrator",
    }
  }
}

// ─── Membership ──────────────────────────────────────────────────────────────

/// A profile's membership in a team. At most one per (team, profile) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
  pub membership_id: Uuid,
  pub team_id:       Uuid,
  pub profile_id:    Uuid,
  pub role:          Role,
  pub joined_at:     DateTime<Utc>,
}

impl Membership {
  pub fn new(team_id: Uuid, profile_id: Uuid, role: Role) -> Self {
    Self {
      membership_id: Uuid::new_v4(),
      team_id,
      profile_id,
      role,
      joined_at: Utc::now(),
    }
  }

  pub fn role_name(&self) -> &'static str { self.role.label() }
}

/// Default member-list ordering: role descending, then join time ascending.
pub fn display_order(a: &Membership, b: &Membership) -> Ordering {
  b.role
    .cmp(&a.role)
    .then_with(|| a.joined_at.cmp(&b.joined_at))
}

#[cfg(test)]
mod tests {
  use chrono::Duration;

  use super::*;

  #[test]
  fn roles_are_ordered() {
    assert!(Role::Normal < Role::Moderator);
    assert!(Role::Moderator < Role::Admin);
    assert!(!Role::Normal.is_moderator());
    assert!(Role::Moderator.is_moderator());
    assert!(Role::Admin.is_moderator());
  }

  #[test]
  fn stored_values_match_tiers() {
    assert_eq!(Role::Normal.value(), 0);
    assert_eq!(Role::Moderator.value(), 1);
    assert_eq!(Role::Admin.value(), 2);
    assert_eq!(Role::from_value(1).unwrap(), Role::Moderator);
    assert!(matches!(Role::from_value(7), Err(Error::UnknownRole(7))));
  }

  #[test]
  fn parses_and_labels() {
    assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
    assert_eq!("moderator".parse::<Role>().unwrap(), Role::Moderator);
    assert!("owner".parse::<Role>().is_err());
    assert_eq!(Role::Admin.to_string(), "admin");
    assert_eq!(Role::Admin.label(), "Administrator");

    let membership = Membership::new(Uuid::new_v4(), Uuid::new_v4(), Role::Moderator);
    assert_eq!(membership.role_name(), "Moderator");
  }

  #[test]
  fn member_list_orders_by_role_then_join_time() {
    let team = Uuid::new_v4();
    let now = Utc::now();
    let mut early_normal = Membership::new(team, Uuid::new_v4(), Role::Normal);
    early_normal.joined_at = now - Duration::days(30);
    let mut late_normal = Membership::new(team, Uuid::new_v4(), Role::Normal);
    late_normal.joined_at = now;
    let mut moderator = Membership::new(team, Uuid::new_v4(), Role::Moderator);
    moderator.joined_at = now - Duration::days(1);
    let mut admin = Membership::new(team, Uuid::new_v4(), Role::Admin);
    admin.joined_at = now;

    let mut list = vec![
      late_normal.clone(),
      moderator.clone(),
      early_normal.clone(),
      admin.clone(),
    ];
    list.sort_by(display_order);

    assert_eq!(list, vec![admin, moderator, early_normal, late_normal]);
  }
}
