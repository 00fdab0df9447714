//! Organizations group teams under a common owner.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::taxonomy::slugify;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
  pub org_id:           Uuid,
  pub name:             String,
  /// Unique across all organizations.
  pub slug:             String,
  /// Cleared (not cascaded) when the owning profile is deleted.
  pub owner_profile_id: Option<Uuid>,
}

/// Input to organization creation. The creator becomes the owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
  pub name: String,
  /// Defaults to the slugified name.
  pub slug: Option<String>,
}

impl NewOrganization {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), slug: None }
  }

  pub fn into_organization(self, owner_profile_id: Uuid) -> Organization {
    let slug = self
      .slug
      .filter(|s| !s.is_empty())
      .unwrap_or_else(|| slugify(&self.name));
    Organization {
      org_id: Uuid::new_v4(),
      name: self.name,
      slug,
      owner_profile_id: Some(owner_profile_id),
    }
  }
}
