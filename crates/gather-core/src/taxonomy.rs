//! Categories, topics and the slug generator they share.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Derive a URL-safe token from `name`.
///
/// Keeps ASCII letters, digits, `_` and `-`; everything else is dropped.
/// Runs of whitespace and hyphens collapse to a single `-`, the result is
/// lowercased and stripped of leading/trailing `-` and `_`. Applying it to
/// its own output is a no-op.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_dash = false;

  for c in name.chars() {
    if c.is_ascii_alphanumeric() || c == '_' {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c.to_ascii_lowercase());
    } else if c == '-' || c.is_whitespace() {
      pending_dash = true;
    }
  }

  slug.trim_matches(|c| c == '-' || c == '_').to_owned()
}

// ─── Category ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  pub category_id: Uuid,
  pub name:        String,
  pub description: String,
  pub slug:        String,
  pub img_url:     String,
}

impl Category {
  pub fn new(
    name: impl Into<String>,
    description: impl Into<String>,
    img_url: impl Into<String>,
  ) -> Self {
    let mut category = Self {
      category_id: Uuid::new_v4(),
      name:        name.into(),
      description: description.into(),
      slug:        String::new(),
      img_url:     img_url.into(),
    };
    category.refresh_slug();
    category
  }

  /// Recompute the slug from the current name. Called on every save.
  pub fn refresh_slug(&mut self) { self.slug = slugify(&self.name); }
}

// ─── Topic ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
  pub topic_id:    Uuid,
  pub category_id: Uuid,
  pub name:        String,
  pub slug:        String,
  pub description: String,
}

impl Topic {
  pub fn new(category_id: Uuid, name: impl Into<String>) -> Self {
    let mut topic = Self {
      topic_id: Uuid::new_v4(),
      category_id,
      name: name.into(),
      slug: String::new(),
      description: String::new(),
    };
    topic.refresh_slug();
    topic
  }

  /// Recompute the slug from the current name. Called on every save.
  pub fn refresh_slug(&mut self) { self.slug = slugify(&self.name); }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn slugify_basic() {
    assert_eq!(slugify("Rock & Roll"), "rock-roll");
    assert_eq!(slugify("  Open   Source -- Rust "), "open-source-rust");
    assert_eq!(slugify("C++/C#"), "cc");
    assert_eq!(slugify("_under_score_"), "under_score");
    assert_eq!(slugify("Café Society"), "caf-society");
    assert_eq!(slugify("!!!"), "");
  }

  #[test]
  fn slugify_is_idempotent() {
    for name in ["Board Games", "Hack-a-thon  Night", "  -Edge- ", "über 9000"] {
      let once = slugify(name);
      assert_eq!(slugify(&once), once);
    }
  }

  #[test]
  fn category_slug_follows_name() {
    let mut category = Category::new("Board Games", "Tabletop", "http://img");
    assert_eq!(category.slug, "board-games");

    category.refresh_slug();
    assert_eq!(category.slug, "board-games");

    category.name = "Card Games".into();
    category.refresh_slug();
    assert_eq!(category.slug, "card-games");
  }

  #[test]
  fn topic_slug_is_derived() {
    let topic = Topic::new(Uuid::new_v4(), "Machine Learning");
    assert_eq!(topic.slug, "machine-learning");
  }
}
