use gather_core::{
  store::CommunityStore,
  taxonomy::{Category, Topic},
};
use serde::Serialize;
use tracing::info;

use super::{Session, print_json};
use crate::cli::TaxonomyCommand;

#[derive(Serialize)]
struct CategoryListing {
  #[serde(flatten)]
  category: Category,
  topics:   Vec<Topic>,
}

pub async fn run(session: &Session, cmd: TaxonomyCommand) -> anyhow::Result<()> {
  let store = &session.store;

  match cmd {
    TaxonomyCommand::Category { name, description, img_url, id } => {
      session.require_superuser()?;
      let category = match id {
        Some(id) => {
          let mut existing = store
            .list_categories()
            .await?
            .into_iter()
            .find(|c| c.category_id == id)
            .ok_or_else(|| anyhow::anyhow!("no category with id {id}"))?;
          existing.name = name;
          if !description.is_empty() {
            existing.description = description;
          }
          if !img_url.is_empty() {
            existing.img_url = img_url;
          }
          existing
        }
        None => Category::new(name, description, img_url),
      };

      let saved = store.save_category(category).await?;
      info!(category_id = %saved.category_id, slug = %saved.slug, "saved category");
      print_json(&saved)
    }

    TaxonomyCommand::Topic { category, name } => {
      session.require_superuser()?;
      let saved = store.save_topic(Topic::new(category, name)).await?;
      info!(topic_id = %saved.topic_id, slug = %saved.slug, "saved topic");
      print_json(&saved)
    }

    TaxonomyCommand::List => {
      let mut listing = Vec::new();
      for category in store.list_categories().await? {
        let topics = store.list_topics(category.category_id).await?;
        listing.push(CategoryListing { category, topics });
      }
      print_json(&listing)
    }
  }
}
