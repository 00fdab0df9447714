use chrono::Utc;
use gather_core::organization::NewOrganization;
use gather_service::organizations;

use super::{Session, print_json};
use crate::cli::OrgCommand;

pub async fn run(session: &Session, cmd: OrgCommand) -> anyhow::Result<()> {
  match cmd {
    OrgCommand::Create { name, slug } => {
      let org = organizations::create_organization(
        &session.store,
        &session.profile,
        NewOrganization { name, slug },
      )
      .await?;
      print_json(&org)
    }

    OrgCommand::Show { slug } => {
      let page =
        organizations::show_org(&session.store, &session.profile, &slug, Utc::now()).await?;
      print_json(&page)
    }
  }
}
